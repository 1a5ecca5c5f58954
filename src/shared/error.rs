//! Shared Error Types
//!
//! This module defines the error taxonomy used across the sync core.
//!
//! # Error Categories
//!
//! - `NoConnection` - the operation requires the network, none is available,
//!   and no usable response cache exists
//! - `Network` - transport-level failures from the HTTP client
//! - `UnexpectedStatus` - a non-2xx response the caller did not expect
//! - `Storage` - durable key-value store failures
//! - `Serialization` - JSON encode/decode failures
//! - `Io` - filesystem failures (asset promotion)
//! - `Config` - invalid endpoint configuration
//!
//! A 401 that survives the single refresh attempt is *not* an error variant:
//! the resilient request layer returns the response as-is and the caller is
//! responsible for treating it as an expired session.
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across task
//! boundaries.
use thiserror::Error;

use crate::shared::config::ConfigError;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors raised by the sync core
#[derive(Debug, Error)]
pub enum SyncError {
    /// The network is unavailable and no cached response could stand in
    #[error("no internet connection")]
    NoConnection,

    /// Transport-level HTTP failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A response arrived with a status the caller cannot proceed with
    #[error("{context} failed with status {status}")]
    UnexpectedStatus {
        /// What was being attempted
        context: &'static str,
        /// HTTP status code of the response
        status: u16,
        /// Raw response body, for diagnostics
        body: String,
    },

    /// Durable storage read/write failure
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// JSON serialization or deserialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SyncError {
    /// Create an unexpected-status error from a response
    pub fn status(context: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            context,
            status,
            body: body.into(),
        }
    }

    /// Whether this error means the device is offline
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::NoConnection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error() {
        let error = SyncError::status("manifest fetch", 503, "unavailable");
        match error {
            SyncError::UnexpectedStatus { context, status, body } => {
                assert_eq!(context, "manifest fetch");
                assert_eq!(status, 503);
                assert_eq!(body, "unavailable");
            }
            _ => panic!("Expected UnexpectedStatus"),
        }
    }

    #[test]
    fn test_error_display() {
        let error = SyncError::status("card fetch", 404, "missing");
        let display = format!("{}", error);
        assert!(display.contains("card fetch"));
        assert!(display.contains("404"));
    }

    #[test]
    fn test_no_connection_is_offline() {
        assert!(SyncError::NoConnection.is_offline());
        assert!(!SyncError::status("x", 500, "").is_offline());
    }

    #[test]
    fn test_from_serde_error() {
        let invalid_json = "{ invalid json }";
        let result: std::result::Result<serde_json::Value, _> = serde_json::from_str(invalid_json);
        let sync_error: SyncError = result.unwrap_err().into();

        match sync_error {
            SyncError::Serialization { .. } => {}
            _ => panic!("Expected Serialization from serde error"),
        }
    }
}
