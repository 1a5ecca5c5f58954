//! Application configuration module
//!
//! Provides endpoint configuration for the sync core. One base URL is
//! validated at build time and every endpoint family (auth, personal cards,
//! admin catalog, global catalog, uploads) is derived from it, so the client
//! code never assembles URLs by hand.

use thiserror::Error;

/// Default server URL
const DEFAULT_SERVER_URL: &str = "https://wantthisapp.uk";

/// Path marker for static uploads; requests under it bypass the resilient
/// request pipeline entirely.
pub const UPLOADS_PATH: &str = "/uploads";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server base URL, without a trailing slash
    pub server_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let server_url = std::env::var("SOYLEM_API_URL")
            .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self { server_url }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Endpoint table derived from this configuration
    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(self.server_url.clone())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let server_url = self
            .server_url
            .ok_or(ConfigError::MissingValue("server_url"))?;
        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(server_url));
        }
        Ok(AppConfig {
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}

/// Server endpoint families used by the client.
///
/// Mirrors the server's routing: `/api/auth` for tokens, `/api/cards` for
/// personal cards, `/api/admin/cards` for catalog administration and
/// `/api/global/cards` for the shared catalog with its manifest/changes
/// sub-resources.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    /// Build the endpoint table for a base URL
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { base }
    }

    /// Server base URL
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Token refresh endpoint
    pub fn auth_refresh(&self) -> String {
        format!("{}/api/auth/refresh", self.base)
    }

    /// Personal cards collection
    pub fn cards(&self) -> String {
        format!("{}/api/cards", self.base)
    }

    /// A single personal card
    pub fn card(&self, id: &str) -> String {
        format!("{}/api/cards/{}", self.base, id)
    }

    /// Admin catalog collection
    pub fn admin_cards(&self) -> String {
        format!("{}/api/admin/cards", self.base)
    }

    /// A single admin-managed catalog card
    pub fn admin_card(&self, id: &str) -> String {
        format!("{}/api/admin/cards/{}", self.base, id)
    }

    /// Global catalog collection
    pub fn global_cards(&self) -> String {
        format!("{}/api/global/cards", self.base)
    }

    /// Catalog manifest
    pub fn global_manifest(&self) -> String {
        format!("{}/api/global/cards/manifest", self.base)
    }

    /// Catalog change list
    pub fn global_changes(&self) -> String {
        format!("{}/api/global/cards/changes", self.base)
    }

    /// A single global card
    pub fn global_card(&self, id: &str) -> String {
        format!("{}/api/global/cards/{}", self.base, id)
    }

    /// Per-user hide of a global card
    pub fn global_hide(&self) -> String {
        format!("{}/api/global/cards/hide", self.base)
    }

    /// Per-user unhide of a global card
    pub fn global_unhide(&self) -> String {
        format!("{}/api/global/cards/unhide", self.base)
    }

    /// Resolve a possibly server-relative media path to an absolute URL.
    ///
    /// Absolute URLs pass through untouched.
    pub fn public_uri(&self, rel_or_abs: &str) -> String {
        if is_remote(rel_or_abs) {
            return rel_or_abs.to_string();
        }
        if rel_or_abs.starts_with('/') {
            format!("{}{}", self.base, rel_or_abs)
        } else {
            format!("{}/{}", self.base, rel_or_abs)
        }
    }
}

/// Whether a URI is already absolute
pub fn is_remote(uri: &str) -> bool {
    uri.starts_with("http://") || uri.starts_with("https://")
}
