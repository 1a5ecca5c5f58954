//! Shared Types
//!
//! Types used across the sync core: the card data model, the error
//! taxonomy and endpoint configuration.

pub mod card;
pub mod config;
pub mod error;

pub use card::{Card, ChangeAction, ChangeRecord, GlobalCard, Manifest, Section};
pub use config::{AppConfig, AppConfigBuilder, ConfigError, Endpoints};
pub use error::{Result, SyncError};
