//! # Durable Key-Value Storage
//!
//! All client-side persistent state lives in a key → JSON-text store:
//! sync checkpoint scalars, per-card catalog records, the override map,
//! the pending mutation queue and the response caches. Keys are
//! partitioned by purpose so unrelated operations never contend on the
//! same key; no cross-key transactions are required or assumed.
//!
//! Consumers receive an injected store object implementing
//! [`KeyValueStore`] rather than reaching for ambient global state, which
//! keeps every component testable against [`MemoryStore`].
//!
//! ## Key Components
//!
//! - `KeyValueStore`: async get/set/remove/enumerate contract
//! - `sqlite.rs`: SQLite-backed store for devices
//! - `memory.rs`: in-memory fake for tests

pub mod memory;
pub mod sqlite;

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::shared::error::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Well-known storage keys.
pub mod keys {
    /// Stored access token
    pub const ACCESS_TOKEN: &str = "userToken";
    /// Stored refresh token
    pub const REFRESH_TOKEN: &str = "refreshToken";
    /// Last successful personal-cards list response body
    pub const CARDS_CACHE: &str = "cardsCache";
    /// Last successful global-cards list response body
    pub const GLOBAL_CACHE: &str = "globalCardsCache";
    /// Last-applied catalog manifest version
    pub const MANIFEST_VERSION: &str = "globalManifestVersion";
    /// Last successful sync timestamp, ISO-8601
    pub const LAST_SYNC: &str = "globalLastSync";
    /// Pending offline mutation queue
    pub const PENDING_MUTATIONS: &str = "pendingCards";
    /// Local image/audio override map
    pub const LOCAL_OVERRIDES: &str = "local_card_assets";
    /// Prefix for per-card catalog records
    pub const CARD_PREFIX: &str = "card:";
}

/// Storage key for a persisted catalog card record
pub fn card_key(id: &str) -> String {
    format!("{}{}", keys::CARD_PREFIX, id)
}

/// Asynchronous key → JSON-text store.
///
/// Every operation suspends until the backing storage completes; callers
/// must not assume synchronous completion. Storage I/O errors propagate to
/// the caller with no automatic retry.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Store `value` under `key`, overwriting any prior value
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;

    /// Delete the value stored under `key`, if any
    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// Enumerate all keys starting with `prefix`, sorted
    fn keys_with_prefix(&self, prefix: &str) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Read and deserialize a JSON value stored under `key`
pub async fn get_json<S, T>(store: &S, key: &str) -> Result<Option<T>>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize and store a value as JSON under `key`
pub async fn set_json<S, T>(store: &S, key: &str, value: &T) -> Result<()>
where
    S: KeyValueStore,
    T: Serialize,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}
