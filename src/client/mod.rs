//! # Client Modules
//!
//! The device-side sync core: durable storage, the resilient request
//! pipeline, catalog synchronization, offline mutation handling and the
//! local override layer.
//!
//! ## Architecture
//!
//! Everything is wired by explicit injection. One [`storage::KeyValueStore`]
//! instance backs all components; the [`connectivity::ConnectivityState`]
//! signal feeds both the request layer's offline checks and the watcher
//! that triggers queue replay.
//!
//! ## Key Components
//!
//! - `storage/`: key → JSON-text persistence (SQLite + in-memory fake)
//! - `auth.rs`: bearer token storage and the single-refresh collaborator
//! - `http.rs`: resilient request layer (offline cache fallback, 401
//!   refresh retry, response caching)
//! - `connectivity.rs`: connectivity signal and online-transition watcher
//! - `sync/`: manifest-based catalog sync engine and image preloading
//! - `offline/`: durable mutation queue and replay
//! - `overrides.rs`: per-card local image/audio override map
//! - `merge.rs`: pure card ⊕ override presentation merge
//! - `cards.rs`: personal and admin card HTTP APIs
//! - `media.rs`: promotion of picked assets into app storage

pub mod auth;
pub mod cards;
pub mod connectivity;
pub mod http;
pub mod media;
pub mod merge;
pub mod offline;
pub mod overrides;
pub mod storage;
pub mod sync;

pub use auth::TokenStore;
pub use cards::{CardUpdate, CardsApi, GlobalCardDraft, MutationOutcome, NewCard};
pub use connectivity::{ConnectivityState, ConnectivityWatcher};
pub use http::{HttpResponse, RequestOptions, ResilientClient};
pub use merge::{merge, merge_all};
pub use offline::{MutationQueue, PendingMutation, Replayer};
pub use overrides::{OverrideEntry, OverrideStore};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use sync::SyncEngine;
