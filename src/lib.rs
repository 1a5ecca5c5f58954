//! Soylem Sync - Main Library
//!
//! Offline-tolerant data synchronization core for the Soylem picture-card
//! language app (Russian/Kazakh/English). The surrounding app renders
//! categorized card pages and reads assembled sentences aloud; this crate
//! is the part that keeps its shared catalog correct on an unreliable
//! mobile network.
//!
//! # Overview
//!
//! Four cooperating pieces:
//!
//! - **Sync engine** - incrementally hydrates the shared, versioned card
//!   catalog into local storage using a manifest/changes protocol, with an
//!   all-or-nothing checkpoint per cycle
//! - **Resilient request layer** - wraps every network call with offline
//!   cache fallback, a single transparent token refresh on 401 and
//!   write-through caching of catalog list responses
//! - **Offline mutation queue** - records card create/update operations
//!   made without connectivity and replays them in order when the device
//!   comes back online
//! - **Local override store** - per-card image/audio substitutions merged
//!   over server data at read time, never touching the server record
//!
//! # Module Structure
//!
//! - **`shared`** - data model, endpoint configuration, error taxonomy
//! - **`client`** - storage, request pipeline, sync, offline queue,
//!   overrides and the card APIs
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use soylem_sync::client::connectivity::{ConnectivityState, ConnectivityWatcher};
//! use soylem_sync::client::{CardsApi, MutationQueue, Replayer, ResilientClient, SqliteStore, SyncEngine};
//! use soylem_sync::shared::AppConfig;
//!
//! # async fn example() -> soylem_sync::shared::Result<()> {
//! let config = AppConfig::default();
//! let store = Arc::new(SqliteStore::open_default().await?);
//! let connectivity = ConnectivityState::new(true);
//!
//! let client = Arc::new(ResilientClient::new(
//!     Arc::clone(&store),
//!     config.endpoints(),
//!     connectivity.subscribe(),
//! )?);
//!
//! // Catalog sync on cold start / foreground
//! let engine = SyncEngine::new(Arc::clone(&store), Arc::clone(&client));
//! let cards = engine.sync().await?;
//!
//! // Replay queued mutations whenever connectivity returns
//! let queue = MutationQueue::new(Arc::clone(&store));
//! let replayer = Replayer::new(CardsApi::new(client, queue.clone()), queue);
//! ConnectivityWatcher::spawn(connectivity.subscribe(), move || {
//!     let replayer = replayer.clone();
//!     async move {
//!         let _ = replayer.replay_pending().await;
//!     }
//! });
//! # let _ = cards;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod shared;
