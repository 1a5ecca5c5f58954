//! # Manifest-Based Sync Engine
//!
//! Reconciles the local catalog snapshot with the server's current version
//! using the manifest/changes protocol:
//!
//! 1. Fetch the remote manifest `{version, updatedAt}`
//! 2. Compare against the local checkpoint version; equal means the
//!    catalog is unchanged and the local snapshot is served with no
//!    further network traffic
//! 3. Otherwise fetch the change list since the last sync timestamp and
//!    hydrate each changed card sequentially, in server order
//! 4. Commit the new checkpoint only after the whole delta applied
//! 5. Preload images for the updated batch, best effort
//!
//! A failure fetching the manifest, the change list or any single card
//! aborts the cycle before the checkpoint commit, so the next attempt
//! retries the identical window instead of silently skipping records.

use std::sync::Arc;

use crate::client::http::{RequestOptions, ResilientClient};
use crate::client::storage::{card_key, keys, KeyValueStore};
use crate::client::sync::preload::preload_images;
use crate::shared::card::{Card, ChangeAction, ChangeRecord, GlobalCard, Manifest};
use crate::shared::error::{Result, SyncError};

/// Locally persisted sync progress marker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkpoint {
    /// Last-applied catalog manifest version; 0 means never synced
    pub version: u64,
    /// Last successful sync timestamp, ISO-8601
    pub last_sync: Option<String>,
}

/// Incremental catalog synchronizer.
///
/// `sync()` is idempotent and safe to call on every app foreground.
#[derive(Debug)]
pub struct SyncEngine<S> {
    store: Arc<S>,
    client: Arc<ResilientClient<S>>,
}

impl<S> Clone for SyncEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            client: Arc::clone(&self.client),
        }
    }
}

impl<S: KeyValueStore> SyncEngine<S> {
    /// Create an engine over the given storage and request layer
    pub fn new(store: Arc<S>, client: Arc<ResilientClient<S>>) -> Self {
        Self { store, client }
    }

    /// Synchronize the shared catalog and return the full local snapshot.
    pub async fn sync(&self) -> Result<Vec<Card>> {
        let manifest: Manifest = self
            .client
            .get_json(&self.client.endpoints().global_manifest(), "manifest fetch")
            .await?;

        let checkpoint = self.checkpoint().await?;
        if manifest.version == checkpoint.version {
            tracing::debug!(version = manifest.version, "catalog unchanged, serving local snapshot");
            return self.load_local_cards().await;
        }

        // A missing or zeroed checkpoint means the local cache is empty;
        // an empty `since` asks the server for every record.
        let since = if checkpoint.version == 0 {
            String::new()
        } else {
            checkpoint.last_sync.clone().unwrap_or_default()
        };

        let changes = self.fetch_changes(&since).await?;
        tracing::info!(
            local = checkpoint.version,
            remote = manifest.version,
            changes = changes.len(),
            "applying catalog delta"
        );

        let mut updated = Vec::new();
        for change in &changes {
            match change.action {
                ChangeAction::Add | ChangeAction::Update => {
                    let card: GlobalCard = self
                        .client
                        .get_json(
                            &self.client.endpoints().global_card(&change.id),
                            "card fetch",
                        )
                        .await?;
                    self.store
                        .set(&card_key(&card.id), &serde_json::to_string(&card)?)
                        .await?;
                    updated.push(card);
                }
                ChangeAction::Delete => {
                    // No tombstone: a concurrent re-add is trusted to the
                    // server-provided change order, applied sequentially.
                    self.store.remove(&card_key(&change.id)).await?;
                }
            }
        }

        self.commit_checkpoint(manifest.version).await?;

        if !updated.is_empty() {
            preload_images(&self.client, &updated).await;
        }

        self.load_local_cards().await
    }

    /// Read the persisted checkpoint. Absent or unparseable values are
    /// treated as never-synced.
    pub async fn checkpoint(&self) -> Result<Checkpoint> {
        let version = self
            .store
            .get(keys::MANIFEST_VERSION)
            .await?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);
        let last_sync = self.store.get(keys::LAST_SYNC).await?;
        Ok(Checkpoint { version, last_sync })
    }

    /// Materialize the full local snapshot from the persisted card records.
    ///
    /// Malformed records are skipped rather than failing the whole
    /// snapshot. Thumbnails use the server field when stored, else the
    /// naming convention.
    pub async fn load_local_cards(&self) -> Result<Vec<Card>> {
        let card_keys = self.store.keys_with_prefix(keys::CARD_PREFIX).await?;
        let mut cards = Vec::with_capacity(card_keys.len());

        for key in card_keys {
            let Some(raw) = self.store.get(&key).await? else {
                continue;
            };
            match serde_json::from_str::<GlobalCard>(&raw) {
                Ok(gc) => cards.push(Card::from_catalog(gc)),
                Err(error) => {
                    tracing::warn!(key, %error, "skipping malformed local card record");
                }
            }
        }

        Ok(cards)
    }

    async fn fetch_changes(&self, since: &str) -> Result<Vec<ChangeRecord>> {
        let mut options = RequestOptions::get();
        if !since.is_empty() {
            options = options.query("since", since);
        }

        let response = self
            .client
            .request(&self.client.endpoints().global_changes(), options)
            .await?;
        if !response.ok() {
            return Err(SyncError::status(
                "changes fetch",
                response.status.as_u16(),
                response.body,
            ));
        }
        response.json()
    }

    /// Persist the new checkpoint. Called only after every change in the
    /// batch has been applied.
    async fn commit_checkpoint(&self, version: u64) -> Result<()> {
        self.store
            .set(keys::MANIFEST_VERSION, &version.to_string())
            .await?;
        self.store
            .set(keys::LAST_SYNC, &chrono::Utc::now().to_rfc3339())
            .await
    }
}
