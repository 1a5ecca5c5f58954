//! # Offline Mutation Queue
//!
//! Records create/update card mutations attempted while the device is
//! offline, in enqueue order, and keeps them durable across restarts.
//!
//! The queue itself is deliberately dumb: it appends, reads and clears.
//! Replay policy lives with the caller (see `replay.rs`) — the queue never
//! decides what happens to an item.
//!
//! ## Contract
//!
//! - `enqueue` appends; it only fails on storage I/O errors
//! - `drain` returns the pending list without removing it
//! - `clear` empties the queue unconditionally
//! - Replay order is strictly FIFO: conflicting edits to the same card
//!   (add then update) must apply in causal order

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::storage::{get_json, keys, set_json, KeyValueStore};
use crate::shared::card::Section;
use crate::shared::error::Result;

/// Payload of a queued card creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCardPayload {
    /// Client-generated placeholder identifier (`offline-<uuid>`)
    pub id: String,
    pub title: String,
    #[serde(rename = "imageUri")]
    pub image_uri: String,
    pub section: Section,
    pub line: u8,
    pub page: u8,
}

/// Payload of a queued card update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCardPayload {
    pub id: String,
    pub title: String,
    #[serde(rename = "imageUri", default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(rename = "audioUri", default, skip_serializing_if = "Option::is_none")]
    pub audio_uri: Option<String>,
}

/// One queued mutation, tagged by action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "lowercase")]
pub enum PendingMutation {
    Add(NewCardPayload),
    Update(UpdateCardPayload),
}

/// Durable FIFO queue of pending mutations.
///
/// Stored as a single JSON array under one key; each enqueue is a
/// read-modify-write of the whole list.
#[derive(Debug)]
pub struct MutationQueue<S> {
    store: Arc<S>,
}

impl<S> Clone for MutationQueue<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> MutationQueue<S> {
    /// Create a queue over the given storage
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Append a mutation to the queue
    pub async fn enqueue(&self, mutation: PendingMutation) -> Result<()> {
        let mut pending = self.load().await?;
        pending.push(mutation);
        set_json(self.store.as_ref(), keys::PENDING_MUTATIONS, &pending).await
    }

    /// Read the pending mutations without removing them, oldest first
    pub async fn drain(&self) -> Result<Vec<PendingMutation>> {
        self.load().await
    }

    /// Empty the queue unconditionally
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(keys::PENDING_MUTATIONS).await
    }

    /// Number of pending mutations
    pub async fn len(&self) -> Result<usize> {
        Ok(self.load().await?.len())
    }

    /// Whether the queue holds no mutations
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.load().await?.is_empty())
    }

    async fn load(&self) -> Result<Vec<PendingMutation>> {
        Ok(get_json(self.store.as_ref(), keys::PENDING_MUTATIONS)
            .await?
            .unwrap_or_default())
    }
}
