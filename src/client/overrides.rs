//! # Local Override Store
//!
//! Per-card local image/audio substitutions, layered over — never
//! replacing — the server record. This is how a user personalizes a global
//! card without admin rights: the override lives only on the device and is
//! merged in at read time (see [`merge`](crate::client::merge::merge)).
//!
//! The full map is persisted under one storage key and mirrored in memory,
//! so reads are synchronous. Every write is a read-modify-write of the
//! whole map followed by a flush; writes take `&mut self`, which
//! serializes them through the single owner. If the store were ever shared
//! mutably across tasks the flush would be last-write-wins with no merge.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::storage::{get_json, keys, set_json, KeyValueStore};
use crate::shared::error::Result;

/// Local substitution for one card. Either field may be absent; an entry
/// with both absent is pruned from the map entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    /// Device-local replacement image path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Device-local replacement audio path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

impl OverrideEntry {
    /// Whether both fields are absent
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.audio.is_none()
    }
}

/// Durable map of card id → local override, with an in-memory mirror.
#[derive(Debug)]
pub struct OverrideStore<S> {
    store: Arc<S>,
    map: HashMap<String, OverrideEntry>,
}

impl<S: KeyValueStore> OverrideStore<S> {
    /// Load the override map from durable storage
    pub async fn load(store: Arc<S>) -> Result<Self> {
        let map = get_json(store.as_ref(), keys::LOCAL_OVERRIDES)
            .await?
            .unwrap_or_default();
        Ok(Self { store, map })
    }

    /// Current override map
    pub fn get(&self) -> &HashMap<String, OverrideEntry> {
        &self.map
    }

    /// Override entry for one card, if any
    pub fn entry(&self, card_id: &str) -> Option<&OverrideEntry> {
        self.map.get(card_id)
    }

    /// Set or clear the local image for a card. `None` clears the field;
    /// an entry left with no fields is removed outright.
    pub async fn set_local_image(&mut self, card_id: &str, uri: Option<String>) -> Result<()> {
        self.set_field(card_id, uri, |entry| &mut entry.image).await
    }

    /// Set or clear the local audio for a card
    pub async fn set_local_audio(&mut self, card_id: &str, uri: Option<String>) -> Result<()> {
        self.set_field(card_id, uri, |entry| &mut entry.audio).await
    }

    async fn set_field(
        &mut self,
        card_id: &str,
        uri: Option<String>,
        field: impl Fn(&mut OverrideEntry) -> &mut Option<String>,
    ) -> Result<()> {
        match uri {
            Some(uri) => {
                let entry = self.map.entry(card_id.to_string()).or_default();
                *field(entry) = Some(uri);
            }
            None => {
                if let Some(entry) = self.map.get_mut(card_id) {
                    *field(entry) = None;
                    if entry.is_empty() {
                        self.map.remove(card_id);
                    }
                }
            }
        }
        self.flush().await
    }

    async fn flush(&self) -> Result<()> {
        set_json(self.store.as_ref(), keys::LOCAL_OVERRIDES, &self.map).await
    }
}
