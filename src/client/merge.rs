//! # Presentation Merge
//!
//! Pure merge of a server card with its local override. No side effects
//! and no mutation of the input, so clearing an override always reveals
//! the original server value without a re-fetch.

use std::collections::HashMap;

use crate::client::overrides::OverrideEntry;
use crate::shared::card::Card;

/// Merge one card with its override, if any.
///
/// Precedence: override image/audio supersede the card's own. Thumbnail
/// fallback order: override image → server thumbnail → server image.
pub fn merge(card: &Card, entry: Option<&OverrideEntry>) -> Card {
    let mut merged = card.clone();

    if let Some(entry) = entry {
        if let Some(image) = &entry.image {
            merged.image_uri = image.clone();
            merged.thumbnail_uri = Some(image.clone());
        }
        if let Some(audio) = &entry.audio {
            merged.audio_kk = Some(audio.clone());
        }
    }

    if merged.thumbnail_uri.is_none() {
        merged.thumbnail_uri = Some(merged.image_uri.clone());
    }

    merged
}

/// Merge a card list against the override map, preserving order
pub fn merge_all(cards: &[Card], overrides: &HashMap<String, OverrideEntry>) -> Vec<Card> {
    cards
        .iter()
        .map(|card| merge(card, overrides.get(&card.id)))
        .collect()
}
