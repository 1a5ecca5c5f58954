//! Best-effort image preloading.
//!
//! After a delta applies, the updated cards' images are fetched once so
//! they land in whatever HTTP-level cache the platform provides. Failures
//! are logged and swallowed; preloading never blocks or fails a sync.

use futures_util::future::join_all;

use crate::client::http::{RequestOptions, ResilientClient};
use crate::client::storage::KeyValueStore;
use crate::shared::card::GlobalCard;

/// Fetch every card's image concurrently, ignoring failures
pub async fn preload_images<S: KeyValueStore>(client: &ResilientClient<S>, cards: &[GlobalCard]) {
    let fetches = cards.iter().map(|card| {
        let url = client.endpoints().public_uri(&card.image_uri);
        async move {
            match client.request(&url, RequestOptions::get()).await {
                Ok(response) if response.ok() => {
                    tracing::debug!(url, "image preloaded");
                }
                Ok(response) => {
                    tracing::warn!(url, status = response.status.as_u16(), "image preload rejected");
                }
                Err(error) => {
                    tracing::warn!(url, %error, "image preload failed");
                }
            }
        }
    });

    join_all(fetches).await;
}
