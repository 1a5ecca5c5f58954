//! # Queue Replay
//!
//! Replays the offline mutation queue once connectivity returns.
//!
//! The batch contract: drain the queue, replay every item strictly in
//! enqueue order through the normal card APIs with a freshly read token,
//! and clear the queue only after the whole batch has been attempted. A
//! failed item is caught, logged and skipped; it does not abort the batch
//! and is not requeued. Eventual delivery is explicitly not promised.

use crate::client::cards::{CardUpdate, CardsApi, NewCard};
use crate::client::offline::queue::{MutationQueue, PendingMutation};
use crate::client::storage::KeyValueStore;
use crate::shared::error::Result;

/// Outcome counts for one replay batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Items taken from the queue
    pub attempted: usize,
    /// Items the server accepted
    pub succeeded: usize,
    /// Items that failed and were dropped
    pub dropped: usize,
}

/// Drives the replay batch. Intended as the callback wired into
/// [`ConnectivityWatcher::spawn`](crate::client::connectivity::ConnectivityWatcher::spawn).
#[derive(Debug)]
pub struct Replayer<S> {
    api: CardsApi<S>,
    queue: MutationQueue<S>,
}

impl<S> Clone for Replayer<S> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            queue: self.queue.clone(),
        }
    }
}

impl<S: KeyValueStore> Replayer<S> {
    /// Create a replayer over the card API and its queue
    pub fn new(api: CardsApi<S>, queue: MutationQueue<S>) -> Self {
        Self { api, queue }
    }

    /// Replay all pending mutations, then clear the queue.
    ///
    /// Storage failures reading or clearing the queue propagate; per-item
    /// replay failures never do.
    pub async fn replay_pending(&self) -> Result<ReplayReport> {
        let pending = self.queue.drain().await?;
        if pending.is_empty() {
            return Ok(ReplayReport::default());
        }

        let mut report = ReplayReport {
            attempted: pending.len(),
            ..Default::default()
        };
        tracing::info!(count = pending.len(), "replaying offline mutations");

        for mutation in pending {
            match self.replay_one(&mutation).await {
                Ok(()) => report.succeeded += 1,
                Err(error) => {
                    report.dropped += 1;
                    tracing::warn!(%error, ?mutation, "offline mutation replay failed, dropping");
                }
            }
        }

        self.queue.clear().await?;
        tracing::info!(
            succeeded = report.succeeded,
            dropped = report.dropped,
            "offline replay batch finished"
        );
        Ok(report)
    }

    async fn replay_one(&self, mutation: &PendingMutation) -> Result<()> {
        // No explicit bearer: the request layer reads the stored token
        // fresh per item, so a mid-batch refresh is picked up.
        match mutation {
            PendingMutation::Add(payload) => {
                self.api
                    .add_card(
                        NewCard {
                            title: payload.title.clone(),
                            image_uri: payload.image_uri.clone(),
                            section: payload.section,
                            line: payload.line,
                            page: payload.page,
                        },
                        None,
                    )
                    .await?;
            }
            PendingMutation::Update(payload) => {
                self.api
                    .update_card(
                        &payload.id,
                        CardUpdate {
                            title: payload.title.clone(),
                            image_uri: payload.image_uri.clone(),
                            audio_uri: payload.audio_uri.clone(),
                        },
                        None,
                    )
                    .await?;
            }
        }
        Ok(())
    }
}
