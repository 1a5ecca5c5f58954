//! # Offline Mutation Handling
//!
//! Card mutations attempted without connectivity are recorded durably and
//! replayed, in order, once the device comes back online.
//!
//! ## Key Components
//!
//! - `queue.rs`: durable FIFO of pending mutations
//! - `replay.rs`: batch replay driven by the connectivity watcher

pub mod queue;
pub mod replay;

pub use queue::{MutationQueue, NewCardPayload, PendingMutation, UpdateCardPayload};
pub use replay::{Replayer, ReplayReport};
