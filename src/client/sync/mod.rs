//! # Catalog Synchronization
//!
//! Incremental sync of the shared card catalog via the manifest/changes
//! protocol, plus best-effort asset preloading.
//!
//! ## Key Components
//!
//! - `engine.rs`: manifest reconciliation, delta hydration, checkpointing
//! - `preload.rs`: best-effort image prefetch for updated cards

pub mod engine;
pub mod preload;

pub use engine::{Checkpoint, SyncEngine};
pub use preload::preload_images;
