//! Facts-committed event system
//!
//! This module provides:
//! - `FactsCommitted` — signal emitted after upstream ingestion commits facts
//! - `EventBus` — broadcast channel distributing signals to subscribers
//! - `spawn_invalidation_hook` — background task flushing the snapshot cache
//!   on every signal

mod bus;
mod invalidation;
mod types;

pub use bus::EventBus;
pub use invalidation::spawn_invalidation_hook;
pub use types::FactsCommitted;
