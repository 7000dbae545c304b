//! In-memory hypergraph overlay: snapshot model and caching adapter.

pub mod adapter;
pub mod snapshot;

pub use adapter::{FilterKey, HypergraphAdapter, DEFAULT_CACHE_TTL};
pub use snapshot::{Hyperedge, HypergraphSnapshot};
