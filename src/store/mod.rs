//! Persistent fact store access — the graph query gateway.

pub mod models;
pub mod neo4j;
pub mod traits;

pub use models::{DikwLayer, EntityRecord, FactFilters, FactRecord};
pub use neo4j::Neo4jFactStore;
pub use traits::FactStore;

#[cfg(test)]
pub(crate) mod mock;
