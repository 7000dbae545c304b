//! FactStore trait definition
//!
//! Abstract read-only interface to the persistent fact store. The analytics
//! subsystem depends on this contract only, never on a concrete query
//! language, enabling testing with mock implementations and future backend
//! swaps.

use crate::store::models::{EntityRecord, FactFilters, FactRecord};
use anyhow::Result;
use async_trait::async_trait;

/// Read-only gateway to the persistent fact store.
#[async_trait]
pub trait FactStore: Send + Sync {
    // ========================================================================
    // Fact operations
    // ========================================================================

    /// List facts matching the given conjunctive filters, with participant ids.
    async fn list_facts(&self, filters: &FactFilters) -> Result<Vec<FactRecord>>;

    // ========================================================================
    // Entity operations
    // ========================================================================

    /// Fetch entity properties for the given id list. Ids without a matching
    /// entity are simply absent from the result.
    async fn get_entities(&self, ids: &[String]) -> Result<Vec<EntityRecord>>;

    // ========================================================================
    // Health
    // ========================================================================

    /// Cheap connectivity probe. `Ok(())` means the store answered.
    async fn health_check(&self) -> Result<()>;
}
