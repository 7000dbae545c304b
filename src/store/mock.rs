//! In-memory mock implementation of FactStore for testing.
//!
//! Backed by `tokio::sync::RwLock<HashMap<K, V>>` collections plus atomic
//! query counters, so cache-discipline tests can assert exactly how many
//! times the store was hit. Conditionally compiled with `#[cfg(test)]`.

use crate::store::models::{DikwLayer, EntityRecord, FactFilters, FactRecord};
use crate::store::traits::FactStore;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory mock implementation of FactStore for testing.
pub struct MockFactStore {
    pub facts: RwLock<HashMap<String, FactRecord>>,
    pub entities: RwLock<HashMap<String, EntityRecord>>,
    /// Number of `list_facts` calls observed.
    pub fact_queries: AtomicUsize,
    /// Number of `get_entities` calls observed.
    pub entity_queries: AtomicUsize,
    /// When set, every operation fails (simulates an unreachable store).
    pub fail: AtomicBool,
}

impl MockFactStore {
    /// Create a new empty MockFactStore.
    pub fn new() -> Self {
        Self {
            facts: RwLock::new(HashMap::new()),
            entities: RwLock::new(HashMap::new()),
            fact_queries: AtomicUsize::new(0),
            entity_queries: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // Builder / seeding methods for tests
    // ========================================================================

    /// Seed an entity into the store.
    pub async fn with_entity(self, entity: EntityRecord) -> Self {
        self.entities.write().await.insert(entity.id.clone(), entity);
        self
    }

    /// Seed a fact into the store.
    pub async fn with_fact(self, fact: FactRecord) -> Self {
        self.facts.write().await.insert(fact.id.clone(), fact);
        self
    }

    /// Seed a fact and default Semantic-layer entities for any participant
    /// not already present.
    pub async fn with_simple_fact(
        self,
        id: &str,
        participants: &[&str],
        confidence: f64,
    ) -> Self {
        {
            let mut entities = self.entities.write().await;
            for p in participants {
                entities.entry(p.to_string()).or_insert_with(|| EntityRecord {
                    id: p.to_string(),
                    name: p.to_string(),
                    entity_type: "concept".into(),
                    layer: DikwLayer::Semantic,
                    confidence: 0.9,
                });
            }
        }
        self.facts.write().await.insert(
            id.to_string(),
            FactRecord {
                id: id.to_string(),
                participants: participants.iter().map(|p| p.to_string()).collect(),
                fact_type: "relation".into(),
                aggregate_confidence: confidence,
                validated: false,
                validation_count: 0,
                extraction_method: Some("test".into()),
                source_document_id: Some("doc-1".into()),
                created_at: Some(chrono::Utc::now()),
            },
        );
        self
    }

    /// How many times `list_facts` has been called.
    pub fn fact_query_count(&self) -> usize {
        self.fact_queries.load(Ordering::SeqCst)
    }

    /// Flip the store into (or out of) failure mode.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockFactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FactStore for MockFactStore {
    async fn list_facts(&self, filters: &FactFilters) -> Result<Vec<FactRecord>> {
        self.fact_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            bail!("mock store failure");
        }

        let entities = self.entities.read().await;
        let facts = self.facts.read().await;

        let mut matched: Vec<FactRecord> = facts
            .values()
            .filter(|f| {
                if let Some(min) = filters.min_confidence {
                    if f.aggregate_confidence < min {
                        return false;
                    }
                }
                if let Some(document_id) = &filters.document_id {
                    if f.source_document_id.as_deref() != Some(document_id.as_str()) {
                        return false;
                    }
                }
                if let Some(fact_type) = &filters.fact_type {
                    if &f.fact_type != fact_type {
                        return false;
                    }
                }
                if let Some(layer) = filters.layer {
                    let all_in_layer = f
                        .participants
                        .iter()
                        .all(|p| entities.get(p).map(|e| e.layer) == Some(layer));
                    if !all_in_layer {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matched)
    }

    async fn get_entities(&self, ids: &[String]) -> Result<Vec<EntityRecord>> {
        self.entity_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            bail!("mock store failure");
        }

        let entities = self.entities.read().await;
        let mut found: Vec<EntityRecord> = ids
            .iter()
            .filter_map(|id| entities.get(id).cloned())
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn health_check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("mock store failure");
        }
        Ok(())
    }
}
