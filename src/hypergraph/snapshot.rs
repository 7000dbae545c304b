//! Immutable in-memory hypergraph snapshot.
//!
//! A snapshot is the analytical overlay built from one gateway read: every
//! fact becomes a hyperedge over its distinct participants, every participant
//! becomes a node. Once built it is never mutated; the adapter shares it as
//! `Arc<HypergraphSnapshot>` and all analytics read it concurrently.
//!
//! Edges and nodes live in `BTreeMap`s so iteration order is stable, which is
//! what makes analytics output reproducible across calls.

use crate::store::models::{EntityRecord, FactFilters, FactRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// Hyperedge
// ============================================================================

/// One N-ary fact projected into the snapshot: its distinct participant set
/// plus the properties analytics cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperedge {
    pub id: String,
    pub participants: BTreeSet<String>,
    pub fact_type: String,
    pub aggregate_confidence: f64,
    pub validated: bool,
    pub validation_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_document_id: Option<String>,
}

impl Hyperedge {
    /// Number of distinct participants.
    pub fn arity(&self) -> usize {
        self.participants.len()
    }

    /// Number of participants shared with another hyperedge.
    pub fn shared_participants(&self, other: &Hyperedge) -> usize {
        self.participants.intersection(&other.participants).count()
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Immutable hypergraph value built from one gateway read.
///
/// Tagged with the exact filters used to build it and a creation timestamp;
/// the adapter uses the tag as the cache key and the timestamp for TTL
/// accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypergraphSnapshot {
    pub edges: BTreeMap<String, Hyperedge>,
    pub nodes: BTreeMap<String, EntityRecord>,
    pub filters: FactFilters,
    pub created_at: DateTime<Utc>,
}

impl HypergraphSnapshot {
    /// Build a snapshot from raw store records.
    ///
    /// Participants without a loaded entity are dropped from their edge;
    /// edges left with fewer than 2 distinct participants are excluded
    /// entirely, and nodes no kept edge references are pruned. The result
    /// therefore always satisfies the arity invariant.
    pub fn build(
        facts: Vec<FactRecord>,
        entities: Vec<EntityRecord>,
        filters: FactFilters,
    ) -> Self {
        let mut nodes: BTreeMap<String, EntityRecord> = entities
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect();

        let mut edges = BTreeMap::new();
        for fact in facts {
            let mut participants: BTreeSet<String> = BTreeSet::new();
            for p in &fact.participants {
                if nodes.contains_key(p) {
                    participants.insert(p.clone());
                } else {
                    tracing::debug!(fact_id = %fact.id, participant = %p, "Dropping participant without a loaded entity");
                }
            }

            if participants.len() < 2 {
                tracing::debug!(fact_id = %fact.id, arity = participants.len(), "Excluding hyperedge below arity 2");
                continue;
            }

            edges.insert(
                fact.id.clone(),
                Hyperedge {
                    id: fact.id,
                    participants,
                    fact_type: fact.fact_type,
                    aggregate_confidence: fact.aggregate_confidence,
                    validated: fact.validated,
                    validation_count: fact.validation_count,
                    extraction_method: fact.extraction_method,
                    source_document_id: fact.source_document_id,
                },
            );
        }

        let referenced: BTreeSet<&String> =
            edges.values().flat_map(|e| e.participants.iter()).collect();
        nodes.retain(|id, _| referenced.contains(id));

        Self {
            edges,
            nodes,
            filters,
            created_at: Utc::now(),
        }
    }

    /// An empty snapshot carrying the given filter tag.
    pub fn empty(filters: FactFilters) -> Self {
        Self {
            edges: BTreeMap::new(),
            nodes: BTreeMap::new(),
            filters,
            created_at: Utc::now(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True when the snapshot holds no edges (and therefore no nodes).
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains_entity(&self, entity_id: &str) -> bool {
        self.nodes.contains_key(entity_id)
    }

    /// Ids of every hyperedge the entity participates in, in edge-id order.
    pub fn edges_of(&self, entity_id: &str) -> Vec<&Hyperedge> {
        self.edges
            .values()
            .filter(|e| e.participants.contains(entity_id))
            .collect()
    }

    /// Hyperedge degree of an entity (how many edges contain it).
    pub fn degree(&self, entity_id: &str) -> usize {
        self.edges
            .values()
            .filter(|e| e.participants.contains(entity_id))
            .count()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{entity, fact};

    #[test]
    fn test_build_keeps_valid_edges() {
        let snap = HypergraphSnapshot::build(
            vec![fact("f1", &["a", "b", "c"]), fact("f2", &["b", "c", "d"])],
            vec![entity("a"), entity("b"), entity("c"), entity("d")],
            FactFilters::default(),
        );

        assert_eq!(snap.edge_count(), 2);
        assert_eq!(snap.node_count(), 4);
        assert_eq!(snap.edges["f1"].arity(), 3);
        assert_eq!(snap.edges["f1"].shared_participants(&snap.edges["f2"]), 2);
    }

    #[test]
    fn test_build_excludes_low_arity_edges() {
        // f2 has one distinct participant after dedup, f3 references only
        // one loaded entity
        let snap = HypergraphSnapshot::build(
            vec![
                fact("f1", &["a", "b"]),
                fact("f2", &["a", "a"]),
                fact("f3", &["b", "ghost"]),
            ],
            vec![entity("a"), entity("b")],
            FactFilters::default(),
        );

        assert_eq!(snap.edge_count(), 1);
        assert!(snap.edges.contains_key("f1"));
    }

    #[test]
    fn test_build_prunes_orphan_nodes() {
        // c's only fact is excluded, so c must not linger in the node map
        let snap = HypergraphSnapshot::build(
            vec![fact("f1", &["a", "b"]), fact("f2", &["c"])],
            vec![entity("a"), entity("b"), entity("c")],
            FactFilters::default(),
        );

        assert_eq!(snap.node_count(), 2);
        assert!(!snap.contains_entity("c"));
    }

    #[test]
    fn test_arity_invariant() {
        let snap = HypergraphSnapshot::build(
            vec![
                fact("f1", &["a", "b", "c"]),
                fact("f2", &["b", "c", "d"]),
                fact("f3", &["d", "e"]),
            ],
            vec![
                entity("a"),
                entity("b"),
                entity("c"),
                entity("d"),
                entity("e"),
            ],
            FactFilters::default(),
        );

        let participant_sum: usize = snap.edges.values().map(|e| e.arity()).sum();
        assert!(participant_sum >= 2 * snap.edge_count());
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = HypergraphSnapshot::empty(FactFilters::default());
        assert!(snap.is_empty());
        assert_eq!(snap.node_count(), 0);
        assert_eq!(snap.degree("anything"), 0);
        assert!(snap.edges_of("anything").is_empty());
    }

    #[test]
    fn test_degree_and_incidence() {
        let snap = HypergraphSnapshot::build(
            vec![
                fact("f1", &["a", "b", "c"]),
                fact("f2", &["b", "c", "d"]),
                fact("f3", &["d", "e"]),
            ],
            vec![
                entity("a"),
                entity("b"),
                entity("c"),
                entity("d"),
                entity("e"),
            ],
            FactFilters::default(),
        );

        assert_eq!(snap.degree("b"), 2);
        assert_eq!(snap.degree("e"), 1);
        let edges_of_d: Vec<&str> = snap.edges_of("d").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edges_of_d, vec!["f2", "f3"]);
    }
}
