//! Test helper factories for snapshots, facts, and entities
//!
//! Provides convenience builders with sensible defaults so algorithm and
//! handler tests can describe hypergraphs as plain (id, participants) lists.
#![allow(dead_code)]

use crate::hypergraph::snapshot::HypergraphSnapshot;
use crate::store::models::{DikwLayer, EntityRecord, FactFilters, FactRecord};

// ============================================================================
// Record factories
// ============================================================================

/// A Semantic-layer concept entity whose name equals its id.
pub fn entity(id: &str) -> EntityRecord {
    entity_typed(id, "concept", DikwLayer::Semantic)
}

pub fn entity_typed(id: &str, entity_type: &str, layer: DikwLayer) -> EntityRecord {
    EntityRecord {
        id: id.to_string(),
        name: id.to_string(),
        entity_type: entity_type.to_string(),
        layer,
        confidence: 0.9,
    }
}

/// A fact with default confidence 0.8.
pub fn fact(id: &str, participants: &[&str]) -> FactRecord {
    fact_with_confidence(id, participants, 0.8)
}

pub fn fact_with_confidence(id: &str, participants: &[&str], confidence: f64) -> FactRecord {
    FactRecord {
        id: id.to_string(),
        participants: participants.iter().map(|p| p.to_string()).collect(),
        fact_type: "relation".into(),
        aggregate_confidence: confidence,
        validated: false,
        validation_count: 0,
        extraction_method: Some("test".into()),
        source_document_id: Some("doc-1".into()),
        created_at: None,
    }
}

// ============================================================================
// Snapshot builders
// ============================================================================

/// Build a snapshot from (fact id, participants) pairs, minting a default
/// entity for every distinct participant.
pub fn snapshot_of(facts: &[(&str, &[&str])]) -> HypergraphSnapshot {
    let mut entity_ids: Vec<&str> = facts.iter().flat_map(|(_, ps)| ps.iter().copied()).collect();
    entity_ids.sort_unstable();
    entity_ids.dedup();

    HypergraphSnapshot::build(
        facts.iter().map(|(id, ps)| fact(id, ps)).collect(),
        entity_ids.into_iter().map(entity).collect(),
        FactFilters::default(),
    )
}

/// The canonical connectivity fixture: f1={a,b,c}, f2={b,c,d}, f3={d,e}.
///
/// At s=1 everything is one component; at s=2 the f2–f3 overlap {d} is too
/// small to connect, splitting off {e}.
pub fn three_fact_chain() -> HypergraphSnapshot {
    snapshot_of(&[
        ("f1", &["a", "b", "c"]),
        ("f2", &["b", "c", "d"]),
        ("f3", &["d", "e"]),
    ])
}

/// A snapshot holding exactly one hyperedge over three entities.
pub fn single_edge_snapshot() -> HypergraphSnapshot {
    snapshot_of(&[("f1", &["a", "b", "c"])])
}

/// A snapshot with no edges and therefore no nodes.
pub fn empty_snapshot() -> HypergraphSnapshot {
    HypergraphSnapshot::empty(FactFilters::default())
}

/// Two tight clusters of triangle facts bridged by one weak fact; Louvain
/// should split the bridge.
pub fn two_cluster_snapshot() -> HypergraphSnapshot {
    snapshot_of(&[
        ("f1", &["a1", "a2", "a3"]),
        ("f2", &["a1", "a2", "a4"]),
        ("f3", &["a2", "a3", "a4"]),
        ("f4", &["a1", "a3", "a4"]),
        ("f5", &["b1", "b2", "b3"]),
        ("f6", &["b1", "b2", "b4"]),
        ("f7", &["b2", "b3", "b4"]),
        ("f8", &["b1", "b3", "b4"]),
        ("f9", &["a1", "b1"]),
    ])
}
