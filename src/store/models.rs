//! Persistent-store models for facts and entities.
//!
//! These mirror what the extraction pipeline writes into Neo4j: a `Fact` node
//! per N-ary relation, linked to its participating `Entity` nodes via
//! `INVOLVES` relationships. The analytics subsystem only ever reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// DIKW layer
// ============================================================================

/// Categorical tag classifying an entity's role in the
/// data–information–knowledge–wisdom hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DikwLayer {
    Perception,
    Semantic,
    Reasoning,
    Application,
}

impl DikwLayer {
    /// Store-side string form (matches the `layer` property on `Entity` nodes).
    pub fn as_str(&self) -> &'static str {
        match self {
            DikwLayer::Perception => "perception",
            DikwLayer::Semantic => "semantic",
            DikwLayer::Reasoning => "reasoning",
            DikwLayer::Application => "application",
        }
    }

    /// Parse the store-side string form. Unknown values are rejected so a
    /// typo'd filter fails loudly instead of matching nothing.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "perception" => Some(DikwLayer::Perception),
            "semantic" => Some(DikwLayer::Semantic),
            "reasoning" => Some(DikwLayer::Reasoning),
            "application" => Some(DikwLayer::Application),
            _ => None,
        }
    }
}

impl std::fmt::Display for DikwLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Fact (hyperedge) record
// ============================================================================

/// An N-ary fact as stored: one `Fact` node plus its `INVOLVES` links.
///
/// `participants` carries entity ids in store order; the snapshot layer
/// deduplicates and re-sorts them. Facts with fewer than 2 distinct
/// participants are dropped at snapshot build time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactRecord {
    pub id: String,
    pub participants: Vec<String>,
    pub fact_type: String,
    pub aggregate_confidence: f64,
    #[serde(default)]
    pub validated: bool,
    #[serde(default)]
    pub validation_count: u32,
    #[serde(default)]
    pub extraction_method: Option<String>,
    #[serde(default)]
    pub source_document_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Entity record
// ============================================================================

/// An entity node as stored. Lifecycle is owned by extraction/resolution;
/// the analytics subsystem treats these as read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub name: String,
    pub entity_type: String,
    pub layer: DikwLayer,
    pub confidence: f64,
}

// ============================================================================
// Fact filters
// ============================================================================

/// Conjunctive (AND) filters applied when listing facts from the store.
///
/// `None` fields do not constrain. An empty `FactFilters::default()` selects
/// every fact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactFilters {
    /// Keep facts with `aggregate_confidence >= min_confidence`.
    pub min_confidence: Option<f64>,
    /// Keep facts where every participant carries this DIKW layer.
    pub layer: Option<DikwLayer>,
    /// Keep facts extracted from this source document.
    pub document_id: Option<String>,
    /// Keep facts of this type.
    pub fact_type: Option<String>,
}

impl FactFilters {
    /// True when no filter constrains the listing.
    pub fn is_empty(&self) -> bool {
        self.min_confidence.is_none()
            && self.layer.is_none()
            && self.document_id.is_none()
            && self.fact_type.is_none()
    }
}

// ============================================================================
// Tests
// ============================================================================
