//! Structural confidence boost pass.
//!
//! Converts analytics output into bounded per-entity confidence boosts for
//! the reasoning pipeline. The pass precomputes centrality and communities
//! once per snapshot, then answers per-entity lookups from those tables, so
//! it is safe to share across concurrent scoring tasks.
//!
//! ## Boost model
//!
//! - Centrality: entities in the top 20% by score gain up to 0.05, scaled
//!   linearly across the band (80th percentile → 0, 100th → 0.05).
//! - Community: entities whose community contributes above-average modularity
//!   gain up to 0.03, scaled from the mean (→ 0) to the best community
//!   (→ 0.03).
//! - The sum is capped at 0.08.
//!
//! A lookup for an entity outside the snapshot, or a pass built while
//! analytics is unavailable, yields a zero boost with no provenance. The pass
//! never fails the surrounding reasoning work.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analytics::models::{CentralityResult, CommunityResult};
use crate::analytics::AnalyticsEngine;
use crate::hypergraph::snapshot::HypergraphSnapshot;

/// Upper bound on the combined boost.
pub const MAX_BOOST: f64 = 0.08;

/// Tag identifying this pass in provenance records.
pub const RULE_SOURCE: &str = "hypergraph_structural";

const CENTRALITY_BAND_FLOOR: f64 = 0.8;
const CENTRALITY_MAX_BOOST: f64 = 0.05;
const COMMUNITY_MAX_BOOST: f64 = 0.03;

// ============================================================================
// Output types
// ============================================================================

/// Why an entity received its boost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostProvenance {
    /// Always [`RULE_SOURCE`].
    pub rule_source: String,
    pub centrality_score: f64,
    pub community_id: u32,
    pub community_size: usize,
}

/// Per-entity result handed to the reasoning pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralBoost {
    /// Combined boost in `[0, 0.08]`.
    pub boost: f64,
    /// Present for entities in the snapshot the pass was built from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<BoostProvenance>,
}

impl StructuralBoost {
    fn zero() -> Self {
        Self {
            boost: 0.0,
            provenance: None,
        }
    }
}

// ============================================================================
// Pass
// ============================================================================

#[derive(Debug, Clone)]
struct EntityStanding {
    boost: f64,
    provenance: BoostProvenance,
}

/// Precomputed boost table for one snapshot.
pub struct StructuralBoostPass {
    entries: BTreeMap<String, EntityStanding>,
}

impl StructuralBoostPass {
    /// Build the table from already-computed analytics results.
    pub fn new(centrality: &[CentralityResult], communities: &CommunityResult) -> Self {
        let n = centrality.len();

        // Sorted copy for percentile lookups: an entity's percentile is the
        // fraction of *other* entities scoring strictly below it, so tied
        // scores share a percentile and a uniform snapshot boosts nobody.
        let mut ascending: Vec<f64> = centrality.iter().map(|r| r.score).collect();
        ascending.sort_by(f64::total_cmp);

        // entity id → (community id, size, contribution)
        let mut membership: BTreeMap<&str, (u32, usize, f64)> = BTreeMap::new();
        for community in &communities.communities {
            for member in &community.members {
                membership.insert(
                    member.as_str(),
                    (
                        community.id,
                        community.size,
                        community.modularity_contribution,
                    ),
                );
            }
        }

        let (mean_contribution, max_contribution) = contribution_stats(communities);

        let mut entries = BTreeMap::new();
        for row in centrality {
            let Some(&(community_id, community_size, contribution)) =
                membership.get(row.entity_id.as_str())
            else {
                // centrality and communities are built from the same snapshot,
                // so membership always resolves; skip rather than guess if an
                // inconsistent pair is ever passed in
                continue;
            };

            let below = ascending.partition_point(|&score| score < row.score);
            let percentile = if n > 1 {
                below as f64 / (n - 1) as f64
            } else {
                1.0
            };

            let centrality_component = if percentile >= CENTRALITY_BAND_FLOOR {
                (percentile - CENTRALITY_BAND_FLOOR) / (1.0 - CENTRALITY_BAND_FLOOR)
                    * CENTRALITY_MAX_BOOST
            } else {
                0.0
            };

            let community_component = if contribution > mean_contribution
                && max_contribution > mean_contribution
            {
                (contribution - mean_contribution) / (max_contribution - mean_contribution)
                    * COMMUNITY_MAX_BOOST
            } else {
                0.0
            };

            entries.insert(
                row.entity_id.clone(),
                EntityStanding {
                    boost: (centrality_component + community_component).min(MAX_BOOST),
                    provenance: BoostProvenance {
                        rule_source: RULE_SOURCE.to_string(),
                        centrality_score: row.score,
                        community_id,
                        community_size,
                    },
                },
            );
        }

        Self { entries }
    }

    /// Pass that boosts nothing. Used when analytics is unavailable.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Run the analytics prerequisites and build the pass. Any analytics
    /// failure degrades to an empty pass; reasoning continues without boosts.
    pub async fn compute(
        engine: Option<&Arc<AnalyticsEngine>>,
        snapshot: Arc<HypergraphSnapshot>,
    ) -> Self {
        let Some(engine) = engine else {
            debug!("analytics unavailable, skipping structural boost pass");
            return Self::empty();
        };

        let centrality = match engine.entity_centrality(snapshot.clone(), 1).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, "centrality failed, skipping structural boost pass");
                return Self::empty();
            }
        };
        let communities = match engine.detect_communities(snapshot).await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "community detection failed, skipping structural boost pass");
                return Self::empty();
            }
        };

        Self::new(&centrality, &communities)
    }

    /// Boost for one entity. Entities outside the snapshot get a zero boost
    /// with no provenance.
    pub fn boost(&self, entity_id: &str) -> StructuralBoost {
        match self.entries.get(entity_id) {
            Some(standing) => StructuralBoost {
                boost: standing.boost,
                provenance: Some(standing.provenance.clone()),
            },
            None => StructuralBoost::zero(),
        }
    }

    /// Boosts for a batch of candidate ids. Ids outside the snapshot are
    /// omitted; the reasoning host treats a missing entry as zero.
    pub fn boost_many(&self, entity_ids: &[String]) -> BTreeMap<String, StructuralBoost> {
        entity_ids
            .iter()
            .filter(|id| self.entries.contains_key(id.as_str()))
            .map(|id| (id.clone(), self.boost(id)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn contribution_stats(communities: &CommunityResult) -> (f64, f64) {
    if communities.communities.is_empty() {
        return (0.0, 0.0);
    }
    let sum: f64 = communities
        .communities
        .iter()
        .map(|c| c.modularity_contribution)
        .sum();
    let mean = sum / communities.communities.len() as f64;
    let max = communities
        .communities
        .iter()
        .map(|c| c.modularity_contribution)
        .fold(f64::NEG_INFINITY, f64::max);
    (mean, max)
}

// ============================================================================
// Tests
// ============================================================================
