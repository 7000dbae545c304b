//! Hypergraph coherence metric.
//!
//! One normalized score summarizing how structured the current snapshot is:
//!
//! `0.4·modularity + 0.3·(entities in communities of size ≥ 3 / entities)
//! + 0.3·(1 − islands / components)`
//!
//! with islands taken from s=1 connectivity. The quality aggregator host
//! combines this with other metrics; when analytics is unavailable the scorer
//! reports [`CoherenceOutcome::Omitted`] so the aggregator can drop the metric
//! from its weighted average instead of averaging in a false zero.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analytics::models::{CommunityResult, ConnectivityResult};
use crate::analytics::AnalyticsEngine;
use crate::error::HypergraphResult;
use crate::hypergraph::snapshot::HypergraphSnapshot;

const MODULARITY_WEIGHT: f64 = 0.4;
const MEMBERSHIP_WEIGHT: f64 = 0.3;
const ISLAND_WEIGHT: f64 = 0.3;

/// Result handed to the quality aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "score", rename_all = "snake_case")]
pub enum CoherenceOutcome {
    /// Analytics ran; score is in `[0, 1]`.
    Scored(f64),
    /// Analytics unavailable; exclude this metric, do not treat as 0.
    Omitted,
}

/// Score one snapshot's coherence, or report the metric as omitted when no
/// engine is present. An empty snapshot scores 0.0 — analytics did run, the
/// graph just has no structure to measure.
pub async fn coherence(
    engine: Option<&Arc<AnalyticsEngine>>,
    snapshot: Arc<HypergraphSnapshot>,
) -> HypergraphResult<CoherenceOutcome> {
    let Some(engine) = engine else {
        return Ok(CoherenceOutcome::Omitted);
    };
    if snapshot.is_empty() {
        return Ok(CoherenceOutcome::Scored(0.0));
    }

    let communities = engine.detect_communities(snapshot.clone()).await?;
    let connectivity = engine.analyze_connectivity(snapshot.clone(), vec![1]).await?;

    let score = connectivity
        .first()
        .map(|conn| coherence_score(&communities, conn, snapshot.node_count()))
        .unwrap_or(0.0);
    Ok(CoherenceOutcome::Scored(score))
}

/// The weighted formula over precomputed analytics results.
pub fn coherence_score(
    communities: &CommunityResult,
    connectivity: &ConnectivityResult,
    total_entities: usize,
) -> f64 {
    if total_entities == 0 || connectivity.component_count == 0 {
        return 0.0;
    }

    let in_structured_communities: usize = communities
        .communities
        .iter()
        .filter(|c| c.size >= 3)
        .map(|c| c.size)
        .sum();
    let membership_ratio = in_structured_communities as f64 / total_entities as f64;

    let island_ratio = connectivity.island_count as f64 / connectivity.component_count as f64;

    (MODULARITY_WEIGHT * communities.modularity
        + MEMBERSHIP_WEIGHT * membership_ratio
        + ISLAND_WEIGHT * (1.0 - island_ratio))
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::models::CommunityInfo;

    fn communities_of(sizes_and_contributions: &[(usize, f64)]) -> CommunityResult {
        let communities: Vec<CommunityInfo> = sizes_and_contributions
            .iter()
            .enumerate()
            .map(|(i, &(size, contribution))| CommunityInfo {
                id: i as u32,
                size,
                members: (0..size).map(|m| format!("c{i}m{m}")).collect(),
                dominant_types: vec![],
                modularity_contribution: contribution,
            })
            .collect();
        let modularity = communities.iter().map(|c| c.modularity_contribution).sum();
        CommunityResult {
            communities,
            modularity,
            incomplete: false,
        }
    }

    fn connectivity_of(component_count: usize, island_count: usize) -> ConnectivityResult {
        ConnectivityResult {
            s: 1,
            component_count,
            island_count,
            components: vec![],
        }
    }

    #[test]
    fn test_formula_weights() {
        // modularity 0.5, everyone in size-≥3 communities, no islands
        let communities = communities_of(&[(4, 0.3), (3, 0.2)]);
        let connectivity = connectivity_of(2, 0);
        let score = coherence_score(&communities, &connectivity, 7);
        assert!((score - (0.4 * 0.5 + 0.3 + 0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_islands_reduce_score() {
        let communities = communities_of(&[(3, 0.0)]);
        let with_islands = coherence_score(&communities, &connectivity_of(2, 1), 5);
        let without = coherence_score(&communities, &connectivity_of(2, 0), 5);
        assert!(with_islands < without);
        assert!((without - with_islands - 0.3 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_small_communities_excluded_from_membership() {
        // 2 of 6 entities sit in a size-2 community
        let communities = communities_of(&[(4, 0.0), (2, 0.0)]);
        let connectivity = connectivity_of(1, 0);
        let score = coherence_score(&communities, &connectivity, 6);
        assert!((score - (0.3 * (4.0 / 6.0) + 0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_negative_modularity_clamped() {
        let communities = communities_of(&[(2, -0.6), (2, -0.6)]);
        let connectivity = connectivity_of(4, 4);
        let score = coherence_score(&communities, &connectivity, 4);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_zero_entities_scores_zero() {
        let communities = communities_of(&[]);
        let connectivity = connectivity_of(0, 0);
        assert_eq!(coherence_score(&communities, &connectivity, 0), 0.0);
    }

    #[test]
    fn test_outcome_serialization() {
        let scored = serde_json::to_value(CoherenceOutcome::Scored(0.6)).unwrap();
        assert_eq!(scored["status"], "scored");
        assert_eq!(scored["score"], 0.6);

        let omitted = serde_json::to_value(CoherenceOutcome::Omitted).unwrap();
        assert_eq!(omitted["status"], "omitted");
        assert!(omitted.get("score").is_none());
    }

    #[cfg(feature = "analytics")]
    mod with_engine {
        use super::*;
        use crate::analytics::models::AnalyticsConfig;
        use crate::test_helpers::{empty_snapshot, single_edge_snapshot};

        #[tokio::test]
        async fn test_single_edge_scores_point_six() {
            // one community of 3 with modularity 0, one non-island component:
            // 0.4·0 + 0.3·1 + 0.3·1
            let engine = AnalyticsEngine::try_new(AnalyticsConfig::default());
            let outcome = coherence(engine.as_ref(), Arc::new(single_edge_snapshot()))
                .await
                .unwrap();
            match outcome {
                CoherenceOutcome::Scored(score) => assert!((score - 0.6).abs() < 1e-9),
                CoherenceOutcome::Omitted => panic!("expected a score"),
            }
        }

        #[tokio::test]
        async fn test_empty_snapshot_scores_zero_not_omitted() {
            let engine = AnalyticsEngine::try_new(AnalyticsConfig::default());
            let outcome = coherence(engine.as_ref(), Arc::new(empty_snapshot()))
                .await
                .unwrap();
            assert_eq!(outcome, CoherenceOutcome::Scored(0.0));
        }

        #[tokio::test]
        async fn test_no_engine_omits_metric() {
            let outcome = coherence(None, Arc::new(single_edge_snapshot()))
                .await
                .unwrap();
            assert_eq!(outcome, CoherenceOutcome::Omitted);
        }
    }
}
