//! Analytics result models.
//!
//! Every type here is an immutable value produced fresh per call, with no
//! ownership tie to the snapshot it was computed from. They are always
//! compiled, even when the `analytics` feature (and with it the algorithms)
//! is off, so API payload shapes and integration seams stay stable.
//!
//! ## Output types
//! - [`CentralityResult`] — one ranked row of the s-line centrality
//! - [`CommunityInfo`] / [`CommunityResult`] — modularity-based partition
//! - [`ComponentInfo`] / [`ConnectivityResult`] — s-connected components
//! - [`DistanceResult`] — s-walk BFS distances from one entity
//! - [`TopologicalSummary`] — global shape of the hypergraph
//! - [`HypergraphDiff`] — edge/node deltas between two snapshots
//!
//! ## Configuration
//! - [`AnalyticsConfig`] — time budget and community-detection tuning

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Centrality
// ============================================================================

/// One row of the entity centrality ranking.
///
/// `score` is betweenness centrality on the s-line graph, projected onto the
/// entity as the mean over the hyperedges it participates in. `degree` is the
/// plain hyperedge degree (how many edges contain the entity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentralityResult {
    pub entity_id: String,
    pub name: String,
    pub score: f64,
    pub degree: usize,
}

// ============================================================================
// Communities
// ============================================================================

/// Metadata about one detected community.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityInfo {
    pub id: u32,
    pub size: usize,
    /// Member entity ids, ascending.
    pub members: Vec<String>,
    /// Up to two most frequent entity types among members, by descending
    /// frequency (ties broken by type name).
    pub dominant_types: Vec<String>,
    /// This community's share of the overall modularity.
    pub modularity_contribution: f64,
}

/// Full community-detection result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityResult {
    /// Communities sorted by size descending, ties by smallest member id.
    pub communities: Vec<CommunityInfo>,
    /// Overall modularity of the partition.
    pub modularity: f64,
    /// Set when the time budget expired before the local moves converged;
    /// the partition is then the best one found so far.
    pub incomplete: bool,
}

impl CommunityResult {
    /// Well-formed result for a snapshot with nothing to partition.
    pub fn empty() -> Self {
        Self {
            communities: vec![],
            modularity: 0.0,
            incomplete: false,
        }
    }
}

// ============================================================================
// Connectivity
// ============================================================================

/// One s-connected component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub id: u32,
    pub size: usize,
    /// Member entity ids, ascending.
    pub members: Vec<String>,
    /// Components with fewer than 3 members are islands.
    pub is_island: bool,
}

/// s-connected components for one value of s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityResult {
    pub s: usize,
    pub component_count: usize,
    pub island_count: usize,
    /// Components sorted by size descending, ties by smallest member id.
    pub components: Vec<ComponentInfo>,
}

// ============================================================================
// Distances
// ============================================================================

/// s-walk distance from the query entity to one snapshot entity.
///
/// `distance` is the number of hyperedges on the shortest s-walk; `None`
/// (serialized as `null`) means unreachable, mirrored by `reachable = false`.
/// The query entity itself reports distance 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceResult {
    pub entity_id: String,
    pub name: String,
    pub distance: Option<u32>,
    pub reachable: bool,
}

// ============================================================================
// Topology
// ============================================================================

/// Global structural summary of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologicalSummary {
    pub node_count: usize,
    pub edge_count: usize,
    /// Hypergraph density. Public contract:
    /// `2 * edge_count / (node_count * (node_count - 1))`, and `0.0` when
    /// `node_count < 2`. Values above 1.0 are possible on edge-rich graphs.
    pub density: f64,
    /// Mean participant count per hyperedge (0 when there are no edges).
    pub avg_edge_size: f64,
    /// Largest participant count over all hyperedges.
    pub max_edge_size: usize,
    /// Mean hyperedges per node (0 when there are no nodes).
    pub avg_node_degree: f64,
    /// Longest finite shortest s=1 path among connected pairs; 0 when the
    /// snapshot holds fewer than 2 nodes.
    pub diameter: usize,
    /// Set when the time budget expired mid-scan; `diameter` is then a lower
    /// bound computed from the sources visited so far.
    pub incomplete: bool,
}

impl TopologicalSummary {
    /// Well-formed zero summary for an empty snapshot.
    pub fn empty() -> Self {
        Self {
            node_count: 0,
            edge_count: 0,
            density: 0.0,
            avg_edge_size: 0.0,
            max_edge_size: 0,
            avg_node_degree: 0.0,
            diameter: 0,
            incomplete: false,
        }
    }
}

// ============================================================================
// Diff
// ============================================================================

/// Structural delta between two snapshots, by id-set difference.
///
/// An edge counts as modified when it exists in both snapshots but its
/// aggregate confidence or participant set differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypergraphDiff {
    pub added_edges: Vec<String>,
    pub removed_edges: Vec<String>,
    pub modified_edges: Vec<String>,
    pub added_nodes: Vec<String>,
    pub removed_nodes: Vec<String>,
    pub before_created_at: DateTime<Utc>,
    pub after_created_at: DateTime<Utc>,
}

impl HypergraphDiff {
    /// True when no axis changed.
    pub fn is_empty(&self) -> bool {
        self.added_edges.is_empty()
            && self.removed_edges.is_empty()
            && self.modified_edges.is_empty()
            && self.added_nodes.is_empty()
            && self.removed_nodes.is_empty()
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Tuning parameters for the analytics algorithms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Per-call time budget in milliseconds. Superlinear algorithms check it
    /// cooperatively and either flag a partial result or fail with a timeout.
    pub op_timeout_ms: u64,
    /// Louvain resolution parameter (higher = smaller communities).
    pub louvain_resolution: f64,
    /// Louvain maximum local-move sweeps.
    pub louvain_max_iterations: usize,
}

impl AnalyticsConfig {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            op_timeout_ms: 10_000,
            louvain_resolution: 1.0,
            louvain_max_iterations: 100,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
