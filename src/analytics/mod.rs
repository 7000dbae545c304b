//! Graph analytics over hypergraph snapshots.
//!
//! Split into:
//! - `models` — result and config types (always compiled, so API responses
//!   serialize identically with or without the `analytics` feature)
//! - `line_graph` — derived s-line and co-membership graphs
//! - `algorithms` — the pure, deterministic analytical operations
//! - `engine` — async facade with time budgets and the capability stub

pub mod engine;
pub mod models;

#[cfg(feature = "analytics")]
pub mod algorithms;
#[cfg(feature = "analytics")]
pub mod line_graph;

pub use engine::AnalyticsEngine;
pub use models::{
    AnalyticsConfig, CentralityResult, CommunityInfo, CommunityResult, ComponentInfo,
    ConnectivityResult, DistanceResult, HypergraphDiff, TopologicalSummary,
};
