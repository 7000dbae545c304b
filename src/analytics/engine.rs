//! Analytics engine facade.
//!
//! [`AnalyticsEngine`] is the only entry point the rest of the crate uses for
//! graph computation. It owns the time-budget policy: every operation runs on
//! the blocking thread pool via `spawn_blocking` so the async runtime is never
//! stalled, wrapped in a `tokio::time::timeout` backstop slightly above the
//! cooperative budget the algorithms check themselves.
//!
//! The engine only exists when the crate is compiled with the `analytics`
//! feature (on by default). Without it, [`AnalyticsEngine::try_new`] returns
//! `None` and the graph dependencies are not linked; callers holding no engine
//! report the analytics-unavailable error instead.

use std::sync::Arc;

use crate::analytics::models::{
    AnalyticsConfig, CentralityResult, CommunityResult, ConnectivityResult, DistanceResult,
    HypergraphDiff, TopologicalSummary,
};
use crate::error::HypergraphResult;
use crate::hypergraph::snapshot::HypergraphSnapshot;

#[cfg(feature = "analytics")]
use crate::analytics::algorithms::{self, Deadline};
#[cfg(feature = "analytics")]
use crate::error::HypergraphError;
#[cfg(feature = "analytics")]
use std::time::Duration;

/// Extra wall-clock allowance on top of the cooperative budget before the
/// outer timeout cancels a blocked computation.
#[cfg(feature = "analytics")]
const TIMEOUT_GRACE: Duration = Duration::from_millis(250);

#[cfg(feature = "analytics")]
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
}

#[cfg(feature = "analytics")]
impl AnalyticsEngine {
    /// Construct the engine. Always succeeds when the `analytics` feature is
    /// compiled in; the `Option` is the capability signal shared with the
    /// feature-less build.
    pub fn try_new(config: AnalyticsConfig) -> Option<Arc<Self>> {
        Some(Arc::new(Self { config }))
    }

    pub async fn entity_centrality(
        &self,
        snapshot: Arc<HypergraphSnapshot>,
        s: usize,
    ) -> HypergraphResult<Vec<CentralityResult>> {
        self.run_blocking(move || Ok(algorithms::entity_centrality(&snapshot, s)))
            .await
    }

    pub async fn detect_communities(
        &self,
        snapshot: Arc<HypergraphSnapshot>,
    ) -> HypergraphResult<CommunityResult> {
        let config = self.config.clone();
        self.run_blocking(move || {
            let deadline = Deadline::after(config.op_timeout());
            Ok(algorithms::detect_communities(&snapshot, &config, deadline))
        })
        .await
    }

    pub async fn analyze_connectivity(
        &self,
        snapshot: Arc<HypergraphSnapshot>,
        s_values: Vec<usize>,
    ) -> HypergraphResult<Vec<ConnectivityResult>> {
        self.run_blocking(move || Ok(algorithms::analyze_connectivity(&snapshot, &s_values)))
            .await
    }

    pub async fn entity_distances(
        &self,
        snapshot: Arc<HypergraphSnapshot>,
        entity_id: String,
        s: usize,
    ) -> HypergraphResult<Vec<DistanceResult>> {
        let budget = self.config.op_timeout();
        self.run_blocking(move || {
            algorithms::entity_distances(&snapshot, &entity_id, s, Deadline::after(budget))
        })
        .await
    }

    pub async fn topological_summary(
        &self,
        snapshot: Arc<HypergraphSnapshot>,
    ) -> HypergraphResult<TopologicalSummary> {
        let budget = self.config.op_timeout();
        self.run_blocking(move || {
            Ok(algorithms::topological_summary(
                &snapshot,
                Deadline::after(budget),
            ))
        })
        .await
    }

    pub async fn diff(
        &self,
        before: Arc<HypergraphSnapshot>,
        after: Arc<HypergraphSnapshot>,
    ) -> HypergraphResult<HypergraphDiff> {
        self.run_blocking(move || Ok(algorithms::diff(&before, &after)))
            .await
    }

    /// Run a computation on the blocking pool under the outer timeout. The
    /// budget passed to [`Deadline`] inside `f` governs cooperative checks;
    /// this backstop only fires if a computation misses them entirely.
    async fn run_blocking<T, F>(&self, f: F) -> HypergraphResult<T>
    where
        F: FnOnce() -> HypergraphResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let budget = self.config.op_timeout();
        match tokio::time::timeout(budget + TIMEOUT_GRACE, tokio::task::spawn_blocking(f)).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                if join_err.is_panic() {
                    std::panic::resume_unwind(join_err.into_panic());
                }
                Err(HypergraphError::TimeoutExceeded(budget))
            }
            Err(_elapsed) => {
                tracing::warn!(
                    budget_ms = budget.as_millis() as u64,
                    "analytics operation cancelled by the outer timeout"
                );
                Err(HypergraphError::TimeoutExceeded(budget))
            }
        }
    }
}

// ============================================================================
// Feature-less stub
// ============================================================================

/// Stand-in compiled when the `analytics` feature is off. Never instantiated:
/// `try_new` returns `None`, so these methods exist only to keep call sites
/// compiling.
#[cfg(not(feature = "analytics"))]
pub struct AnalyticsEngine;

#[cfg(not(feature = "analytics"))]
impl AnalyticsEngine {
    pub fn try_new(_config: AnalyticsConfig) -> Option<Arc<Self>> {
        None
    }

    pub async fn entity_centrality(
        &self,
        _snapshot: Arc<HypergraphSnapshot>,
        _s: usize,
    ) -> HypergraphResult<Vec<CentralityResult>> {
        Err(crate::error::HypergraphError::AnalyticsUnavailable)
    }

    pub async fn detect_communities(
        &self,
        _snapshot: Arc<HypergraphSnapshot>,
    ) -> HypergraphResult<CommunityResult> {
        Err(crate::error::HypergraphError::AnalyticsUnavailable)
    }

    pub async fn analyze_connectivity(
        &self,
        _snapshot: Arc<HypergraphSnapshot>,
        _s_values: Vec<usize>,
    ) -> HypergraphResult<Vec<ConnectivityResult>> {
        Err(crate::error::HypergraphError::AnalyticsUnavailable)
    }

    pub async fn entity_distances(
        &self,
        _snapshot: Arc<HypergraphSnapshot>,
        _entity_id: String,
        _s: usize,
    ) -> HypergraphResult<Vec<DistanceResult>> {
        Err(crate::error::HypergraphError::AnalyticsUnavailable)
    }

    pub async fn topological_summary(
        &self,
        _snapshot: Arc<HypergraphSnapshot>,
    ) -> HypergraphResult<TopologicalSummary> {
        Err(crate::error::HypergraphError::AnalyticsUnavailable)
    }

    pub async fn diff(
        &self,
        _before: Arc<HypergraphSnapshot>,
        _after: Arc<HypergraphSnapshot>,
    ) -> HypergraphResult<HypergraphDiff> {
        Err(crate::error::HypergraphError::AnalyticsUnavailable)
    }
}
