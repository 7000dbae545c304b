//! Hypergraph adapter: gateway reads behind a TTL snapshot cache.
//!
//! Reconciling the persistent binary-relation store with the in-memory
//! hyperedge overlay is treated strictly as a caching problem: every filter
//! combination maps to one immutable snapshot, valid until its TTL elapses or
//! an explicit invalidation lands, whichever comes first.
//!
//! The cache is a `moka::future::Cache`, which gives the two properties the
//! overlay needs without hand-rolled locking:
//!
//! - `try_get_with` coalesces concurrent misses for the same filter key into
//!   a single in-flight store query (single-flight); different keys load in
//!   parallel.
//! - entries expire `time_to_live` after insertion, and `invalidate_all`
//!   discards everything unconditionally.
//!
//! Load failures are never cached; the next call retries the store.

use crate::error::{HypergraphError, HypergraphResult};
use crate::hypergraph::snapshot::HypergraphSnapshot;
use crate::store::models::{DikwLayer, FactFilters};
use crate::store::traits::FactStore;
use moka::future::Cache;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Default snapshot validity window.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Upper bound on distinct filter combinations kept warm at once.
const MAX_CACHED_SNAPSHOTS: u64 = 64;

// ============================================================================
// Filter key
// ============================================================================

/// Hashable identity of a filter combination.
///
/// Two keys are equal iff every filter parameter value matches; the float
/// threshold is compared bitwise via `to_bits`. Semantically-equal but
/// textually-different filter sets (omitted vs. explicit default) are allowed
/// to occupy separate entries — normalization is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterKey {
    min_confidence_bits: Option<u64>,
    layer: Option<DikwLayer>,
    document_id: Option<String>,
    fact_type: Option<String>,
}

impl From<&FactFilters> for FilterKey {
    fn from(filters: &FactFilters) -> Self {
        Self {
            min_confidence_bits: filters.min_confidence.map(f64::to_bits),
            layer: filters.layer,
            document_id: filters.document_id.clone(),
            fact_type: filters.fact_type.clone(),
        }
    }
}

// ============================================================================
// Adapter
// ============================================================================

/// Loads, filters, and TTL-caches immutable hypergraph snapshots.
pub struct HypergraphAdapter {
    store: Arc<dyn FactStore>,
    cache: Cache<FilterKey, Arc<HypergraphSnapshot>>,
    analytics_available: bool,
}

impl HypergraphAdapter {
    pub fn new(store: Arc<dyn FactStore>, ttl: Duration, analytics_available: bool) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(MAX_CACHED_SNAPSHOTS)
            .build();

        Self {
            store,
            cache,
            analytics_available,
        }
    }

    /// Return the snapshot for the given filters, loading it from the store
    /// on a cache miss. Concurrent misses for the same key share one load.
    pub async fn load(&self, filters: &FactFilters) -> HypergraphResult<Arc<HypergraphSnapshot>> {
        let key = FilterKey::from(filters);
        let store = self.store.clone();
        let filters = filters.clone();

        self.cache
            .try_get_with(key, async move {
                Self::fetch(store, filters).await.map(Arc::new)
            })
            .await
            .map_err(unshare_error)
    }

    /// Bypass the cache: load a fresh snapshot, store it under its key, and
    /// return it. Used where staleness is the point of the question (diff).
    pub async fn refresh(&self, filters: &FactFilters) -> HypergraphResult<Arc<HypergraphSnapshot>> {
        let key = FilterKey::from(filters);
        let snapshot = Arc::new(Self::fetch(self.store.clone(), filters.clone()).await?);
        self.cache.insert(key, snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Discard every cached snapshot unconditionally. Idempotent.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
        tracing::debug!("Hypergraph snapshot cache invalidated");
    }

    /// Approximate number of snapshots currently cached.
    pub fn cached_snapshot_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Whether the graph analytics dependency was compiled in. Callers must
    /// check this before invoking analytics, unless they are a surface meant
    /// to translate the absence into an unavailable status.
    pub fn is_available(&self) -> bool {
        self.analytics_available
    }

    /// One gateway round trip: matching facts, then their participants.
    async fn fetch(
        store: Arc<dyn FactStore>,
        filters: FactFilters,
    ) -> HypergraphResult<HypergraphSnapshot> {
        let facts = store
            .list_facts(&filters)
            .await
            .map_err(HypergraphError::DataSource)?;

        let ids: BTreeSet<String> = facts
            .iter()
            .flat_map(|f| f.participants.iter().cloned())
            .collect();
        let ids: Vec<String> = ids.into_iter().collect();

        let entities = store
            .get_entities(&ids)
            .await
            .map_err(HypergraphError::DataSource)?;

        let snapshot = HypergraphSnapshot::build(facts, entities, filters);
        tracing::debug!(
            edges = snapshot.edge_count(),
            nodes = snapshot.node_count(),
            "Built hypergraph snapshot"
        );
        Ok(snapshot)
    }
}

/// `try_get_with` hands every waiter the same `Arc`-wrapped error; rebuild an
/// owned one so callers keep working with plain `HypergraphError`.
fn unshare_error(err: Arc<HypergraphError>) -> HypergraphError {
    match err.as_ref() {
        HypergraphError::DataSource(source) => {
            HypergraphError::DataSource(anyhow::anyhow!("{source:#}"))
        }
        HypergraphError::AnalyticsUnavailable => HypergraphError::AnalyticsUnavailable,
        HypergraphError::EntityNotFound(id) => HypergraphError::EntityNotFound(id.clone()),
        HypergraphError::TimeoutExceeded(budget) => HypergraphError::TimeoutExceeded(*budget),
    }
}

// ============================================================================
// Tests
// ============================================================================
