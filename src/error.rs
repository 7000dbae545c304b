//! Error taxonomy for the hypergraph analytics subsystem.
//!
//! Four failure kinds cover every fallible path: the fact store being
//! unreachable, the analytics dependency being compiled out, a lookup for an
//! entity the current snapshot does not contain, and an algorithm blowing its
//! time budget. Integration boundaries (reasoning boost, coherence score)
//! recover from `AnalyticsUnavailable`; nothing recovers from `DataSource`.

use std::time::Duration;
use thiserror::Error;

/// Result alias for hypergraph operations.
pub type HypergraphResult<T> = std::result::Result<T, HypergraphError>;

/// Errors produced by the adapter, engine, and API layers.
#[derive(Error, Debug)]
pub enum HypergraphError {
    /// The fact store could not be reached or a query failed.
    /// Never retried internally and never masked.
    #[error("fact store query failed: {0}")]
    DataSource(#[source] anyhow::Error),

    /// The graph analytics dependency is not compiled in.
    #[error("graph analytics dependency is not available")]
    AnalyticsUnavailable,

    /// The requested entity id is absent from the current snapshot
    /// (distinct from present-but-unreachable, which is a valid result).
    #[error("entity '{0}' not found in the current hypergraph snapshot")]
    EntityNotFound(String),

    /// An algorithm exceeded its configured time budget and no meaningful
    /// partial result exists.
    #[error("analytics operation exceeded its time budget of {0:?}")]
    TimeoutExceeded(Duration),
}

impl HypergraphError {
    /// Wrap a store-layer failure.
    pub fn data_source(err: impl Into<anyhow::Error>) -> Self {
        Self::DataSource(err.into())
    }
}
