//! API request handlers

use crate::analytics::{
    AnalyticsEngine, CentralityResult, CommunityResult, ConnectivityResult, DistanceResult,
    HypergraphDiff, TopologicalSummary,
};
use crate::api::{LimitParam, MaxEdgesParam, SParam, SValuesParam, SnapshotFilterParams};
use crate::error::{HypergraphError, HypergraphResult};
use crate::events::EventBus;
use crate::hypergraph::{Hyperedge, HypergraphAdapter};
use crate::quality::{self, CoherenceOutcome};
use crate::store::{DikwLayer, EntityRecord, FactFilters, FactStore};
use crate::Config;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared server state
pub struct ServerState {
    pub store: Arc<dyn FactStore>,
    pub adapter: Arc<HypergraphAdapter>,
    /// None when the graph analytics dependency is compiled out
    pub analytics: Option<Arc<AnalyticsEngine>>,
    pub events: EventBus,
    pub config: Arc<Config>,
}

/// Shared hypergraph state
pub type HypergraphState = Arc<ServerState>;

impl ServerState {
    /// The analytics engine, or `AnalyticsUnavailable` when compiled out
    pub fn engine(&self) -> HypergraphResult<&Arc<AnalyticsEngine>> {
        self.analytics
            .as_ref()
            .ok_or(HypergraphError::AnalyticsUnavailable)
    }
}

// ============================================================================
// Health check
// ============================================================================

/// Per-service health status in the health response
#[derive(Serialize)]
pub struct ServiceHealthStatus {
    pub gateway: String,
    pub analytics: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cached_snapshots: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<ServiceHealthStatus>,
}

/// Health check handler — verifies actual connectivity to the fact store.
///
/// Returns:
/// - 200 + `"healthy"` if the gateway answers and analytics is compiled in
/// - 200 + `"degraded"` if the gateway answers but analytics is compiled out
/// - 503 + `"unhealthy"` if the gateway is unreachable (critical dependency)
pub async fn health(State(state): State<HypergraphState>) -> (StatusCode, Json<HealthResponse>) {
    let gateway_ok = state.store.health_check().await.is_ok();
    let analytics_ok = state.analytics.is_some();

    let status = if gateway_ok && analytics_ok {
        "healthy"
    } else if gateway_ok {
        "degraded"
    } else {
        "unhealthy"
    };

    let http_status = if gateway_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            cached_snapshots: state.adapter.cached_snapshot_count(),
            services: Some(ServiceHealthStatus {
                gateway: if gateway_ok {
                    "connected".to_string()
                } else {
                    "disconnected".to_string()
                },
                analytics: if analytics_ok {
                    "available".to_string()
                } else {
                    "unavailable".to_string()
                },
            }),
        }),
    )
}

// ============================================================================
// Centrality
// ============================================================================

/// Query parameters for the centrality ranking
#[derive(Debug, Deserialize, Default)]
pub struct CentralityQuery {
    #[serde(flatten)]
    pub filters: SnapshotFilterParams,
    #[serde(flatten)]
    pub s: SParam,
    #[serde(flatten)]
    pub limit: LimitParam,
}

/// Ranked centrality rows; `total` counts rows before the limit was applied
#[derive(Serialize)]
pub struct CentralityResponse {
    pub s: usize,
    pub total: usize,
    pub entities: Vec<CentralityResult>,
}

/// Rank entities by betweenness centrality on the s-line graph
pub async fn centrality(
    State(state): State<HypergraphState>,
    Query(query): Query<CentralityQuery>,
) -> Result<Json<CentralityResponse>, AppError> {
    query.s.validate().map_err(AppError::BadRequest)?;
    let filters = query.filters.to_filters().map_err(AppError::BadRequest)?;

    let engine = state.engine()?;
    let snapshot = state.adapter.load(&filters).await?;
    let mut entities = engine.entity_centrality(snapshot, query.s.s).await?;

    // The limit trims the response only after the full ranking, so row k
    // is identical whatever limit the client asked for
    let total = entities.len();
    entities.truncate(query.limit.validated_limit());

    Ok(Json(CentralityResponse {
        s: query.s.s,
        total,
        entities,
    }))
}

// ============================================================================
// Communities
// ============================================================================

/// Query parameters for community detection
#[derive(Debug, Deserialize, Default)]
pub struct CommunitiesQuery {
    #[serde(flatten)]
    pub filters: SnapshotFilterParams,
}

/// Detect entity communities on the co-membership graph
pub async fn communities(
    State(state): State<HypergraphState>,
    Query(query): Query<CommunitiesQuery>,
) -> Result<Json<CommunityResult>, AppError> {
    let filters = query.filters.to_filters().map_err(AppError::BadRequest)?;

    let engine = state.engine()?;
    let snapshot = state.adapter.load(&filters).await?;
    let result = engine.detect_communities(snapshot).await?;

    Ok(Json(result))
}

// ============================================================================
// Connectivity
// ============================================================================

/// Query parameters for the connectivity profile
#[derive(Debug, Deserialize, Default)]
pub struct ConnectivityQuery {
    #[serde(flatten)]
    pub filters: SnapshotFilterParams,
    #[serde(flatten)]
    pub s_values: SValuesParam,
}

/// Connected components per requested overlap threshold
#[derive(Serialize)]
pub struct ConnectivityResponse {
    pub s_values: Vec<usize>,
    pub results: Vec<ConnectivityResult>,
}

/// Compute s-connected components for each requested threshold
pub async fn connectivity(
    State(state): State<HypergraphState>,
    Query(query): Query<ConnectivityQuery>,
) -> Result<Json<ConnectivityResponse>, AppError> {
    let s_values = query.s_values.to_vec().map_err(AppError::BadRequest)?;
    let filters = query.filters.to_filters().map_err(AppError::BadRequest)?;

    let engine = state.engine()?;
    let snapshot = state.adapter.load(&filters).await?;
    let results = engine
        .analyze_connectivity(snapshot, s_values.clone())
        .await?;

    Ok(Json(ConnectivityResponse { s_values, results }))
}

// ============================================================================
// Distances
// ============================================================================

/// Query parameters for the distance scan
#[derive(Debug, Deserialize, Default)]
pub struct DistancesQuery {
    #[serde(flatten)]
    pub filters: SnapshotFilterParams,
    #[serde(flatten)]
    pub s: SParam,
}

/// s-walk distances from one source entity to every snapshot entity
#[derive(Serialize)]
pub struct DistancesResponse {
    pub entity_id: String,
    pub s: usize,
    pub reachable_count: usize,
    pub distances: Vec<DistanceResult>,
}

/// BFS s-walk distances from the given entity
pub async fn distances(
    State(state): State<HypergraphState>,
    Path(entity_id): Path<String>,
    Query(query): Query<DistancesQuery>,
) -> Result<Json<DistancesResponse>, AppError> {
    query.s.validate().map_err(AppError::BadRequest)?;
    let filters = query.filters.to_filters().map_err(AppError::BadRequest)?;

    let engine = state.engine()?;
    let snapshot = state.adapter.load(&filters).await?;
    let distances = engine
        .entity_distances(snapshot, entity_id.clone(), query.s.s)
        .await?;

    let reachable_count = distances.iter().filter(|d| d.reachable).count();

    Ok(Json(DistancesResponse {
        entity_id,
        s: query.s.s,
        reachable_count,
        distances,
    }))
}

// ============================================================================
// Topology
// ============================================================================

/// Query parameters for the topology summary
#[derive(Debug, Deserialize, Default)]
pub struct TopologyQuery {
    #[serde(flatten)]
    pub filters: SnapshotFilterParams,
}

/// Global structural summary of the filtered snapshot
pub async fn topology(
    State(state): State<HypergraphState>,
    Query(query): Query<TopologyQuery>,
) -> Result<Json<TopologicalSummary>, AppError> {
    let filters = query.filters.to_filters().map_err(AppError::BadRequest)?;

    let engine = state.engine()?;
    let snapshot = state.adapter.load(&filters).await?;
    let summary = engine.topological_summary(snapshot).await?;

    Ok(Json(summary))
}

// ============================================================================
// Diff
// ============================================================================

/// Query parameters for the snapshot diff
#[derive(Debug, Deserialize, Default)]
pub struct DiffQuery {
    #[serde(flatten)]
    pub filters: SnapshotFilterParams,
}

/// Structural delta between the cached snapshot and a forced re-read.
///
/// `load` serves whatever the cache holds (building one if empty), `refresh`
/// always re-reads the store, so the diff shows what changed underneath the
/// cache since it was populated.
pub async fn diff(
    State(state): State<HypergraphState>,
    Query(query): Query<DiffQuery>,
) -> Result<Json<HypergraphDiff>, AppError> {
    let filters = query.filters.to_filters().map_err(AppError::BadRequest)?;

    let engine = state.engine()?;
    let before = state.adapter.load(&filters).await?;
    let after = state.adapter.refresh(&filters).await?;
    let delta = engine.diff(before, after).await?;

    Ok(Json(delta))
}

// ============================================================================
// Visualization
// ============================================================================

/// Query parameters for the visualization payload
#[derive(Debug, Deserialize, Default)]
pub struct VisualizationQuery {
    #[serde(flatten)]
    pub filters: SnapshotFilterParams,
    #[serde(flatten)]
    pub max_edges: MaxEdgesParam,
}

/// One renderable node; `degree` counts kept hyperedges only
#[derive(Serialize)]
pub struct VisualizationNode {
    pub id: String,
    pub name: String,
    pub entity_type: String,
    pub layer: DikwLayer,
    pub degree: usize,
}

/// One binary co-membership link; `weight` counts shared kept hyperedges
#[derive(Serialize)]
pub struct VisualizationLink {
    pub source: String,
    pub target: String,
    pub weight: usize,
}

/// Bounded nodes-and-links payload
#[derive(Serialize)]
pub struct VisualizationResponse {
    pub nodes: Vec<VisualizationNode>,
    pub links: Vec<VisualizationLink>,
    pub edge_count: usize,
    pub total_edges: usize,
    pub truncated: bool,
}

/// Project the snapshot into a bounded nodes-and-links payload.
///
/// When the snapshot holds more hyperedges than `max_edges`, the highest-
/// confidence ones are kept (ties by edge id), so truncation is deterministic.
pub async fn visualization(
    State(state): State<HypergraphState>,
    Query(query): Query<VisualizationQuery>,
) -> Result<Json<VisualizationResponse>, AppError> {
    let filters = query.filters.to_filters().map_err(AppError::BadRequest)?;

    let snapshot = state.adapter.load(&filters).await?;
    let max_edges = query.max_edges.effective(state.config.max_edges);

    let mut edges: Vec<&Hyperedge> = snapshot.edges.values().collect();
    edges.sort_by(|a, b| {
        b.aggregate_confidence
            .total_cmp(&a.aggregate_confidence)
            .then_with(|| a.id.cmp(&b.id))
    });
    let truncated = edges.len() > max_edges;
    edges.truncate(max_edges);

    let mut degree: BTreeMap<&str, usize> = BTreeMap::new();
    let mut weights: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for edge in &edges {
        let members: Vec<&str> = edge.participants.iter().map(String::as_str).collect();
        for member in &members {
            *degree.entry(member).or_insert(0) += 1;
        }
        // participants are sorted, so (a, b) pairs are already ordered
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                *weights.entry((a, b)).or_insert(0) += 1;
            }
        }
    }

    let nodes = degree
        .iter()
        .filter_map(|(&id, &deg)| {
            snapshot.nodes.get(id).map(|record| VisualizationNode {
                id: record.id.clone(),
                name: record.name.clone(),
                entity_type: record.entity_type.clone(),
                layer: record.layer,
                degree: deg,
            })
        })
        .collect();

    let links = weights
        .into_iter()
        .map(|((source, target), weight)| VisualizationLink {
            source: source.to_string(),
            target: target.to_string(),
            weight,
        })
        .collect();

    Ok(Json(VisualizationResponse {
        nodes,
        links,
        edge_count: edges.len(),
        total_edges: snapshot.edge_count(),
        truncated,
    }))
}

// ============================================================================
// Export
// ============================================================================

/// Query parameters for the structural export
#[derive(Debug, Deserialize, Default)]
pub struct ExportQuery {
    #[serde(flatten)]
    pub filters: SnapshotFilterParams,
}

/// Full filtered snapshot for downstream tooling
#[derive(Serialize)]
pub struct ExportResponse {
    pub filters: FactFilters,
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes: Vec<EntityRecord>,
    pub edges: Vec<Hyperedge>,
    pub snapshot_created_at: DateTime<Utc>,
    pub exported_at: DateTime<Utc>,
}

/// Export the filtered snapshot with full edge and node properties
pub async fn export(
    State(state): State<HypergraphState>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<ExportResponse>, AppError> {
    let filters = query.filters.to_filters().map_err(AppError::BadRequest)?;

    let snapshot = state.adapter.load(&filters).await?;

    Ok(Json(ExportResponse {
        filters: snapshot.filters.clone(),
        node_count: snapshot.node_count(),
        edge_count: snapshot.edge_count(),
        nodes: snapshot.nodes.values().cloned().collect(),
        edges: snapshot.edges.values().cloned().collect(),
        snapshot_created_at: snapshot.created_at,
        exported_at: Utc::now(),
    }))
}

// ============================================================================
// Coherence
// ============================================================================

/// Query parameters for the coherence score
#[derive(Debug, Deserialize, Default)]
pub struct CoherenceQuery {
    #[serde(flatten)]
    pub filters: SnapshotFilterParams,
}

/// Structural coherence of the filtered snapshot.
///
/// Unlike the other analytics endpoints this one answers 200 with an
/// explicit `omitted` marker when analytics is compiled out, because the
/// quality aggregator treats a missing score as "skip the signal".
pub async fn coherence(
    State(state): State<HypergraphState>,
    Query(query): Query<CoherenceQuery>,
) -> Result<Json<CoherenceOutcome>, AppError> {
    let filters = query.filters.to_filters().map_err(AppError::BadRequest)?;

    let snapshot = state.adapter.load(&filters).await?;
    let outcome = quality::coherence(state.analytics.as_ref(), snapshot).await?;

    Ok(Json(outcome))
}

// ============================================================================
// Error handling
// ============================================================================

/// Application error type
#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    NotFound(String),
    BadRequest(String),
    BadGateway(String),
    ServiceUnavailable(String),
    GatewayTimeout(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<HypergraphError> for AppError {
    fn from(err: HypergraphError) -> Self {
        match &err {
            HypergraphError::DataSource(_) => AppError::BadGateway(err.to_string()),
            HypergraphError::AnalyticsUnavailable => AppError::ServiceUnavailable(err.to_string()),
            HypergraphError::EntityNotFound(_) => AppError::NotFound(err.to_string()),
            HypergraphError::TimeoutExceeded(_) => AppError::GatewayTimeout(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::AnalyticsConfig;
    use crate::store::mock::MockFactStore;
    use std::time::Duration;

    async fn seeded_store() -> Arc<MockFactStore> {
        Arc::new(
            MockFactStore::new()
                .with_simple_fact("f1", &["a", "b", "c"], 0.9)
                .await
                .with_simple_fact("f2", &["b", "c", "d"], 0.8)
                .await
                .with_simple_fact("f3", &["d", "e"], 0.7)
                .await,
        )
    }

    fn state_over(store: Arc<MockFactStore>) -> HypergraphState {
        let adapter = Arc::new(HypergraphAdapter::new(
            store.clone(),
            Duration::from_secs(300),
            cfg!(feature = "analytics"),
        ));
        Arc::new(ServerState {
            store,
            adapter,
            analytics: AnalyticsEngine::try_new(AnalyticsConfig::default()),
            events: EventBus::default(),
            config: Arc::new(Config::default()),
        })
    }

    fn state_without_engine(store: Arc<MockFactStore>) -> HypergraphState {
        let adapter = Arc::new(HypergraphAdapter::new(
            store.clone(),
            Duration::from_secs(300),
            false,
        ));
        Arc::new(ServerState {
            store,
            adapter,
            analytics: None,
            events: EventBus::default(),
            config: Arc::new(Config::default()),
        })
    }

    // =========================================================================
    // Error mapping
    // =========================================================================

    #[test]
    fn test_app_error_status_codes() {
        let cases = [
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::NotFound("missing".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::BadRequest("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::BadGateway("store down".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::ServiceUnavailable("no analytics".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::GatewayTimeout("too slow".into()),
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_hypergraph_error_conversion() {
        let err: AppError = HypergraphError::data_source(anyhow::anyhow!("refused")).into();
        assert!(matches!(err, AppError::BadGateway(_)));

        let err: AppError = HypergraphError::AnalyticsUnavailable.into();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));

        let err: AppError = HypergraphError::EntityNotFound("e1".into()).into();
        assert!(matches!(err, AppError::NotFound(msg) if msg.contains("e1")));

        let err: AppError = HypergraphError::TimeoutExceeded(Duration::from_secs(1)).into();
        assert!(matches!(err, AppError::GatewayTimeout(_)));
    }

    // =========================================================================
    // Query deserialization
    // =========================================================================

    #[test]
    fn test_centrality_query_defaults() {
        let query: CentralityQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.s.s, 1);
        assert_eq!(query.limit.validated_limit(), 50);
        assert!(query.filters.to_filters().unwrap().is_empty());
    }

    #[test]
    fn test_centrality_query_parses_string_values() {
        let query: CentralityQuery =
            serde_json::from_str(r#"{"s": "2", "limit": "3", "min_confidence": "0.5"}"#).unwrap();
        assert_eq!(query.s.s, 2);
        assert_eq!(query.limit.validated_limit(), 3);
        assert_eq!(
            query.filters.to_filters().unwrap().min_confidence,
            Some(0.5)
        );
    }

    #[test]
    fn test_connectivity_query_flattens_s_values() {
        let query: ConnectivityQuery =
            serde_json::from_str(r#"{"s_values": "2,1", "layer": "semantic"}"#).unwrap();
        assert_eq!(query.s_values.to_vec().unwrap(), vec![1, 2]);
        assert_eq!(
            query.filters.to_filters().unwrap().layer,
            Some(DikwLayer::Semantic)
        );
    }

    // =========================================================================
    // Handlers over a mock store
    // =========================================================================

    #[tokio::test]
    async fn test_health_unhealthy_when_gateway_down() {
        let store = seeded_store().await;
        store.set_fail(true);
        let state = state_over(store);

        let (status, Json(body)) = health(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "unhealthy");
    }

    #[cfg(feature = "analytics")]
    #[tokio::test]
    async fn test_health_healthy_with_analytics() {
        let state = state_over(seeded_store().await);

        let (status, Json(body)) = health(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "healthy");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_centrality_unavailable_without_engine() {
        let state = state_without_engine(seeded_store().await);

        let result = centrality(State(state), Query(CentralityQuery::default())).await;
        let err = result.err().unwrap();
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[cfg(feature = "analytics")]
    #[tokio::test]
    async fn test_centrality_applies_limit_after_ranking() {
        let state = state_over(seeded_store().await);

        let query = CentralityQuery {
            limit: LimitParam { limit: 2 },
            ..Default::default()
        };
        let Json(body) = centrality(State(state), Query(query)).await.unwrap();

        assert_eq!(body.total, 5);
        assert_eq!(body.entities.len(), 2);
        // chain midpoints outrank the chain ends whatever the limit is
        let ids: Vec<&str> = body.entities.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[cfg(feature = "analytics")]
    #[tokio::test]
    async fn test_distances_unknown_entity_maps_to_404() {
        let state = state_over(seeded_store().await);

        let result = distances(
            State(state),
            Path("ghost".to_string()),
            Query(DistancesQuery::default()),
        )
        .await;
        let err = result.err().unwrap();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[cfg(feature = "analytics")]
    #[tokio::test]
    async fn test_diff_of_unchanged_store_is_empty() {
        let state = state_over(seeded_store().await);

        let Json(delta) = diff(State(state), Query(DiffQuery::default()))
            .await
            .unwrap();
        assert!(delta.is_empty());
    }

    #[tokio::test]
    async fn test_visualization_truncates_deterministically() {
        let state = state_over(seeded_store().await);

        let query = VisualizationQuery {
            max_edges: MaxEdgesParam { max_edges: Some(2) },
            ..Default::default()
        };
        let Json(body) = visualization(State(state), Query(query)).await.unwrap();

        // f1 (0.9) and f2 (0.8) survive, f3 (0.7) is cut
        assert!(body.truncated);
        assert_eq!(body.edge_count, 2);
        assert_eq!(body.total_edges, 3);

        let node_ids: Vec<&str> = body.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(node_ids, vec!["a", "b", "c", "d"]);

        // b and c co-occur in both kept edges
        let bc = body
            .links
            .iter()
            .find(|l| l.source == "b" && l.target == "c")
            .unwrap();
        assert_eq!(bc.weight, 2);
        assert_eq!(body.links.len(), 5);
    }

    #[tokio::test]
    async fn test_export_mirrors_snapshot() {
        let state = state_over(seeded_store().await);

        let query = ExportQuery {
            filters: SnapshotFilterParams {
                min_confidence: Some(0.75),
                ..Default::default()
            },
        };
        let Json(body) = export(State(state), Query(query)).await.unwrap();

        assert_eq!(body.filters.min_confidence, Some(0.75));
        assert_eq!(body.edge_count, 2);
        assert_eq!(body.edges.len(), 2);
        assert_eq!(body.node_count, body.nodes.len());
        assert!(body.exported_at >= body.snapshot_created_at);
    }

    #[tokio::test]
    async fn test_coherence_omitted_without_engine() {
        let state = state_without_engine(seeded_store().await);

        let Json(outcome) = coherence(State(state), Query(CoherenceQuery::default()))
            .await
            .unwrap();
        assert_eq!(outcome, CoherenceOutcome::Omitted);
    }

    #[cfg(feature = "analytics")]
    #[tokio::test]
    async fn test_coherence_scored_with_engine() {
        let state = state_over(seeded_store().await);

        let Json(outcome) = coherence(State(state), Query(CoherenceQuery::default()))
            .await
            .unwrap();
        match outcome {
            CoherenceOutcome::Scored(score) => assert!((0.0..=1.0).contains(&score)),
            CoherenceOutcome::Omitted => panic!("engine present, score expected"),
        }
    }
}
