//! API route definitions

use super::handlers::{self, HypergraphState};
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: HypergraphState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // ====================================================================
        // Hypergraph analytics (read-only)
        // ====================================================================
        .route("/api/hypergraph/centrality", get(handlers::centrality))
        .route("/api/hypergraph/communities", get(handlers::communities))
        .route("/api/hypergraph/connectivity", get(handlers::connectivity))
        .route(
            "/api/hypergraph/distances/{entity_id}",
            get(handlers::distances),
        )
        .route("/api/hypergraph/topology", get(handlers::topology))
        .route("/api/hypergraph/diff", get(handlers::diff))
        .route(
            "/api/hypergraph/visualization",
            get(handlers::visualization),
        )
        .route("/api/hypergraph/export", get(handlers::export))
        .route("/api/hypergraph/coherence", get(handlers::coherence))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
