//! Hypergraph Analytics
//!
//! A read-only analytics service over an N-ary fact store:
//! - Neo4j fact gateway (facts as reified hyperedges over entities)
//! - Cached immutable hypergraph snapshots with TTL + explicit invalidation
//! - s-line centrality, community detection, connectivity, distances, topology
//! - Structural confidence boosts and a coherence score for downstream systems
//! - axum HTTP API mirroring each analytics operation

pub mod analytics;
pub mod api;
pub mod error;
pub mod events;
pub mod hypergraph;
pub mod quality;
pub mod reasoning;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

use crate::analytics::{AnalyticsConfig, AnalyticsEngine};
use crate::api::handlers::ServerState;
use crate::events::EventBus;
use crate::hypergraph::HypergraphAdapter;
use crate::store::{FactStore, Neo4jFactStore};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub neo4j: Neo4jYamlConfig,
    pub hypergraph: HypergraphYamlConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub port: u16,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "hypergraph123".into(),
        }
    }
}

/// Hypergraph analytics configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HypergraphYamlConfig {
    pub cache_ttl_secs: u64,
    pub op_timeout_ms: u64,
    pub max_edges: usize,
}

impl Default for HypergraphYamlConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            op_timeout_ms: 10_000,
            max_edges: 500,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub server_port: u16,
    pub cache_ttl_secs: u64,
    pub op_timeout_ms: u64,
    /// Default visualization payload bound, overridable per request
    pub max_edges: usize,
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.server.port),
            cache_ttl_secs: std::env::var("HYPERGRAPH_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.hypergraph.cache_ttl_secs),
            op_timeout_ms: std::env::var("HYPERGRAPH_OP_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.hypergraph.op_timeout_ms),
            max_edges: std::env::var("HYPERGRAPH_MAX_EDGES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.hypergraph.max_edges),
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Analytics tuning derived from this config (Louvain knobs stay at their
    /// library defaults).
    pub fn analytics_config(&self) -> AnalyticsConfig {
        AnalyticsConfig {
            op_timeout_ms: self.op_timeout_ms,
            ..AnalyticsConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let yaml = YamlConfig::default();
        Self {
            neo4j_uri: yaml.neo4j.uri,
            neo4j_user: yaml.neo4j.user,
            neo4j_password: yaml.neo4j.password,
            server_port: yaml.server.port,
            cache_ttl_secs: yaml.hypergraph.cache_ttl_secs,
            op_timeout_ms: yaml.hypergraph.op_timeout_ms,
            max_edges: yaml.hypergraph.max_edges,
        }
    }
}

// ============================================================================
// Composition and server startup
// ============================================================================

/// Compose the shared server state: store gateway, snapshot adapter,
/// analytics engine (when compiled in), and the event bus.
pub async fn build_state(config: Config) -> Result<Arc<ServerState>> {
    let store: Arc<dyn FactStore> = Arc::new(
        Neo4jFactStore::new(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password)
            .await
            .context("Failed to initialize the fact store gateway")?,
    );

    let analytics = AnalyticsEngine::try_new(config.analytics_config());
    if analytics.is_none() {
        tracing::warn!("Graph analytics dependency not compiled in; analytics endpoints will answer 503");
    }

    let adapter = Arc::new(HypergraphAdapter::new(
        store.clone(),
        config.cache_ttl(),
        analytics.is_some(),
    ));

    Ok(Arc::new(ServerState {
        store,
        adapter,
        analytics,
        events: EventBus::default(),
        config: Arc::new(config),
    }))
}

/// Bind and serve the analytics API, with the cache-invalidation hook
/// subscribed to the event bus for the lifetime of the server.
pub async fn start_server(config: Config) -> Result<()> {
    let state = build_state(config).await?;

    let _invalidation = events::spawn_invalidation_hook(&state.events, Some(state.adapter.clone()));

    let addr = format!("0.0.0.0:{}", state.config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Hypergraph analytics API listening on {}", addr);

    let app = api::create_router(state);
    axum::serve(listener, app)
        .await
        .context("API server terminated")?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
