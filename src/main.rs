//! Hypergraph Analytics - Main Server
//!
//! Read-only analytics API over an N-ary fact store in Neo4j.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hypergraph_analytics::store::{DikwLayer, FactFilters};
use hypergraph_analytics::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hypergraph-analytics")]
#[command(about = "Hypergraph Analytics Server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the analytics API server
    Serve {
        /// Port to listen on (overrides config file and SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the YAML config file (default: config.yaml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print a one-shot topology summary of the hypergraph as JSON
    Summary {
        /// Path to the YAML config file (default: config.yaml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Keep facts with aggregate confidence >= this value
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Keep facts whose participants all sit on this DIKW layer
        #[arg(long)]
        layer: Option<String>,

        /// Keep facts extracted from this source document
        #[arg(long)]
        document_id: Option<String>,

        /// Keep facts of this type
        #[arg(long)]
        fact_type: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hypergraph_analytics=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, config } => {
            let mut config = Config::from_yaml_and_env(config.as_deref())?;
            if let Some(port) = port {
                config.server_port = port;
            }
            hypergraph_analytics::start_server(config).await
        }
        Commands::Summary {
            config,
            min_confidence,
            layer,
            document_id,
            fact_type,
        } => {
            let config = Config::from_yaml_and_env(config.as_deref())?;
            let filters = build_filters(min_confidence, layer, document_id, fact_type)?;
            run_summary(config, filters).await
        }
    }
}

fn build_filters(
    min_confidence: Option<f64>,
    layer: Option<String>,
    document_id: Option<String>,
    fact_type: Option<String>,
) -> Result<FactFilters> {
    if let Some(confidence) = min_confidence {
        if !(0.0..=1.0).contains(&confidence) {
            anyhow::bail!("--min-confidence must be in [0, 1], got {confidence}");
        }
    }

    let layer = layer
        .as_deref()
        .map(|raw| {
            DikwLayer::parse(raw).with_context(|| {
                format!("unknown layer '{raw}' (expected perception, semantic, reasoning or application)")
            })
        })
        .transpose()?;

    Ok(FactFilters {
        min_confidence,
        layer,
        document_id,
        fact_type,
    })
}

async fn run_summary(config: Config, filters: FactFilters) -> Result<()> {
    let state = hypergraph_analytics::build_state(config).await?;
    let engine = state
        .analytics
        .clone()
        .context("Graph analytics dependency is not compiled in")?;

    let snapshot = state.adapter.load(&filters).await?;
    tracing::info!(
        nodes = snapshot.node_count(),
        edges = snapshot.edge_count(),
        "Snapshot loaded"
    );

    let summary = engine.topological_summary(snapshot).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
