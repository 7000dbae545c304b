//! Neo4j-backed fact store.
//!
//! Facts are reified hyperedges: one `Fact` node per N-ary relation, linked
//! to each participating `Entity` node by an `INVOLVES` relationship. All
//! queries here are read-only except schema initialization; the extraction
//! pipeline owns writes.

use crate::store::models::{DikwLayer, EntityRecord, FactFilters, FactRecord};
use crate::store::traits::FactStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use neo4rs::{query, Graph};
use std::sync::Arc;

/// Fact store client backed by a Neo4j property graph.
pub struct Neo4jFactStore {
    graph: Arc<Graph>,
}

impl Neo4jFactStore {
    /// Connect to Neo4j and ensure the fact/entity schema exists.
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        let store = Self {
            graph: Arc::new(graph),
        };

        store.init_schema().await?;

        Ok(store)
    }

    /// Create uniqueness constraints and indexes for Fact/Entity nodes.
    async fn init_schema(&self) -> Result<()> {
        let constraints = vec![
            "CREATE CONSTRAINT fact_id IF NOT EXISTS FOR (f:Fact) REQUIRE f.id IS UNIQUE",
            "CREATE CONSTRAINT entity_id IF NOT EXISTS FOR (e:Entity) REQUIRE e.id IS UNIQUE",
        ];

        let indexes = vec![
            "CREATE INDEX fact_type IF NOT EXISTS FOR (f:Fact) ON (f.fact_type)",
            "CREATE INDEX fact_confidence IF NOT EXISTS FOR (f:Fact) ON (f.aggregate_confidence)",
            "CREATE INDEX fact_document IF NOT EXISTS FOR (f:Fact) ON (f.source_document_id)",
            "CREATE INDEX entity_layer IF NOT EXISTS FOR (e:Entity) ON (e.layer)",
            "CREATE INDEX entity_type IF NOT EXISTS FOR (e:Entity) ON (e.entity_type)",
        ];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }

        for index in indexes {
            if let Err(e) = self.graph.run(query(index)).await {
                tracing::warn!("Index may already exist: {}", e);
            }
        }

        Ok(())
    }

    fn node_to_fact(node: &neo4rs::Node, participants: Vec<String>) -> FactRecord {
        FactRecord {
            id: node.get::<String>("id").unwrap_or_default(),
            participants,
            fact_type: node.get::<String>("fact_type").unwrap_or_default(),
            aggregate_confidence: node.get::<f64>("aggregate_confidence").unwrap_or(0.0),
            validated: node.get::<bool>("validated").unwrap_or(false),
            validation_count: node.get::<i64>("validation_count").unwrap_or(0).max(0) as u32,
            extraction_method: node.get::<String>("extraction_method").ok(),
            source_document_id: node.get::<String>("source_document_id").ok(),
            created_at: node
                .get::<String>("created_at")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    fn node_to_entity(node: &neo4rs::Node) -> Option<EntityRecord> {
        let id: String = node.get("id").ok()?;
        let layer_raw: String = node.get("layer").unwrap_or_default();
        let Some(layer) = DikwLayer::parse(&layer_raw) else {
            tracing::warn!(entity_id = %id, layer = %layer_raw, "Skipping entity with unknown DIKW layer");
            return None;
        };
        Some(EntityRecord {
            id,
            name: node.get("name").unwrap_or_default(),
            entity_type: node.get("entity_type").unwrap_or_default(),
            layer,
            confidence: node.get::<f64>("confidence").unwrap_or(0.0),
        })
    }
}

#[async_trait]
impl FactStore for Neo4jFactStore {
    async fn list_facts(&self, filters: &FactFilters) -> Result<Vec<FactRecord>> {
        // Fact-level conditions are applied before aggregation; the layer
        // condition needs the collected participants, so it lives after WITH.
        let mut fact_conditions: Vec<&str> = Vec::new();
        if filters.min_confidence.is_some() {
            fact_conditions.push("f.aggregate_confidence >= $min_confidence");
        }
        if filters.document_id.is_some() {
            fact_conditions.push("f.source_document_id = $document_id");
        }
        if filters.fact_type.is_some() {
            fact_conditions.push("f.fact_type = $fact_type");
        }

        let fact_where = if fact_conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", fact_conditions.join(" AND "))
        };

        let layer_where = if filters.layer.is_some() {
            "WHERE all(e IN es WHERE e.layer = $layer)"
        } else {
            ""
        };

        let cypher = format!(
            r#"
            MATCH (f:Fact)
            {fact_where}
            MATCH (f)-[:INVOLVES]->(e:Entity)
            WITH f, collect(e) AS es
            {layer_where}
            RETURN f, [e IN es | e.id] AS participants
            ORDER BY f.id
            "#
        );

        let mut q = query(&cypher);
        if let Some(min_confidence) = filters.min_confidence {
            q = q.param("min_confidence", min_confidence);
        }
        if let Some(document_id) = &filters.document_id {
            q = q.param("document_id", document_id.clone());
        }
        if let Some(fact_type) = &filters.fact_type {
            q = q.param("fact_type", fact_type.clone());
        }
        if let Some(layer) = filters.layer {
            q = q.param("layer", layer.as_str());
        }

        let mut result = self.graph.execute(q).await?;
        let mut facts = Vec::new();

        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("f")?;
            let participants: Vec<String> = row.get("participants")?;
            facts.push(Self::node_to_fact(&node, participants));
        }

        Ok(facts)
    }

    async fn get_entities(&self, ids: &[String]) -> Result<Vec<EntityRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let q = query(
            r#"
            MATCH (e:Entity)
            WHERE e.id IN $ids
            RETURN e
            ORDER BY e.id
            "#,
        )
        .param("ids", ids.to_vec());

        let mut result = self.graph.execute(q).await?;
        let mut entities = Vec::new();

        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("e")?;
            if let Some(entity) = Self::node_to_entity(&node) {
                entities.push(entity);
            }
        }

        Ok(entities)
    }

    async fn health_check(&self) -> Result<()> {
        let mut result = self.graph.execute(query("RETURN 1 AS ok")).await?;
        result.next().await?;
        Ok(())
    }
}
