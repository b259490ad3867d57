//! Neo4j-backed [`GraphStore`] over the Bolt protocol (neo4rs).
//!
//! The connection is acquired once from [`StoreConfig`] and held for the
//! full constraint-setup-then-load sequence; neo4rs releases the underlying
//! pool on drop.

use async_trait::async_trait;
use log::debug;
use neo4rs::{query, ConfigBuilder, Graph, Query};

use crate::config::StoreConfig;
use super::cypher;
use super::errors::StoreError;
use super::{EdgeUpsert, GraphStore, NodeUpsert, ParamValue};

pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    /// Connect and verify the session with a round trip before any work
    /// is dispatched.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let graph_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .build()?;
        let graph = Graph::connect(graph_config).await?;
        let store = Self { graph };
        store.check_connection().await?;
        Ok(store)
    }

    /// `RETURN 1` smoke check; fails fast on bad endpoint or credentials.
    pub async fn check_connection(&self) -> Result<(), StoreError> {
        let mut rows = self.graph.execute(query("RETURN 1 AS num")).await?;
        while rows.next().await?.is_some() {}
        Ok(())
    }
}

fn bind(mut q: Query, params: Vec<(String, ParamValue)>) -> Query {
    for (name, value) in params {
        q = match value {
            ParamValue::Text(s) => q.param(&name, s),
            ParamValue::Float(f) => q.param(&name, f),
        };
    }
    q
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn ensure_constraint(&self, label: &str, property: &str) -> Result<(), StoreError> {
        let text = cypher::unique_constraint(label, property);
        debug!("{text}");
        self.graph.run(query(&text)).await?;
        Ok(())
    }

    async fn upsert_node(&self, node: &NodeUpsert) -> Result<(), StoreError> {
        let (text, params) = cypher::merge_node(node);
        self.graph.run(bind(query(&text), params)).await?;
        Ok(())
    }

    async fn upsert_edge(&self, edge: &EdgeUpsert) -> Result<(), StoreError> {
        let (text, params) = cypher::merge_edge(edge);
        let mut rows = self.graph.execute(bind(query(&text), params)).await?;

        // Zero result rows: a MATCH found nothing, so no edge was merged.
        let mut merged = false;
        while rows.next().await?.is_some() {
            merged = true;
        }
        if merged {
            Ok(())
        } else {
            Err(StoreError::TargetMissing {
                label: edge.from.label.to_string(),
                property: edge.from.key_property.to_string(),
                key: edge.from.key.render(),
            })
        }
    }
}
