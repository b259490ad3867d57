//! In-memory [`GraphStore`] used by the integration tests.
//!
//! Mirrors the store-side semantics the loader relies on: nodes are keyed
//! by (label, merge-key value), properties are overwritten on re-upsert,
//! edges are a set of (source, type, target), and an edge upsert with a
//! missing endpoint fails with `TargetMissing`.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::loader::errors::StoreError;
use crate::loader::{EdgeUpsert, GraphStore, NodeUpsert, ParamValue};

type NodeKey = (String, String);

#[derive(Debug, Default)]
struct State {
    constraints: HashSet<(String, String)>,
    nodes: HashMap<NodeKey, HashMap<String, ParamValue>>,
    edges: HashSet<(NodeKey, String, NodeKey)>,
}

#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: Mutex<State>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.state.lock().unwrap().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.state.lock().unwrap().edges.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.state.lock().unwrap().constraints.len()
    }

    pub fn has_node(&self, label: &str, key: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .nodes
            .contains_key(&(label.to_string(), key.to_string()))
    }

    /// Rendered property value of a node, if the node and property exist.
    pub fn node_property(&self, label: &str, key: &str, property: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .nodes
            .get(&(label.to_string(), key.to_string()))
            .and_then(|props| props.get(property))
            .map(ParamValue::render)
    }

    pub fn has_edge(
        &self,
        from_label: &str,
        from_key: &str,
        rel_type: &str,
        to_label: &str,
        to_key: &str,
    ) -> bool {
        self.state.lock().unwrap().edges.contains(&(
            (from_label.to_string(), from_key.to_string()),
            rel_type.to_string(),
            (to_label.to_string(), to_key.to_string()),
        ))
    }

    pub fn edges_of_type(&self, rel_type: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .edges
            .iter()
            .filter(|(_, t, _)| t == rel_type)
            .count()
    }

    pub fn nodes_with_label(&self, label: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .nodes
            .keys()
            .filter(|(l, _)| l == label)
            .count()
    }
}

fn node_key(label: &str, key: &ParamValue) -> NodeKey {
    (label.to_string(), key.render())
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn ensure_constraint(&self, label: &str, property: &str) -> Result<(), StoreError> {
        self.state
            .lock()
            .unwrap()
            .constraints
            .insert((label.to_string(), property.to_string()));
        Ok(())
    }

    async fn upsert_node(&self, node: &NodeUpsert) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let props = state.nodes.entry(node_key(node.label, &node.key)).or_default();
        props.insert(node.key_property.to_string(), node.key.clone());
        for (property, value) in &node.properties {
            props.insert(property.clone(), value.clone());
        }
        Ok(())
    }

    async fn upsert_edge(&self, edge: &EdgeUpsert) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        for end in [&edge.from, &edge.to] {
            if !state.nodes.contains_key(&node_key(end.label, &end.key)) {
                return Err(StoreError::TargetMissing {
                    label: end.label.to_string(),
                    property: end.key_property.to_string(),
                    key: end.key.render(),
                });
            }
        }
        state.edges.insert((
            node_key(edge.from.label, &edge.from.key),
            edge.rel_type.to_string(),
            node_key(edge.to.label, &edge.to.key),
        ));
        Ok(())
    }
}
