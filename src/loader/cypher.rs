//! Parameterized Cypher text for the structured upsert operations.
//!
//! Labels, relationship types, and property names are interpolated into the
//! statement text, but they only ever come from the static registry in
//! `graph_model`. Row values always travel as query parameters.

use super::{EdgeUpsert, NodeRef, NodeUpsert, ParamValue};

pub const KEY_PARAM: &str = "key";
pub const FROM_KEY_PARAM: &str = "from_key";
pub const TO_KEY_PARAM: &str = "to_key";

/// `MERGE` the node on its key property, then `SET` the remaining
/// properties (overwriting on every load, never removing).
pub fn merge_node(node: &NodeUpsert) -> (String, Vec<(String, ParamValue)>) {
    let mut text = format!(
        "MERGE (n:{} {{{}: ${}}})",
        node.label, node.key_property, KEY_PARAM
    );
    let mut params = vec![(KEY_PARAM.to_string(), node.key.clone())];

    if !node.properties.is_empty() {
        let assignments: Vec<String> = node
            .properties
            .iter()
            .map(|(property, _)| format!("n.{property} = ${property}"))
            .collect();
        text.push_str("\nSET ");
        text.push_str(&assignments.join(", "));
        for (property, value) in &node.properties {
            params.push((property.clone(), value.clone()));
        }
    }

    (text, params)
}

/// `MATCH` both endpoints, `MERGE` exactly one edge of the given type
/// between them. Returning the count makes a missing endpoint observable:
/// zero result rows means at least one `MATCH` found nothing.
pub fn merge_edge(edge: &EdgeUpsert) -> (String, Vec<(String, ParamValue)>) {
    let text = format!(
        "MATCH (a:{} {{{}: ${}}})\nMATCH (b:{} {{{}: ${}}})\nMERGE (a)-[r:{}]->(b)\nRETURN count(r) AS merged",
        edge.from.label,
        edge.from.key_property,
        FROM_KEY_PARAM,
        edge.to.label,
        edge.to.key_property,
        TO_KEY_PARAM,
        edge.rel_type,
    );
    let params = vec![
        (FROM_KEY_PARAM.to_string(), edge.from.key.clone()),
        (TO_KEY_PARAM.to_string(), edge.to.key.clone()),
    ];
    (text, params)
}

/// Idempotent uniqueness constraint for one (label, property) pair.
pub fn unique_constraint(label: &str, property: &str) -> String {
    format!("CREATE CONSTRAINT IF NOT EXISTS FOR (n:{label}) REQUIRE n.{property} IS UNIQUE")
}
