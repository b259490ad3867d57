//! Schema-dispatched graph loading.
//!
//! Each table is loaded row by row through its [`EntityDescriptor`]: merge
//! the primary node, then merge-or-match the relationship target and merge
//! exactly one edge. Upserts are structured operations executed through the
//! [`GraphStore`] trait; [`Neo4jStore`](neo4j::Neo4jStore) turns them into
//! parameterized Cypher.
//!
//! Error policy: row-level failures (uncoercible value, missing merge key,
//! missing match-existing target) are logged with the offending row and the
//! load continues; store failures abort the call. Re-running a load on the
//! same table leaves node count, edge count, and property values unchanged.

pub mod constraints;
pub mod cypher;
pub mod errors;
pub mod neo4j;

pub use self::constraints::ensure_constraints;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::graph_model::{Coercion, Direction, EntityDescriptor, PropertyMapping, TargetMode};
use crate::graph_model::errors::SchemaError;
use crate::tabular::Table;
use self::errors::StoreError;

/// A value bound to a query parameter. Uncoerced cells travel as text
/// (including the literal `nil` sentinel, exactly as the source CSVs carry
/// it); float-coerced cells travel as numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Float(f64),
}

impl ParamValue {
    pub fn render(&self) -> String {
        match self {
            ParamValue::Text(s) => s.clone(),
            ParamValue::Float(f) => f.to_string(),
        }
    }
}

/// Create-if-absent-else-update of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeUpsert {
    pub label: &'static str,
    pub key_property: &'static str,
    pub key: ParamValue,
    pub properties: Vec<(String, ParamValue)>,
}

/// Reference to a node by label and merge key.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRef {
    pub label: &'static str,
    pub key_property: &'static str,
    pub key: ParamValue,
}

/// Create-if-absent of one directed, typed edge between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeUpsert {
    pub rel_type: &'static str,
    pub from: NodeRef,
    pub to: NodeRef,
}

/// The seam between the loader and the backing graph store. All three
/// operations are idempotent on the store side.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn ensure_constraint(&self, label: &str, property: &str) -> Result<(), StoreError>;

    async fn upsert_node(&self, node: &NodeUpsert) -> Result<(), StoreError>;

    /// Both endpoints must exist; a missing endpoint is
    /// [`StoreError::TargetMissing`].
    async fn upsert_edge(&self, edge: &EdgeUpsert) -> Result<(), StoreError>;
}

/// Per-table load outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_loaded: usize,
    pub rows_skipped: usize,
    /// Rows whose node loaded but whose relationship target was missing.
    pub relationships_skipped: usize,
}

/// Dispatches tables to idempotent upsert routines driven by the registry.
pub struct GraphLoader<'a, S: GraphStore> {
    store: &'a S,
}

impl<'a, S: GraphStore> GraphLoader<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Load every row of `table` under `descriptor`.
    pub async fn load(
        &self,
        table: &Table,
        descriptor: &EntityDescriptor,
    ) -> Result<LoadReport, StoreError> {
        info!(
            "Loading {} rows as {}",
            table.row_count(),
            descriptor.label
        );
        let mut report = LoadReport::default();

        for row in 0..table.row_count() {
            match self.load_row(table, row, descriptor).await {
                Ok(relationship_loaded) => {
                    report.rows_loaded += 1;
                    if !relationship_loaded {
                        report.relationships_skipped += 1;
                    }
                }
                Err(RowError::Schema(err)) => {
                    warn!("{}: skipping row: {}", descriptor.label, err);
                    report.rows_skipped += 1;
                }
                Err(RowError::Store(err)) if err.is_row_level() => {
                    warn!("{}: skipping row {}: {}", descriptor.label, row, err);
                    report.rows_skipped += 1;
                }
                Err(RowError::Store(err)) => return Err(err),
            }
        }

        info!(
            "{}: loaded {} rows, skipped {}, relationships skipped {}",
            descriptor.label,
            report.rows_loaded,
            report.rows_skipped,
            report.relationships_skipped
        );
        Ok(report)
    }

    /// Load one row. Returns whether the declared relationship (if any)
    /// was materialized.
    async fn load_row(
        &self,
        table: &Table,
        row: usize,
        descriptor: &EntityDescriptor,
    ) -> Result<bool, RowError> {
        let node = primary_upsert(table, row, descriptor)?;
        self.store.upsert_node(&node).await?;

        let Some(rel) = &descriptor.relationship else {
            return Ok(true);
        };

        let target_key = table.cell(row, rel.target_key_column);
        if target_key.is_nil() {
            debug!(
                "{} row {}: no `{}` value, relationship {} skipped",
                descriptor.label, row, rel.target_key_column, rel.rel_type
            );
            return Ok(false);
        }
        let target = NodeRef {
            label: rel.target_label,
            key_property: rel.target_key_property,
            key: ParamValue::Text(target_key.render()),
        };

        if rel.target_mode == TargetMode::Merge {
            self.store
                .upsert_node(&NodeUpsert {
                    label: target.label,
                    key_property: target.key_property,
                    key: target.key.clone(),
                    properties: mapped_properties(table, row, rel.target_properties)
                        .map_err(RowError::Schema)?,
                })
                .await?;
        }

        let primary = NodeRef {
            label: node.label,
            key_property: node.key_property,
            key: node.key.clone(),
        };
        let edge = match rel.direction {
            Direction::FromPrimary => EdgeUpsert {
                rel_type: rel.rel_type,
                from: primary,
                to: target,
            },
            Direction::ToPrimary => EdgeUpsert {
                rel_type: rel.rel_type,
                from: target,
                to: primary,
            },
        };

        match self.store.upsert_edge(&edge).await {
            Ok(()) => Ok(true),
            Err(err) if err.is_row_level() => {
                warn!("{} row {}: {}", descriptor.label, row, err);
                Ok(false)
            }
            Err(err) => Err(RowError::Store(err)),
        }
    }
}

enum RowError {
    Schema(SchemaError),
    Store(StoreError),
}

impl From<SchemaError> for RowError {
    fn from(err: SchemaError) -> Self {
        RowError::Schema(err)
    }
}

impl From<StoreError> for RowError {
    fn from(err: StoreError) -> Self {
        RowError::Store(err)
    }
}

/// Build the primary node upsert for one row.
fn primary_upsert(
    table: &Table,
    row: usize,
    descriptor: &EntityDescriptor,
) -> Result<NodeUpsert, SchemaError> {
    let key_cell = table.cell(row, descriptor.merge_key_column);
    if key_cell.is_nil() {
        return Err(SchemaError::MissingMergeKey {
            row,
            column: descriptor.merge_key_column.to_string(),
        });
    }

    Ok(NodeUpsert {
        label: descriptor.label,
        key_property: descriptor.merge_key_property,
        key: ParamValue::Text(key_cell.render()),
        properties: mapped_properties_at(table, row, descriptor.properties)
            .map_err(|err| err.at_row(row))?,
    })
}

/// Apply a property mapping list to one row, coercing as declared. A `Nil`
/// cell under a float coercion omits the property; any other uncoercible
/// cell is a schema error for the row.
fn mapped_properties(
    table: &Table,
    row: usize,
    mappings: &[PropertyMapping],
) -> Result<Vec<(String, ParamValue)>, SchemaError> {
    mapped_properties_at(table, row, mappings).map_err(|err| err.at_row(row))
}

fn mapped_properties_at(
    table: &Table,
    row: usize,
    mappings: &[PropertyMapping],
) -> Result<Vec<(String, ParamValue)>, PropertyError> {
    let mut properties = Vec::with_capacity(mappings.len());
    for mapping in mappings {
        let cell = table.cell(row, mapping.column);
        match mapping.coerce {
            Coercion::None => {
                properties.push((mapping.property.to_string(), ParamValue::Text(cell.render())));
            }
            Coercion::Float if cell.is_nil() => {}
            Coercion::Float => match cell.as_f64() {
                Some(v) => properties.push((mapping.property.to_string(), ParamValue::Float(v))),
                None => {
                    return Err(PropertyError {
                        column: mapping.column,
                        value: cell.render(),
                    })
                }
            },
        }
    }
    Ok(properties)
}

struct PropertyError {
    column: &'static str,
    value: String,
}

impl PropertyError {
    fn at_row(self, row: usize) -> SchemaError {
        SchemaError::Uncoercible {
            row,
            column: self.column.to_string(),
            value: self.value,
        }
    }
}
