//! WorldGraph - World Bank open data into a Neo4j property graph
//!
//! This crate materializes heterogeneous nested JSON (paginated API
//! responses describing datasets, projects, loans, disbursements) as a
//! labeled property graph in two stages:
//! - Flattening/tabularization: arbitrary JSON trees become uniform flat
//!   tables (CSV interchange, `nil` sentinel for absent cells)
//! - Schema-dispatched loading: each table type maps through a static
//!   registry onto idempotent node/relationship upserts

pub mod config;
pub mod flatten;
pub mod graph_model;
pub mod loader;
pub mod pipeline;
pub mod source;
pub mod tabular;
pub mod testing;
