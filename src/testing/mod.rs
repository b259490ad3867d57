//! Test doubles for the graph store seam.

pub mod memory_graph;

pub use memory_graph::MemoryGraph;
