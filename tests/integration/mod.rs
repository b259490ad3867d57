//! Integration tests - full pipeline runs against the in-memory store.

mod loader_tests;
mod pipeline_tests;
