//! Uniqueness constraints for every label the registry references.
//!
//! Must run to completion before any load: the upserts rely on merge-key
//! uniqueness to avoid duplicate nodes. Safe to call repeatedly — the
//! statements are `IF NOT EXISTS` and the store treats existing
//! constraints as a no-op.

use log::info;

use crate::graph_model;
use super::errors::StoreError;
use super::GraphStore;

pub async fn ensure_constraints<S: GraphStore>(store: &S) -> Result<(), StoreError> {
    for (label, property) in graph_model::constraint_pairs() {
        store.ensure_constraint(label, property).await?;
        info!("Ensured uniqueness constraint on {label}.{property}");
    }
    Ok(())
}
