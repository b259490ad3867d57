use thiserror::Error;

/// Errors surfaced by a graph store backend.
///
/// `TargetMissing` is the row-level referential-integrity failure (a
/// match-existing relationship target that was never loaded); everything
/// else is a connection/query failure and aborts the load.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Relationship target {label}({property} = `{key}`) does not exist")]
    TargetMissing {
        label: String,
        property: String,
        key: String,
    },

    #[error("Graph store failure: {0}")]
    Connection(#[from] neo4rs::Error),
}

impl StoreError {
    /// Row-level errors are logged and skipped; the rest propagate.
    pub fn is_row_level(&self) -> bool {
        matches!(self, StoreError::TargetMissing { .. })
    }
}
