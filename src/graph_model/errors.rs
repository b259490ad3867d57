use thiserror::Error;

/// Row-level data errors: a record that cannot be mapped onto its
/// descriptor. Caught at the row boundary, never aborts a table load.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    #[error("Row {row}: merge key column `{column}` is missing or nil")]
    MissingMergeKey { row: usize, column: String },

    #[error("Row {row}: value `{value}` in column `{column}` is not coercible to float")]
    Uncoercible {
        row: usize,
        column: String,
        value: String,
    },

    #[error("No entity descriptor registered for `{name}`")]
    UnknownEntity { name: String },
}
