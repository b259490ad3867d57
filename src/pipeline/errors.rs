use std::path::PathBuf;

use thiserror::Error;

use crate::loader::errors::StoreError;
use crate::tabular::errors::TabularError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input directory `{0}` does not exist")]
    MissingInputDir(PathBuf),

    #[error("Failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("`{path}` is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Tabular(#[from] TabularError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
