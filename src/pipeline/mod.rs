//! End-to-end orchestration: JSON files → CSV tables → property graph.
//!
//! One JSON file is one record batch; its stem names the entity type
//! (`datasets.json`, `projects.json`, ...). Stages run strictly in order:
//! convert every file, ensure constraints once, then load table by table.
//! File-level failures skip that file and continue; store failures abort.

pub mod errors;

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use serde_json::Value;

use crate::graph_model;
use crate::loader::{ensure_constraints, GraphLoader, GraphStore, LoadReport};
use crate::tabular::Table;
use self::errors::PipelineError;

/// One converted batch: the input stem plus where its CSV landed.
#[derive(Debug, Clone)]
pub struct ConvertedFile {
    pub stem: String,
    pub csv_path: PathBuf,
}

/// Convert a single JSON file to `<out_dir>/<stem>.csv`.
pub fn convert_file(input: &Path, out_dir: &Path) -> Result<ConvertedFile, PipelineError> {
    let text = fs::read_to_string(input).map_err(|source| PipelineError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| PipelineError::Json {
        path: input.to_path_buf(),
        source,
    })?;

    let table = Table::tabulate(&value);
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let csv_path = out_dir.join(format!("{stem}.csv"));
    table.to_csv_path(&csv_path)?;

    info!(
        "Converted {} ({} rows) -> {}",
        input.display(),
        table.row_count(),
        csv_path.display()
    );
    Ok(ConvertedFile { stem, csv_path })
}

/// Convert every `*.json` file in `in_dir`. Per-file failures are logged
/// and skipped; a missing input directory is fatal.
pub fn convert_directory(in_dir: &Path, out_dir: &Path) -> Result<Vec<ConvertedFile>, PipelineError> {
    if !in_dir.is_dir() {
        return Err(PipelineError::MissingInputDir(in_dir.to_path_buf()));
    }
    fs::create_dir_all(out_dir).map_err(|source| PipelineError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut entries: Vec<PathBuf> = fs::read_dir(in_dir)
        .map_err(|source| PipelineError::Io {
            path: in_dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    entries.sort();

    if entries.is_empty() {
        warn!("No JSON files found in {}", in_dir.display());
    }

    let mut converted = Vec::new();
    for path in entries {
        match convert_file(&path, out_dir) {
            Ok(file) => converted.push(file),
            Err(err) => error!("Failed to convert {}: {}", path.display(), err),
        }
    }
    Ok(converted)
}

/// Ensure constraints, then load converted CSVs in registry order (loans
/// must precede the disbursements that reference them). Stems with no
/// registered entity type are logged and skipped.
pub async fn load_converted<S: GraphStore>(
    store: &S,
    files: &[ConvertedFile],
) -> Result<Vec<LoadReport>, PipelineError> {
    ensure_constraints(store).await?;

    for file in files {
        if graph_model::descriptor_for_stem(&file.stem).is_err() {
            warn!("Skipping {}: no entity type for stem `{}`", file.csv_path.display(), file.stem);
        }
    }

    let loader = GraphLoader::new(store);
    let mut reports = Vec::new();
    for descriptor in graph_model::descriptors() {
        let Some(file) = files.iter().find(|f| f.stem == descriptor.stem) else {
            continue;
        };

        let table = match Table::from_csv_path(&file.csv_path) {
            Ok(t) => t,
            Err(err) => {
                error!("Failed to read {}: {}", file.csv_path.display(), err);
                continue;
            }
        };

        reports.push(loader.load(&table, descriptor).await?);
    }
    Ok(reports)
}

/// Full run over a directory: convert, then load.
pub async fn run<S: GraphStore>(
    store: &S,
    in_dir: &Path,
    csv_dir: &Path,
) -> Result<Vec<LoadReport>, PipelineError> {
    let files = convert_directory(in_dir, csv_dir)?;
    load_converted(store, &files).await
}
