use thiserror::Error;

#[derive(Debug, Error)]
pub enum TabularError {
    #[error("Failed to read CSV: {0}")]
    CsvRead(#[from] csv::Error),

    #[error("CSV file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV file has no header row")]
    MissingHeader,
}
