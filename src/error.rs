use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Error type covering the failures that can occur while loading sources,
/// configuring a run, or talking to the collaborators around the pipeline.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a CSV source cannot be tokenised.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the XLSX reader.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the legacy XLS reader.
    #[error("XLS read error: {0}")]
    XlsRead(#[from] calamine::XlsError),

    /// Raised when JSON configuration parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a source decodes but does not contain a usable table.
    #[error("malformed source '{source_name}': {reason}")]
    Malformed { source_name: String, reason: String },

    /// Raised when a workbook has no worksheet to read from.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the configuration value fails validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a listing or fetch collaborator fails.
    #[error("source store error: {0}")]
    Store(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ReportError {
    /// Builds a [`ReportError::Malformed`] for the named source.
    pub fn malformed(source_name: &str, reason: impl Into<String>) -> Self {
        ReportError::Malformed {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }
}
