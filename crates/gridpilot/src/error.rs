//! Facade error types

use thiserror::Error;

use gridpilot_csv::CsvError;
use gridpilot_xlsx::XlsxError;

/// Result type for facade operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for codec dispatch
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Failure inside a file codec
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Xlsx(#[from] XlsxError),

    #[error(transparent)]
    Csv(#[from] CsvError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] gridpilot_core::Error),

    /// The file held no sheet matching the import options
    #[error("no sheets to import")]
    NoSheets,

    /// Export file name is not a single plain path component
    #[error("invalid export file name '{0}'")]
    InvalidFileName(String),

    /// Every selected sheet was empty or absent
    #[error("workbook is empty")]
    EmptyWorkbook,

    /// The blocking worker panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(String),
}

/// Errors surfaced by the facade
#[derive(Debug, Error)]
pub enum Error {
    /// Address or sheet-lifecycle error from the store
    #[error(transparent)]
    Core(#[from] gridpilot_core::Error),

    /// Import failed; the store is unchanged
    #[error("Failed to import spreadsheet: {0}")]
    Import(#[source] CodecError),

    /// Export failed; nothing was written
    #[error("Failed to export spreadsheet: {0}")]
    Export(#[source] CodecError),

    /// File extension is neither xlsx nor csv
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The assistant answered with an error
    #[error("Assistant error: {0}")]
    Assistant(String),

    /// Assistant payload (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
