//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur during XLSX reading/writing
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Invalid file format
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// The container is an encrypted (OLE compound file) workbook
    #[error("Encrypted workbooks are not supported")]
    EncryptedContainer,

    /// Supplied password does not match the workbook protection hash
    #[error("Incorrect password")]
    IncorrectPassword,

    /// Sheet name the container format cannot hold
    #[error("Invalid sheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: &'static str },

    /// Sheet holds cells past XFD1048576, which no workbook can address
    #[error("Sheet '{sheet}' extends to {extent}, beyond the last cell XFD1048576")]
    OutOfBounds { sheet: String, extent: String },

    /// Nothing to write: every selected sheet was empty or absent
    #[error("Workbook is empty")]
    EmptyWorkbook,

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] gridpilot_core::Error),
}
