//! Error types for gridpilot-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gridpilot-core
///
/// Every variant is a caller error: the operation that produced it left the
/// store unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed cell address or column letters
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Coordinate component outside the addressable domain
    #[error("Invalid cell coordinate: row {row}, col {col}")]
    InvalidCoordinate { row: i64, col: i64 },

    /// A sheet with this name already exists
    #[error("Sheet \"{0}\" already exists")]
    DuplicateSheet(String),

    /// No sheet with this name exists
    #[error("Sheet \"{0}\" does not exist")]
    UnknownSheet(String),

    /// Attempted to remove the only remaining sheet
    #[error("Cannot remove the last sheet \"{0}\"")]
    LastSheet(String),

    /// Sheet name rejected (empty)
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Sheet extends past the last addressable cell, XFD1048576
    #[error("Sheet extends to {0}, beyond the last cell XFD1048576")]
    OutOfBounds(String),

    /// Spreadsheet data without any sheet
    #[error("Spreadsheet data contains no sheets")]
    EmptyWorkbook,
}
