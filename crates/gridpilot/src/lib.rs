//! # gridpilot
//!
//! A spreadsheet store with Excel (XLSX) and CSV import/export.
//!
//! ## Features
//!
//! - Sparse, sheet-addressed cell store with an active sheet
//! - A1-style address conversion
//! - Sheet lifecycle: add, remove, rename, clear
//! - XLSX import/export keeping values and formula text, with workbook
//!   password protection
//! - Single-sheet CSV import/export
//! - Async [`Session`] with loading state and an error slot
//! - Request/response payloads for an AI assistant endpoint
//!
//! Formulas are stored as text and never evaluated.
//!
//! ## Example
//!
//! ```rust
//! use gridpilot::prelude::*;
//!
//! let mut spreadsheet = Spreadsheet::new();
//! spreadsheet.set_cell_value("A1", "Product", None).unwrap();
//! spreadsheet.set_cell_value("B1", 5, None).unwrap();
//! spreadsheet.set_cell_value("D1", 5, Some("=SUM(B1:B1)")).unwrap();
//!
//! assert_eq!(spreadsheet.get_cell("D1").unwrap().unwrap().formula(), Some("SUM(B1:B1)"));
//!
//! // Save to file
//! // spreadsheet.save("output.xlsx").unwrap();
//! ```

pub mod assistant;
pub mod codec;
pub mod error;
pub mod options;
pub mod prelude;
pub mod session;

pub use assistant::{AssistantAction, AssistantRequest, AssistantResponse};
pub use codec::{decode, encode, SpreadsheetExt};
pub use error::{CodecError, CodecResult, Error, Result};
pub use options::{ExportOptions, FileFormat, ImportOptions};
pub use session::Session;

// Re-export core types
pub use gridpilot_core::{
    cell_address_to_coordinate, column_letter_to_index, coordinate_to_cell_address,
    index_to_column_letter, Cell, CellCoordinate, CellRange, CellStyle, CellValue, FontStyle,
    FontWeight, Sheet, SheetData, Spreadsheet, SpreadsheetData, TextAlign, TextDecoration,
    DEFAULT_SHEET_NAME, MAX_COLS, MAX_ROWS,
};

// Re-export I/O types
pub use gridpilot_csv::{CsvError, CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};
pub use gridpilot_xlsx::{
    XlsxError, XlsxReadOptions, XlsxReader, XlsxWriteOptions, XlsxWriter, DEFAULT_FILE_NAME,
};
