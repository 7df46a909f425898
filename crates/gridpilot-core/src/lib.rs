//! # gridpilot-core
//!
//! Core data structures for the gridpilot spreadsheet editor.
//!
//! This crate provides the fundamental types used throughout gridpilot:
//! - [`CellValue`], [`Cell`] and [`CellStyle`] - What a cell holds
//! - [`CellCoordinate`] and [`CellRange`] - Cell addressing ("A1", "A1:B10")
//! - [`SheetData`] and [`SpreadsheetData`] - Sparse per-sheet storage
//! - [`Spreadsheet`] - The store: active sheet, cell edits, sheet lifecycle
//!
//! Formulas are opaque text. Nothing in gridpilot evaluates them.
//!
//! ## Example
//!
//! ```rust
//! use gridpilot_core::{CellCoordinate, CellValue, Spreadsheet};
//!
//! let mut spreadsheet = Spreadsheet::new();
//!
//! // Using string addresses
//! spreadsheet.set_cell_value("A1", "Hello", None).unwrap();
//! spreadsheet.set_cell_value("B1", 42.0, None).unwrap();
//!
//! // Or using zero-based coordinates
//! spreadsheet.set_cell_value_at(CellCoordinate::new(1, 0), "World", None);
//! spreadsheet.set_cell_value_at(CellCoordinate::new(1, 1), 3.5, Some("B1/12"));
//!
//! let cell = spreadsheet.get_cell("B2").unwrap().unwrap();
//! assert_eq!(cell.value, CellValue::Number(3.5));
//! assert_eq!(cell.formula(), Some("B1/12"));
//! ```

pub mod cell;
pub mod error;
pub mod sheet;
pub mod spreadsheet;
pub mod workbook;

// Re-exports for convenience
pub use cell::{
    cell_address_to_coordinate, column_letter_to_index, coordinate_to_cell_address,
    index_to_column_letter, Cell, CellCoordinate, CellRange, CellStyle, CellValue, FontStyle,
    FontWeight, TextAlign, TextDecoration,
};
pub use error::{Error, Result};
pub use sheet::SheetData;
pub use spreadsheet::Spreadsheet;
pub use workbook::{Sheet, SpreadsheetData, DEFAULT_SHEET_NAME};

/// Maximum number of rows in a worksheet (Excel 2007+)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel 2007+)
pub const MAX_COLS: u32 = 16_384;
