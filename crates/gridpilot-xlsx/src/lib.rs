//! # gridpilot-xlsx
//!
//! XLSX (Office Open XML) import and export for gridpilot.
//!
//! Import reads a workbook container into sparse [`SpreadsheetData`]; export
//! lays each sheet out as a dense rectangle, attaches formulas, and writes a
//! new container. Formulas travel as text in both directions.
//!
//! ```rust
//! use gridpilot_core::Spreadsheet;
//! use gridpilot_xlsx::{XlsxReadOptions, XlsxReader, XlsxWriteOptions, XlsxWriter};
//!
//! let mut spreadsheet = Spreadsheet::new();
//! spreadsheet.set_cell_value("A1", "Total", None).unwrap();
//! spreadsheet.set_cell_value("B1", 0, Some("SUM(B2:B9)")).unwrap();
//!
//! let bytes = XlsxWriter::write_to_bytes(spreadsheet.data(), &XlsxWriteOptions::default()).unwrap();
//! let data = XlsxReader::read_bytes(&bytes, &XlsxReadOptions::default()).unwrap();
//! assert_eq!(data.sheet_names(), vec!["Sheet1"]);
//! ```
//!
//! [`SpreadsheetData`]: gridpilot_core::SpreadsheetData

pub mod error;
pub mod options;
pub mod protection;
pub mod reader;
pub mod writer;

pub use error::{XlsxError, XlsxResult};
pub use options::{XlsxReadOptions, XlsxWriteOptions, DEFAULT_FILE_NAME};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
