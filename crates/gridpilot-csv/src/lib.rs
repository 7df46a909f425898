//! # gridpilot-csv
//!
//! CSV reader and writer for gridpilot. A CSV file holds exactly one sheet
//! of values; formulas and styles have no CSV representation.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use reader::CsvReader;
pub use writer::CsvWriter;
