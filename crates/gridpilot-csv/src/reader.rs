//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;
use gridpilot_core::{CellCoordinate, CellValue, SheetData};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into sheet cells
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<SheetData> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into sheet cells
    ///
    /// Every record becomes a row starting at A1; the first record is data,
    /// not a header. Empty fields are not stored.
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<SheetData> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut sheet = SheetData::new();

        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            let row = u32::try_from(row_idx)
                .map_err(|_| CsvError::TooLarge(format!("row {}", row_idx + 1)))?;

            for (col_idx, field) in record.iter().enumerate() {
                let value = if options.auto_detect_types {
                    Self::detect_type(field)
                } else if field.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::string(field)
                };

                if value.is_empty() {
                    continue;
                }

                let col = u32::try_from(col_idx)
                    .map_err(|_| CsvError::TooLarge(format!("column {}", col_idx + 1)))?;
                sheet.set_value_at(CellCoordinate::new(row, col), value, None);
            }
        }

        log::debug!("read {} CSV cells", sheet.len());
        Ok(sheet)
    }

    /// Detect the type of a field value
    fn detect_type(field: &str) -> CellValue {
        let trimmed = field.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Boolean(false);
        }

        // "inf" and "NaN" parse as f64 but are text in a spreadsheet
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::string(field),
        }
    }
}
