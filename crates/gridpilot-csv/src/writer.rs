//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::{CsvWriteOptions, LineTerminator};
use gridpilot_core::SheetData;

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write sheet cells to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        sheet: &SheetData,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        check_bounds(sheet)?;
        let file = File::create(path)?;
        Self::write(sheet, file, options)
    }

    /// Write sheet cells into a byte buffer
    pub fn write_to_bytes(sheet: &SheetData, options: &CsvWriteOptions) -> CsvResult<Vec<u8>> {
        let mut buf = Vec::new();
        Self::write(sheet, &mut buf, options)?;
        Ok(buf)
    }

    /// Write sheet cells to a writer
    ///
    /// The dense grid from A1 to the last used cell is written, one record
    /// per row. Only values are written; formulas are dropped. A sheet
    /// reaching past XFD1048576 fails with [`CsvError::TooLarge`].
    pub fn write<W: Write>(sheet: &SheetData, writer: W, options: &CsvWriteOptions) -> CsvResult<()> {
        check_bounds(sheet)?;

        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .from_writer(writer);

        let formulas = sheet.formula_cells().count();
        if formulas > 0 {
            log::warn!("{} formulas are not representable in CSV, writing values only", formulas);
        }

        if let Some(range) = sheet.used_range() {
            // One reusable record; rows are filled straight from the sparse cells
            let mut record = vec![String::new(); range.end.col as usize + 1];
            let mut cells = sheet.iter().peekable();

            for row in 0..=range.end.row {
                record.iter_mut().for_each(String::clear);
                while let Some((coord, cell)) = cells.next_if(|(coord, _)| coord.row == row) {
                    record[coord.col as usize] = cell.value.to_string();
                }
                csv_writer.write_record(&record)?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}

fn check_bounds(sheet: &SheetData) -> CsvResult<()> {
    sheet
        .check_bounds()
        .map_err(|e| CsvError::TooLarge(e.to_string()))
}
