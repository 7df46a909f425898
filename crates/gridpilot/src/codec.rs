//! Format dispatch between the store and the file codecs

use std::path::Path;

use gridpilot_core::{SheetData, Spreadsheet, SpreadsheetData, DEFAULT_SHEET_NAME};
use gridpilot_csv::{CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};
use gridpilot_xlsx::{XlsxReadOptions, XlsxReader, XlsxWriteOptions, XlsxWriter};

use crate::error::{CodecError, CodecResult, Error, Result};
use crate::options::{ExportOptions, FileFormat, ImportOptions};

/// Parse file bytes into spreadsheet data
///
/// The result may hold zero sheets when `sheet_name` selects nothing.
pub fn decode(bytes: &[u8], options: &ImportOptions) -> CodecResult<SpreadsheetData> {
    match options.format {
        FileFormat::Xlsx => {
            let read_options = XlsxReadOptions {
                sheet_name: options.sheet_name.clone(),
                password: options.password.clone(),
            };
            Ok(XlsxReader::read_bytes(bytes, &read_options)?)
        }
        FileFormat::Csv => {
            if options.password.is_some() {
                tracing::warn!("CSV files cannot be password protected, ignoring password");
            }

            // A CSV file is a single sheet named like a fresh workbook's first sheet
            let mut data = SpreadsheetData::empty();
            if let Some(wanted) = options.sheet_name.as_deref() {
                if wanted != DEFAULT_SHEET_NAME {
                    return Ok(data);
                }
            }

            let cells = CsvReader::read(bytes, &CsvReadOptions::default())?;
            data.insert_sheet(DEFAULT_SHEET_NAME, cells)?;
            Ok(data)
        }
    }
}

/// Serialize spreadsheet data to file bytes
pub fn encode(data: &SpreadsheetData, options: &ExportOptions) -> CodecResult<Vec<u8>> {
    match options.format {
        FileFormat::Xlsx => {
            let write_options = XlsxWriteOptions {
                sheet_name: options.sheet_name.clone(),
                password: options.password.clone(),
            };
            Ok(XlsxWriter::write_to_bytes(data, &write_options)?)
        }
        FileFormat::Csv => {
            if options.password.is_some() {
                tracing::warn!("CSV files cannot be password protected, ignoring password");
            }

            let cells = csv_sheet(data, options.sheet_name.as_deref())?;
            Ok(CsvWriter::write_to_bytes(cells, &CsvWriteOptions::default())?)
        }
    }
}

/// The sheet a CSV export writes: the first non-empty selected one
fn csv_sheet<'a>(
    data: &'a SpreadsheetData,
    sheet_name: Option<&str>,
) -> CodecResult<&'a SheetData> {
    let mut candidates = data
        .sheets()
        .filter(|sheet| sheet_name.map_or(true, |wanted| sheet.name() == wanted))
        .filter(|sheet| !sheet.cells().is_empty());

    let sheet = candidates.next().ok_or(CodecError::EmptyWorkbook)?;
    if candidates.next().is_some() {
        tracing::warn!(
            "CSV holds a single sheet, writing '{}' and dropping the rest",
            sheet.name()
        );
    }
    Ok(sheet.cells())
}

fn format_for(path: &Path) -> Result<FileFormat> {
    FileFormat::from_path(path)
        .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))
}

/// Extension trait for [`Spreadsheet`] to add blocking file I/O
///
/// The format follows the file extension. See [`crate::Session`] for the
/// async equivalent with loading state.
pub trait SpreadsheetExt: Sized {
    /// Open a spreadsheet from a file
    fn open<P: AsRef<Path>>(path: P) -> Result<Self>;

    /// Save the spreadsheet to a file
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}

impl SpreadsheetExt for Spreadsheet {
    fn open<P: AsRef<Path>>(path: P) -> Result<Spreadsheet> {
        let path = path.as_ref();
        let options = ImportOptions::new(format_for(path)?);
        let bytes = std::fs::read(path).map_err(|e| Error::Import(e.into()))?;
        let data = decode(&bytes, &options).map_err(Error::Import)?;
        Spreadsheet::with_data(data).map_err(|_| Error::Import(CodecError::NoSheets))
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let options = ExportOptions::new(format_for(path)?);
        let bytes = encode(self.data(), &options).map_err(Error::Export)?;
        std::fs::write(path, bytes).map_err(|e| Error::Export(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpilot_core::CellValue;
    use gridpilot_xlsx::XlsxError;

    fn two_sheets() -> SpreadsheetData {
        let mut data = SpreadsheetData::empty();
        let mut first = SheetData::new();
        first.set_value("A1", "first", None).unwrap();
        let mut second = SheetData::new();
        second.set_value("A1", "second", None).unwrap();
        data.insert_sheet("One", first).unwrap();
        data.insert_sheet("Two", second).unwrap();
        data
    }

    #[test]
    fn test_csv_export_picks_selected_sheet() {
        let options = ExportOptions::new(FileFormat::Csv).with_sheet("Two");
        let bytes = encode(&two_sheets(), &options).unwrap();
        assert_eq!(bytes, b"second\n");

        let bytes = encode(&two_sheets(), &ExportOptions::new(FileFormat::Csv)).unwrap();
        assert_eq!(bytes, b"first\n");
    }

    #[test]
    fn test_csv_export_of_empty_data_fails() {
        let result = encode(&SpreadsheetData::new(), &ExportOptions::new(FileFormat::Csv));
        assert!(matches!(result, Err(CodecError::EmptyWorkbook)));
    }

    #[test]
    fn test_csv_import_is_one_sheet() {
        let data = decode(b"a,1\nb,2\n", &ImportOptions::new(FileFormat::Csv)).unwrap();
        assert_eq!(data.sheet_names(), vec!["Sheet1"]);
        let cells = data.cells("Sheet1").unwrap();
        assert_eq!(cells.cell("B2").unwrap().unwrap().value, CellValue::Number(2.0));

        let other = ImportOptions::new(FileFormat::Csv).with_sheet("Other");
        assert!(decode(b"a,1\n", &other).unwrap().is_empty());
    }

    #[test]
    fn test_xlsx_errors_are_wrapped() {
        let result = decode(b"garbage", &ImportOptions::default());
        assert!(matches!(result, Err(CodecError::Xlsx(XlsxError::Zip(_)))));
    }

    #[test]
    fn test_open_and_save_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut spreadsheet = Spreadsheet::new();
        spreadsheet.set_cell_value("A1", "Product", None).unwrap();
        spreadsheet.set_cell_value("B1", 5, Some("2+3")).unwrap();

        let xlsx = dir.path().join("book.xlsx");
        spreadsheet.save(&xlsx).unwrap();
        let reopened = Spreadsheet::open(&xlsx).unwrap();
        assert_eq!(reopened.snapshot(), spreadsheet.snapshot());

        let unsupported = dir.path().join("book.ods");
        assert!(matches!(
            spreadsheet.save(&unsupported),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
