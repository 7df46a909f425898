//! Import and export options

use std::path::Path;

use serde::{Deserialize, Serialize};

use gridpilot_xlsx::DEFAULT_FILE_NAME;

/// Spreadsheet file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Office Open XML workbook
    #[default]
    Xlsx,
    /// Comma-separated values, a single sheet
    Csv,
}

impl FileFormat {
    /// Guess the format from a path's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => Some(FileFormat::Xlsx),
            Some("csv") => Some(FileFormat::Csv),
            _ => None,
        }
    }

    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Xlsx => "xlsx",
            FileFormat::Csv => "csv",
        }
    }

    /// Name used when an export does not name its file
    pub fn default_file_name(self) -> &'static str {
        match self {
            FileFormat::Xlsx => DEFAULT_FILE_NAME,
            FileFormat::Csv => "spreadsheet.csv",
        }
    }
}

/// Options for importing a file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    pub format: FileFormat,
    /// Import only this sheet; a name the file lacks imports nothing
    pub sheet_name: Option<String>,
    /// Workbook password (xlsx only)
    pub password: Option<String>,
}

impl ImportOptions {
    pub fn new(format: FileFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    pub fn with_sheet<S: Into<String>>(mut self, name: S) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    pub fn with_password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// Options for exporting a file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: FileFormat,
    /// Export only this sheet
    pub sheet_name: Option<String>,
    /// Protect the workbook with this password (xlsx only)
    pub password: Option<String>,
    /// Output file name; defaults to `spreadsheet.<ext>`
    pub file_name: Option<String>,
}

impl ExportOptions {
    pub fn new(format: FileFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    pub fn with_sheet<S: Into<String>>(mut self, name: S) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    pub fn with_password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_file_name<S: Into<String>>(mut self, name: S) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// The file name an export writes to
    pub fn file_name(&self) -> &str {
        self.file_name
            .as_deref()
            .unwrap_or_else(|| self.format.default_file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(FileFormat::from_path("book.XLSX"), Some(FileFormat::Xlsx));
        assert_eq!(FileFormat::from_path("/tmp/data.csv"), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_path("notes.txt"), None);
        assert_eq!(FileFormat::from_path("no_extension"), None);
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(ExportOptions::default().file_name(), "spreadsheet.xlsx");
        assert_eq!(ExportOptions::new(FileFormat::Csv).file_name(), "spreadsheet.csv");
        assert_eq!(
            ExportOptions::default().with_file_name("q3.xlsx").file_name(),
            "q3.xlsx"
        );
    }

    #[test]
    fn test_format_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FileFormat::Csv).unwrap(), "\"csv\"");
    }
}
