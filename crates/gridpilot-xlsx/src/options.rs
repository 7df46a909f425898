//! XLSX options

/// File name used when an export does not name its output
pub const DEFAULT_FILE_NAME: &str = "spreadsheet.xlsx";

/// Options for reading XLSX files
#[derive(Debug, Clone, Default)]
pub struct XlsxReadOptions {
    /// Read only this sheet; a name missing from the workbook selects nothing
    pub sheet_name: Option<String>,
    /// Password checked against the workbook protection hash
    pub password: Option<String>,
}

impl XlsxReadOptions {
    /// Restrict the import to one sheet
    pub fn with_sheet<S: Into<String>>(mut self, name: S) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    /// Supply the workbook password
    pub fn with_password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// Options for writing XLSX files
#[derive(Debug, Clone, Default)]
pub struct XlsxWriteOptions {
    /// Write only this sheet; a name missing from the data selects nothing
    pub sheet_name: Option<String>,
    /// Protect the workbook structure with this password
    pub password: Option<String>,
}

impl XlsxWriteOptions {
    /// Restrict the export to one sheet
    pub fn with_sheet<S: Into<String>>(mut self, name: S) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    /// Protect the written workbook with a password
    pub fn with_password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// Treat an empty password the same as no password
pub(crate) fn effective_password(password: Option<&str>) -> Option<&str> {
    password.filter(|p| !p.is_empty())
}
