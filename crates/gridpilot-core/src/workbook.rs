//! Named sheets in insertion order

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::sheet::SheetData;

/// Name of the sheet a fresh spreadsheet starts with
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// A named sheet
///
/// Cell data sits behind an [`Arc`]: cloning a sheet (or a whole
/// [`SpreadsheetData`]) shares cells, and the first write after a clone copies
/// only the sheet being written.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    cells: Arc<SheetData>,
}

impl Sheet {
    /// Create an empty sheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self::with_cells(name, SheetData::new())
    }

    /// Create a sheet holding existing cells
    pub fn with_cells<S: Into<String>>(name: S, cells: SheetData) -> Self {
        Self {
            name: name.into(),
            cells: Arc::new(cells),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Get the cells
    pub fn cells(&self) -> &SheetData {
        &self.cells
    }

    /// Get the cells for writing, detaching them from any snapshot
    pub fn cells_mut(&mut self) -> &mut SheetData {
        Arc::make_mut(&mut self.cells)
    }

    /// Replace the cells with an empty map
    pub fn clear(&mut self) {
        self.cells = Arc::new(SheetData::new());
    }
}

/// Sheet name → sheet data, in insertion order
///
/// Names are unique and compared case-sensitively. This is the plain data
/// exchanged with the import/export codecs; the at-least-one-sheet rule is
/// enforced by [`crate::Spreadsheet`], not here, because an import may select
/// zero sheets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpreadsheetData {
    sheets: Vec<Sheet>,
}

impl SpreadsheetData {
    /// Create data holding a single empty `Sheet1`
    pub fn new() -> Self {
        Self {
            sheets: vec![Sheet::new(DEFAULT_SHEET_NAME)],
        }
    }

    /// Create data with no sheets
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if there are no sheets
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Check whether a sheet exists
    pub fn contains(&self, name: &str) -> bool {
        self.sheet_index(name).is_some()
    }

    /// Get the position of a sheet by name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name() == name)
    }

    /// Get a sheet by name
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    /// Get a mutable sheet by name
    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    /// Get a sheet's cells by name
    pub fn cells(&self, name: &str) -> Option<&SheetData> {
        self.sheet(name).map(Sheet::cells)
    }

    /// Iterate over sheets in order
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    pub(crate) fn sheet_at(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub(crate) fn sheet_at_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    pub(crate) fn sheets_mut(&mut self) -> impl Iterator<Item = &mut Sheet> {
        self.sheets.iter_mut()
    }

    /// Sheet names in order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Sheet::name).collect()
    }

    /// Name of the first sheet
    pub fn first_sheet_name(&self) -> Option<&str> {
        self.sheets.first().map(Sheet::name)
    }

    /// Append a sheet
    ///
    /// Fails with [`Error::DuplicateSheet`] when the name is taken and
    /// [`Error::InvalidSheetName`] when it is empty.
    pub fn push_sheet(&mut self, sheet: Sheet) -> Result<()> {
        if sheet.name().is_empty() {
            return Err(Error::InvalidSheetName("sheet name cannot be empty".into()));
        }
        if self.contains(sheet.name()) {
            return Err(Error::DuplicateSheet(sheet.name().to_string()));
        }
        self.sheets.push(sheet);
        Ok(())
    }

    /// Append a sheet built from a name and its cells
    pub fn insert_sheet<S: Into<String>>(&mut self, name: S, cells: SheetData) -> Result<()> {
        self.push_sheet(Sheet::with_cells(name, cells))
    }

    /// Remove a sheet by name, returning it
    pub fn remove_sheet(&mut self, name: &str) -> Option<Sheet> {
        let index = self.sheet_index(name)?;
        Some(self.sheets.remove(index))
    }
}
