//! The spreadsheet store: cell operations on the active sheet and the sheet
//! lifecycle

use crate::cell::{Cell, CellCoordinate, CellStyle, CellValue};
use crate::error::{Error, Result};
use crate::sheet::SheetData;
use crate::workbook::{Sheet, SpreadsheetData};

/// An editable spreadsheet with an active sheet
///
/// The store owns its [`SpreadsheetData`] and guarantees that at least one
/// sheet exists and that the active sheet is always one of them. Cell
/// operations without a sheet name apply to the active sheet; use
/// [`Spreadsheet::sheet`] / [`Spreadsheet::sheet_mut`] to address another.
///
/// A failed operation leaves the store unchanged.
///
/// # Example
/// ```
/// use gridpilot_core::{CellStyle, Spreadsheet};
///
/// let mut sheet = Spreadsheet::new();
/// sheet.set_cell_value("A1", "Product", None).unwrap();
/// sheet.set_cell_value("B1", 5, None).unwrap();
/// sheet.set_cell_style("A1", &CellStyle::new().bold()).unwrap();
///
/// sheet.add_sheet("Totals").unwrap();
/// assert_eq!(sheet.active_sheet(), "Totals");
/// ```
#[derive(Debug, Clone)]
pub struct Spreadsheet {
    data: SpreadsheetData,
    /// Index into `data`, always in bounds
    active: usize,
}

impl Spreadsheet {
    /// Create a spreadsheet with a single empty `Sheet1`
    pub fn new() -> Self {
        Self {
            data: SpreadsheetData::new(),
            active: 0,
        }
    }

    /// Create a spreadsheet from existing data, activating its first sheet
    pub fn with_data(data: SpreadsheetData) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::EmptyWorkbook);
        }
        Ok(Self { data, active: 0 })
    }

    /// Replace all data (e.g. after an import) and activate the first sheet
    ///
    /// Fails with [`Error::EmptyWorkbook`] and keeps the current data when
    /// `data` has no sheets.
    pub fn replace(&mut self, data: SpreadsheetData) -> Result<()> {
        if data.is_empty() {
            return Err(Error::EmptyWorkbook);
        }
        self.data = data;
        self.active = 0;
        Ok(())
    }

    /// Borrow the underlying data
    pub fn data(&self) -> &SpreadsheetData {
        &self.data
    }

    /// Take a snapshot of the data
    ///
    /// Cells are shared with the store until the store next writes to a
    /// sheet, so later edits never show up in the snapshot.
    pub fn snapshot(&self) -> SpreadsheetData {
        self.data.clone()
    }

    /// Consume the store, returning its data
    pub fn into_data(self) -> SpreadsheetData {
        self.data
    }

    // === Active Sheet ===

    /// Name of the active sheet
    pub fn active_sheet(&self) -> &str {
        self.active_entry().name()
    }

    /// Select the active sheet
    pub fn set_active_sheet(&mut self, name: &str) -> Result<()> {
        self.active = self.index_of(name)?;
        Ok(())
    }

    /// Cells of the active sheet
    pub fn active_sheet_data(&self) -> &SheetData {
        self.active_entry().cells()
    }

    fn active_entry(&self) -> &Sheet {
        self.data
            .sheet_at(self.active)
            .expect("active sheet index is always in bounds")
    }

    fn active_cells_mut(&mut self) -> &mut SheetData {
        self.data
            .sheet_at_mut(self.active)
            .expect("active sheet index is always in bounds")
            .cells_mut()
    }

    // === Cell Store ===

    /// Look up a cell on the active sheet by address; never creates an entry
    pub fn get_cell(&self, address: &str) -> Result<Option<&Cell>> {
        self.active_sheet_data().cell(address)
    }

    /// Look up a cell on the active sheet by coordinate
    pub fn get_cell_at(&self, coord: CellCoordinate) -> Option<&Cell> {
        self.active_sheet_data().cell_at(coord)
    }

    /// Write a value on the active sheet
    ///
    /// `Some(formula)` replaces the stored formula; `None` leaves it as is.
    pub fn set_cell_value<V: Into<CellValue>>(
        &mut self,
        address: &str,
        value: V,
        formula: Option<&str>,
    ) -> Result<()> {
        let coord = CellCoordinate::parse(address)?;
        self.set_cell_value_at(coord, value, formula);
        Ok(())
    }

    /// Write a value on the active sheet by coordinate
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        coord: CellCoordinate,
        value: V,
        formula: Option<&str>,
    ) {
        self.active_cells_mut().set_value_at(coord, value, formula);
    }

    /// Merge a partial style into a cell on the active sheet
    pub fn set_cell_style(&mut self, address: &str, style: &CellStyle) -> Result<()> {
        let coord = CellCoordinate::parse(address)?;
        self.set_cell_style_at(coord, style);
        Ok(())
    }

    /// Merge a partial style into a cell on the active sheet by coordinate
    pub fn set_cell_style_at(&mut self, coord: CellCoordinate, style: &CellStyle) {
        self.active_cells_mut().set_style_at(coord, style);
    }

    /// Cells of a named sheet
    pub fn sheet(&self, name: &str) -> Result<&SheetData> {
        self.data
            .cells(name)
            .ok_or_else(|| Error::UnknownSheet(name.to_string()))
    }

    /// Writable cells of a named sheet
    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut SheetData> {
        self.data
            .sheet_mut(name)
            .map(Sheet::cells_mut)
            .ok_or_else(|| Error::UnknownSheet(name.to_string()))
    }

    /// Dense value grid of a sheet (the active one when `name` is `None`)
    ///
    /// This is a detached copy suitable for handing to collaborators. Fails
    /// with [`Error::OutOfBounds`] for a sheet reaching past XFD1048576.
    pub fn grid_snapshot(&self, name: Option<&str>) -> Result<Vec<Vec<CellValue>>> {
        match name {
            Some(name) => self.sheet(name)?.to_grid(),
            None => self.active_sheet_data().to_grid(),
        }
    }

    // === Sheet Lifecycle ===

    /// Sheet names in order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.data.sheet_names()
    }

    /// Number of sheets
    pub fn sheet_count(&self) -> usize {
        self.data.sheet_count()
    }

    /// Add an empty sheet and make it active
    pub fn add_sheet(&mut self, name: &str) -> Result<()> {
        self.data.push_sheet(Sheet::new(name))?;
        self.active = self.data.sheet_count() - 1;
        Ok(())
    }

    /// Remove a sheet
    ///
    /// The last remaining sheet cannot be removed. When the active sheet is
    /// removed, the first remaining sheet becomes active.
    pub fn remove_sheet(&mut self, name: &str) -> Result<()> {
        let index = self.index_of(name)?;
        if self.data.sheet_count() <= 1 {
            return Err(Error::LastSheet(name.to_string()));
        }

        self.data.remove_sheet(name);

        if index == self.active {
            self.active = 0;
        } else if index < self.active {
            self.active -= 1;
        }
        Ok(())
    }

    /// Rename a sheet in place
    ///
    /// Renaming a sheet to its own name fails with [`Error::DuplicateSheet`].
    /// The active selection follows the sheet.
    pub fn rename_sheet(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let index = self.index_of(old_name)?;
        if self.data.contains(new_name) {
            return Err(Error::DuplicateSheet(new_name.to_string()));
        }
        if new_name.is_empty() {
            return Err(Error::InvalidSheetName("sheet name cannot be empty".into()));
        }

        if let Some(sheet) = self.data.sheet_at_mut(index) {
            sheet.set_name(new_name);
        }
        Ok(())
    }

    /// Remove every cell of a named sheet, keeping the sheet
    pub fn clear_sheet(&mut self, name: &str) -> Result<()> {
        self.data
            .sheet_mut(name)
            .ok_or_else(|| Error::UnknownSheet(name.to_string()))?
            .clear();
        Ok(())
    }

    /// Remove every cell of the active sheet
    pub fn clear_active_sheet(&mut self) {
        if let Some(sheet) = self.data.sheet_at_mut(self.active) {
            sheet.clear();
        }
    }

    /// Remove every cell of every sheet, keeping sheets and the selection
    pub fn clear_all(&mut self) {
        for sheet in self.data.sheets_mut() {
            sheet.clear();
        }
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.data
            .sheet_index(name)
            .ok_or_else(|| Error::UnknownSheet(name.to_string()))
    }
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<SpreadsheetData> for Spreadsheet {
    type Error = Error;

    fn try_from(data: SpreadsheetData) -> Result<Self> {
        Self::with_data(data)
    }
}
