//! Per-sheet sparse cell storage

use std::collections::BTreeMap;

use crate::cell::{normalize_formula, Cell, CellCoordinate, CellRange, CellStyle, CellValue};
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// The cells of one sheet
///
/// Storage is sparse: a coordinate without an entry is an empty cell, and
/// reads never create entries. Iteration is row-major.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetData {
    cells: BTreeMap<CellCoordinate, Cell>,
}

impl SheetData {
    /// Create an empty sheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if no cell is stored
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    // === Cell Access ===

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<Option<&Cell>> {
        let coord = CellCoordinate::parse(address)?;
        Ok(self.cells.get(&coord))
    }

    /// Get a cell by coordinate
    pub fn cell_at(&self, coord: CellCoordinate) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    /// Get a cell's value, [`CellValue::Empty`] when absent
    pub fn value_at(&self, coord: CellCoordinate) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(&coord).map_or(&EMPTY, |c| &c.value)
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    ///
    /// See [`SheetData::set_value_at`].
    pub fn set_value<V: Into<CellValue>>(
        &mut self,
        address: &str,
        value: V,
        formula: Option<&str>,
    ) -> Result<()> {
        let coord = CellCoordinate::parse(address)?;
        self.set_value_at(coord, value, formula);
        Ok(())
    }

    /// Set a cell value by coordinate
    ///
    /// A provided `formula` replaces the stored one; `None` leaves any stored
    /// formula and style untouched.
    pub fn set_value_at<V: Into<CellValue>>(
        &mut self,
        coord: CellCoordinate,
        value: V,
        formula: Option<&str>,
    ) {
        let cell = self.cells.entry(coord).or_default();
        cell.value = value.into();
        if let Some(f) = formula {
            cell.formula = Some(normalize_formula(f));
        }
    }

    /// Merge a partial style into a cell by address string
    pub fn set_style(&mut self, address: &str, style: &CellStyle) -> Result<()> {
        let coord = CellCoordinate::parse(address)?;
        self.set_style_at(coord, style);
        Ok(())
    }

    /// Merge a partial style into a cell by coordinate
    ///
    /// Creates the cell with an empty value when absent.
    pub fn set_style_at(&mut self, coord: CellCoordinate, style: &CellStyle) {
        let cell = self.cells.entry(coord).or_default();
        cell.style.get_or_insert_with(CellStyle::default).merge(style);
    }

    /// Insert a complete cell, returning the previous one
    pub fn insert(&mut self, coord: CellCoordinate, cell: Cell) -> Option<Cell> {
        self.cells.insert(coord, cell)
    }

    /// Remove a cell, returning it
    pub fn remove_at(&mut self, coord: CellCoordinate) -> Option<Cell> {
        self.cells.remove(&coord)
    }

    /// Remove every cell
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    // === Iteration ===

    /// Iterate over stored cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (CellCoordinate, &Cell)> {
        self.cells.iter().map(|(coord, cell)| (*coord, cell))
    }

    /// Iterate over cells carrying a formula
    pub fn formula_cells(&self) -> impl Iterator<Item = (CellCoordinate, &str)> {
        self.cells
            .iter()
            .filter_map(|(coord, cell)| cell.formula.as_deref().map(|f| (*coord, f)))
    }

    /// Bounding range anchored at A1 and extending to the largest stored row
    /// and column, or `None` for an empty sheet
    pub fn used_range(&self) -> Option<CellRange> {
        let max_row = self.cells.keys().map(|c| c.row).max()?;
        let max_col = self.cells.keys().map(|c| c.col).max()?;
        Some(CellRange::new(
            CellCoordinate::new(0, 0),
            CellCoordinate::new(max_row, max_col),
        ))
    }

    /// Check that every stored cell lies within XFD1048576
    ///
    /// The store itself accepts any `u32` coordinate; containers and dense
    /// grids do not.
    pub fn check_bounds(&self) -> Result<()> {
        match self.used_range() {
            Some(range) if range.end.row >= MAX_ROWS || range.end.col >= MAX_COLS => {
                Err(Error::OutOfBounds(range.end.to_a1_string()))
            }
            _ => Ok(()),
        }
    }

    // === Dense Conversion ===

    /// Dense row-major grid of values covering [`SheetData::used_range`]
    ///
    /// Absent cells are [`CellValue::Empty`]. An empty sheet yields an empty
    /// grid. Fails with [`Error::OutOfBounds`] when the sheet reaches past
    /// XFD1048576 (see [`SheetData::check_bounds`]).
    pub fn to_grid(&self) -> Result<Vec<Vec<CellValue>>> {
        self.check_bounds()?;
        let Some(range) = self.used_range() else {
            return Ok(Vec::new());
        };

        let rows = range.end.row as usize + 1;
        let cols = range.end.col as usize + 1;
        let mut grid = vec![vec![CellValue::Empty; cols]; rows];
        for (coord, cell) in &self.cells {
            grid[coord.row as usize][coord.col as usize] = cell.value.clone();
        }
        Ok(grid)
    }

    /// Build a sheet from a dense row-major grid, omitting empty values
    pub fn from_grid<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = CellValue>,
    {
        let mut sheet = Self::new();
        for (row, values) in rows.into_iter().enumerate() {
            for (col, value) in values.into_iter().enumerate() {
                if !value.is_empty() {
                    sheet.insert(CellCoordinate::new(row as u32, col as u32), Cell::new(value));
                }
            }
        }
        sheet
    }
}

impl FromIterator<(CellCoordinate, Cell)> for SheetData {
    fn from_iter<I: IntoIterator<Item = (CellCoordinate, Cell)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::FontWeight;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reads_do_not_create_entries() {
        let sheet = SheetData::new();
        assert!(sheet.cell("C3").unwrap().is_none());
        assert!(sheet.cell_at(CellCoordinate::new(2, 2)).is_none());
        assert_eq!(sheet.len(), 0);
    }

    #[test]
    fn test_set_value_keeps_formula() {
        let mut sheet = SheetData::new();
        sheet.set_value("B2", 1, Some("=A1+1")).unwrap();
        sheet.set_value("B2", 42, None).unwrap();

        let cell = sheet.cell("B2").unwrap().unwrap();
        assert_eq!(cell.value, CellValue::Number(42.0));
        assert_eq!(cell.formula(), Some("A1+1"));
    }

    #[test]
    fn test_style_on_missing_cell_creates_empty_value() {
        let mut sheet = SheetData::new();
        sheet.set_style("A1", &CellStyle::new().bold()).unwrap();

        let cell = sheet.cell("A1").unwrap().unwrap();
        assert!(cell.value.is_empty());
        assert_eq!(
            cell.style.as_ref().and_then(|s| s.font_weight),
            Some(FontWeight::Bold)
        );
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let mut sheet = SheetData::new();
        assert!(sheet.set_value("a1", 1, None).is_err());
        assert!(sheet.cell("1A").is_err());
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_to_grid_fills_gaps() {
        let mut sheet = SheetData::new();
        sheet.set_value("A1", "Product", None).unwrap();
        sheet.set_value("C2", 5, None).unwrap();

        assert_eq!(
            sheet.to_grid().unwrap(),
            vec![
                vec![CellValue::string("Product"), CellValue::Empty, CellValue::Empty],
                vec![CellValue::Empty, CellValue::Empty, CellValue::Number(5.0)],
            ]
        );
        assert_eq!(sheet.used_range().unwrap().to_string(), "A1:C2");
    }

    #[test]
    fn test_empty_sheet_grid() {
        let sheet = SheetData::new();
        assert!(sheet.to_grid().unwrap().is_empty());
        assert!(sheet.used_range().is_none());
    }

    #[test]
    fn test_grid_past_last_cell_is_rejected() {
        let mut sheet = SheetData::new();
        sheet.set_value_at(CellCoordinate::new(0, u32::MAX), 1, None);
        assert_eq!(
            sheet.to_grid(),
            Err(Error::OutOfBounds(CellCoordinate::new(0, u32::MAX).to_a1_string()))
        );

        let mut sheet = SheetData::new();
        sheet.set_value("XFE1", 1, None).unwrap();
        assert_eq!(sheet.check_bounds(), Err(Error::OutOfBounds("XFE1".into())));

        let mut sheet = SheetData::new();
        sheet.set_value("XFD1", 1, None).unwrap();
        sheet.set_value("A1048576", 1, None).unwrap();
        assert_eq!(sheet.check_bounds(), Ok(()));

        sheet.set_value("A1048577", 1, None).unwrap();
        assert!(sheet.check_bounds().is_err());
    }

    #[test]
    fn test_from_grid_omits_empty() {
        let sheet = SheetData::from_grid(vec![
            vec![CellValue::Empty, CellValue::from(true)],
            vec![CellValue::from("x")],
        ]);

        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.value_at(CellCoordinate::new(0, 1)), &CellValue::Boolean(true));
        assert_eq!(sheet.value_at(CellCoordinate::new(1, 0)), &CellValue::string("x"));
        assert_eq!(sheet.value_at(CellCoordinate::new(0, 0)), &CellValue::Empty);
    }

    #[test]
    fn test_formula_cells() {
        let mut sheet = SheetData::new();
        sheet.set_value("A1", 1, None).unwrap();
        sheet.set_value("A2", 2, Some("A1*2")).unwrap();

        let formulas: Vec<_> = sheet.formula_cells().collect();
        assert_eq!(formulas, vec![(CellCoordinate::new(1, 0), "A1*2")]);
    }
}
