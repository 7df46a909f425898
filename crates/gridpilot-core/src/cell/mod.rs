//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`CellCoordinate`] - A cell's location, convertible to and from "A1"
//! - [`CellRange`] - A rectangular range of cells (e.g., "A1:B10")
//! - [`CellStyle`] - Presentational attributes
//! - [`Cell`] - Complete cell data: value, optional formula, optional style

mod address;
mod style;
mod value;

pub use address::{
    cell_address_to_coordinate, column_letter_to_index, coordinate_to_cell_address,
    index_to_column_letter, CellCoordinate, CellRange,
};
pub use style::{CellStyle, FontStyle, FontWeight, TextAlign, TextDecoration};
pub use value::CellValue;

/// A stored cell
///
/// `formula` is opaque text kept without its leading `=`; it is never
/// evaluated and never derived from `value`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub value: CellValue,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub formula: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub style: Option<CellStyle>,
}

impl Cell {
    /// Create a cell holding a value
    pub fn new<V: Into<CellValue>>(value: V) -> Self {
        Self {
            value: value.into(),
            formula: None,
            style: None,
        }
    }

    /// Attach formula text (a leading `=` is dropped)
    pub fn with_formula<S: AsRef<str>>(mut self, formula: S) -> Self {
        self.formula = Some(normalize_formula(formula.as_ref()));
        self
    }

    /// Attach a style
    pub fn with_style(mut self, style: CellStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Get the formula text, if any
    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }
}

/// Strip the leading `=` that UI input and some containers carry
pub(crate) fn normalize_formula(formula: &str) -> String {
    formula.strip_prefix('=').unwrap_or(formula).to_string()
}
