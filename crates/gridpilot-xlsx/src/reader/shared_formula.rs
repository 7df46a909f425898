//! Shared formula expansion
//!
//! Excel stores a filled formula once, on the top-left cell of its range:
//! `<f t="shared" ref="B1:B3" si="0">A1*2</f>`. The other cells only carry
//! `<f t="shared" si="0"/>` and take the anchor's text with relative
//! references moved by their offset from the anchor.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use gridpilot_core::{column_letter_to_index, index_to_column_letter, CellCoordinate, MAX_COLS, MAX_ROWS};

static CELL_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\$?)([A-Z]{1,3})(\$?)([1-9][0-9]{0,6})").expect("valid cell reference pattern")
});

/// Anchor of a shared formula group
#[derive(Debug, Clone)]
pub(crate) struct SharedFormula {
    anchor: CellCoordinate,
    text: String,
}

impl SharedFormula {
    pub(crate) fn new(anchor: CellCoordinate, text: String) -> Self {
        Self { anchor, text }
    }

    /// The group's formula as it reads at `coord`
    pub(crate) fn formula_at(&self, coord: CellCoordinate) -> String {
        let rows = i64::from(coord.row) - i64::from(self.anchor.row);
        let cols = i64::from(coord.col) - i64::from(self.anchor.col);
        shift_formula(&self.text, rows, cols)
    }
}

/// Move the relative cell references of a formula by `rows` and `cols`
///
/// `$`-anchored parts stay put. Text inside string literals and quoted sheet
/// names is left alone. A reference pushed off the sheet becomes `#REF!`.
pub(crate) fn shift_formula(formula: &str, rows: i64, cols: i64) -> String {
    if rows == 0 && cols == 0 {
        return formula.to_string();
    }

    let mut result = String::with_capacity(formula.len());
    let mut start = 0;
    let mut quote = None;

    for (i, ch) in formula.char_indices() {
        match quote {
            None if ch == '"' || ch == '\'' => {
                result.push_str(&shift_references(&formula[start..i], rows, cols));
                start = i;
                quote = Some(ch);
            }
            // A doubled quote closes and immediately reopens
            Some(q) if ch == q => {
                result.push_str(&formula[start..=i]);
                start = i + 1;
                quote = None;
            }
            _ => {}
        }
    }

    match quote {
        None => result.push_str(&shift_references(&formula[start..], rows, cols)),
        Some(_) => result.push_str(&formula[start..]),
    }
    result
}

fn shift_references(text: &str, rows: i64, cols: i64) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last = 0;

    for caps in CELL_REF.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if !is_standalone(text, whole.start(), whole.end()) {
            continue;
        }
        let Some(shifted) = shift_reference(&caps, rows, cols) else {
            continue;
        };

        result.push_str(&text[last..whole.start()]);
        result.push_str(&shifted);
        last = whole.end();
    }

    result.push_str(&text[last..]);
    result
}

/// A match is a reference only when it is not part of a longer name, a
/// number, or a function call such as `LOG10(`
fn is_standalone(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();

    let joined_before = before.is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.'));
    let joined_after =
        after.is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '(' | '!'));
    !joined_before && !joined_after
}

/// `None` when the match is not an addressable cell (a name like `XFE1`)
fn shift_reference(caps: &Captures<'_>, rows: i64, cols: i64) -> Option<String> {
    let col_anchor = &caps[1];
    let row_anchor = &caps[3];
    let col = column_letter_to_index(&caps[2]).ok()?;
    let row: u32 = caps[4].parse().ok()?;
    if col >= MAX_COLS || row > MAX_ROWS {
        return None;
    }

    let col = if col_anchor.is_empty() {
        i64::from(col) + cols
    } else {
        i64::from(col)
    };
    let row = if row_anchor.is_empty() {
        i64::from(row) + rows
    } else {
        i64::from(row)
    };

    if !(0..i64::from(MAX_COLS)).contains(&col) || !(1..=i64::from(MAX_ROWS)).contains(&row) {
        return Some("#REF!".to_string());
    }

    Some(format!(
        "{}{}{}{}",
        col_anchor,
        index_to_column_letter(col as u32),
        row_anchor,
        row
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shift_relative_references() {
        assert_eq!(shift_formula("A1*2", 1, 0), "A2*2");
        assert_eq!(shift_formula("SUM(A1:B2)", 2, 1), "SUM(B3:C4)");
        assert_eq!(shift_formula("Z1+AA1", 0, 1), "AA1+AB1");
    }

    #[test]
    fn test_anchored_parts_stay() {
        assert_eq!(shift_formula("$A$1+A1", 3, 3), "$A$1+D4");
        assert_eq!(shift_formula("$A1*B$1", 1, 1), "$A2*C$1");
    }

    #[test]
    fn test_names_functions_and_literals_are_untouched() {
        assert_eq!(shift_formula("LOG10(A1)", 1, 0), "LOG10(A2)");
        assert_eq!(shift_formula(r#"IF(A1="B2","C3",D4)"#, 1, 0), r#"IF(A2="B2","C3",D5)"#);
        assert_eq!(shift_formula(r#""say ""A1"""&A1"#, 1, 0), r#""say ""A1"""&A2"#);
        assert_eq!(shift_formula("'Q1 2024'!B2+Data!B2", 1, 0), "'Q1 2024'!B3+Data!B3");
        assert_eq!(shift_formula("rate_A1+XFE1", 1, 0), "rate_A1+XFE1");
    }

    #[test]
    fn test_reference_off_the_sheet() {
        assert_eq!(shift_formula("A2-A1", -1, 0), "A1-#REF!");
        assert_eq!(shift_formula("B1", 0, -2), "#REF!");
    }

    #[test]
    fn test_formula_at_offset_from_anchor() {
        let group = SharedFormula::new(CellCoordinate::new(0, 1), "A1*2".to_string());
        assert_eq!(group.formula_at(CellCoordinate::new(0, 1)), "A1*2");
        assert_eq!(group.formula_at(CellCoordinate::new(2, 1)), "A3*2");
        assert_eq!(group.formula_at(CellCoordinate::new(0, 3)), "C1*2");
    }
}
