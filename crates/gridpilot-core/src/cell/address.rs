//! Cell addressing: column letters, A1-style addresses and ranges

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Convert column letters to a zero-based index (A = 0, Z = 25, AA = 26, etc.)
///
/// Letters form a bijective base-26 numeral (A = 1 ... Z = 26), so there is no
/// zero digit. Lowercase letters are accepted and treated as uppercase.
///
/// # Examples
/// ```
/// use gridpilot_core::column_letter_to_index;
///
/// assert_eq!(column_letter_to_index("A").unwrap(), 0);
/// assert_eq!(column_letter_to_index("AZ").unwrap(), 51);
/// assert!(column_letter_to_index("A1").is_err());
/// ```
pub fn column_letter_to_index(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidAddress("empty column letters".into()));
    }

    let mut col: u64 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidAddress(format!(
                "invalid column letter '{}' in '{}'",
                c, letters
            )));
        }
        col = col * 26 + (c.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
        if col > u32::MAX as u64 + 1 {
            return Err(Error::InvalidAddress(format!(
                "column '{}' is out of range",
                letters
            )));
        }
    }

    Ok((col - 1) as u32)
}

/// Convert a zero-based column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
pub fn index_to_column_letter(index: u32) -> String {
    let mut result = String::new();
    let mut n = index as u64 + 1; // 1-based for calculation

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Parse a canonical address such as `"B12"` into a zero-based coordinate
pub fn cell_address_to_coordinate(address: &str) -> Result<CellCoordinate> {
    CellCoordinate::parse(address)
}

/// Format a zero-based coordinate as its canonical address
pub fn coordinate_to_cell_address(coord: CellCoordinate) -> String {
    coord.to_a1_string()
}

/// A zero-based cell position
///
/// Coordinates order row-major: every cell of row `n` sorts before row `n + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellCoordinate {
    /// Row index (0-based internally, 1-based in addresses)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ...)
    pub col: u32,
}

impl CellCoordinate {
    /// Create a new coordinate
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Build a coordinate from signed components, as received from outer layers
    ///
    /// Fails with [`Error::InvalidCoordinate`] when either component is
    /// negative or does not fit the addressable range.
    pub fn try_from_signed(row: i64, col: i64) -> Result<Self> {
        match (u32::try_from(row), u32::try_from(col)) {
            (Ok(row), Ok(col)) => Ok(Self { row, col }),
            _ => Err(Error::InvalidCoordinate { row, col }),
        }
    }

    /// Parse a canonical A1-style address
    ///
    /// Only the canonical form is accepted: uppercase column letters followed
    /// by a 1-based row number without leading zeros.
    ///
    /// # Examples
    /// ```
    /// use gridpilot_core::CellCoordinate;
    ///
    /// let coord = CellCoordinate::parse("B12").unwrap();
    /// assert_eq!(coord, CellCoordinate::new(11, 1));
    ///
    /// assert!(CellCoordinate::parse("b12").is_err());
    /// assert!(CellCoordinate::parse("A0").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let letters_end = bytes
            .iter()
            .position(|b| !b.is_ascii_uppercase())
            .unwrap_or(bytes.len());

        if letters_end == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let row_str = &s[letters_end..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        if !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                s
            )));
        }
        if row_str.starts_with('0') {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 without leading zeros in '{}'",
                s
            )));
        }

        let row: u64 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("row number out of range in '{}'", s)))?;
        if row > u32::MAX as u64 + 1 {
            return Err(Error::InvalidAddress(format!(
                "row number out of range in '{}'",
                s
            )));
        }

        let col = column_letter_to_index(&s[..letters_end])?;

        Ok(Self {
            row: (row - 1) as u32,
            col,
        })
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!(
            "{}{}",
            index_to_column_letter(self.col),
            self.row as u64 + 1
        )
    }
}

impl fmt::Display for CellCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellCoordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<(u32, u32)> for CellCoordinate {
    fn from((row, col): (u32, u32)) -> Self {
        Self { row, col }
    }
}

/// A rectangular range of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Start coordinate (top-left)
    pub start: CellCoordinate,
    /// End coordinate (bottom-right)
    pub end: CellCoordinate,
}

impl CellRange {
    /// Create a new cell range
    pub fn new(start: CellCoordinate, end: CellCoordinate) -> Self {
        // Normalize so start is top-left and end is bottom-right
        Self {
            start: CellCoordinate::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellCoordinate::new(start.row.max(end.row), start.col.max(end.col)),
        }
    }

    /// Create a single-cell range
    pub fn single(coord: CellCoordinate) -> Self {
        Self {
            start: coord,
            end: coord,
        }
    }

    /// Parse a range from A1:B10 notation
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((start, end)) => Ok(Self::new(
                CellCoordinate::parse(start)?,
                CellCoordinate::parse(end)?,
            )),
            None => Ok(Self::single(CellCoordinate::parse(s)?)),
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, coord: &CellCoordinate) -> bool {
        coord.row >= self.start.row
            && coord.row <= self.end.row
            && coord.col >= self.start.col
            && coord.col <= self.end.col
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u64 {
        (self.end.row - self.start.row) as u64 + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u64 {
        (self.end.col - self.start.col) as u64 + 1
    }

    /// Iterate over all cell coordinates in the range (row by row)
    pub fn cells(&self) -> impl Iterator<Item = CellCoordinate> {
        let range = *self;
        (range.start.row..=range.end.row).flat_map(move |row| {
            (range.start.col..=range.end.col).map(move |col| CellCoordinate::new(row, col))
        })
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start, self.end)
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_to_column_letter() {
        assert_eq!(index_to_column_letter(0), "A");
        assert_eq!(index_to_column_letter(1), "B");
        assert_eq!(index_to_column_letter(25), "Z");
        assert_eq!(index_to_column_letter(26), "AA");
        assert_eq!(index_to_column_letter(27), "AB");
        assert_eq!(index_to_column_letter(51), "AZ");
        assert_eq!(index_to_column_letter(701), "ZZ");
        assert_eq!(index_to_column_letter(702), "AAA");
        assert_eq!(index_to_column_letter(16383), "XFD");
    }

    #[test]
    fn test_column_letter_to_index() {
        assert_eq!(column_letter_to_index("A").unwrap(), 0);
        assert_eq!(column_letter_to_index("Z").unwrap(), 25);
        assert_eq!(column_letter_to_index("AA").unwrap(), 26);
        assert_eq!(column_letter_to_index("AZ").unwrap(), 51);
        assert_eq!(column_letter_to_index("ZZ").unwrap(), 701);
        assert_eq!(column_letter_to_index("XFD").unwrap(), 16383);

        // Normalized internally
        assert_eq!(column_letter_to_index("aa").unwrap(), 26);
    }

    #[test]
    fn test_column_letter_to_index_errors() {
        assert!(matches!(
            column_letter_to_index(""),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            column_letter_to_index("A-"),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            column_letter_to_index("É"),
            Err(Error::InvalidAddress(_))
        ));
        // Far beyond u32
        assert!(column_letter_to_index("ZZZZZZZZZZ").is_err());
    }

    #[test]
    fn test_column_extremes_roundtrip() {
        let letters = index_to_column_letter(u32::MAX);
        assert_eq!(column_letter_to_index(&letters).unwrap(), u32::MAX);
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(
            cell_address_to_coordinate("A1").unwrap(),
            CellCoordinate::new(0, 0)
        );
        assert_eq!(
            cell_address_to_coordinate("B12").unwrap(),
            CellCoordinate::new(11, 1)
        );
        assert_eq!(
            cell_address_to_coordinate("AA12").unwrap(),
            CellCoordinate::new(11, 26)
        );
    }

    #[test]
    fn test_parse_address_errors() {
        for bad in ["", "A", "1", "a1", "A0", "A01", "$A$1", " A1", "A1 ", "A1B", "A-1"] {
            assert!(
                matches!(CellCoordinate::parse(bad), Err(Error::InvalidAddress(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
        // Row beyond u32
        assert!(CellCoordinate::parse("A99999999999").is_err());
    }

    #[test]
    fn test_coordinate_display() {
        assert_eq!(coordinate_to_cell_address(CellCoordinate::new(0, 0)), "A1");
        assert_eq!(CellCoordinate::new(99, 2).to_string(), "C100");
        assert_eq!(
            CellCoordinate::new(u32::MAX, 0).to_string(),
            format!("A{}", u32::MAX as u64 + 1)
        );
    }

    #[test]
    fn test_try_from_signed() {
        assert_eq!(
            CellCoordinate::try_from_signed(3, 4).unwrap(),
            CellCoordinate::new(3, 4)
        );
        assert_eq!(
            CellCoordinate::try_from_signed(-1, 0),
            Err(Error::InvalidCoordinate { row: -1, col: 0 })
        );
        assert!(CellCoordinate::try_from_signed(0, -5).is_err());
        assert!(CellCoordinate::try_from_signed(i64::MAX, 0).is_err());
    }

    #[test]
    fn test_row_major_ordering() {
        let mut coords = vec![
            CellCoordinate::new(1, 0),
            CellCoordinate::new(0, 5),
            CellCoordinate::new(0, 1),
        ];
        coords.sort();
        assert_eq!(
            coords,
            vec![
                CellCoordinate::new(0, 1),
                CellCoordinate::new(0, 5),
                CellCoordinate::new(1, 0),
            ]
        );
    }

    #[test]
    fn test_cell_range_parse() {
        let range = CellRange::parse("A1:B2").unwrap();
        assert_eq!(range.start, CellCoordinate::new(0, 0));
        assert_eq!(range.end, CellCoordinate::new(1, 1));

        // Reversed corners are normalized
        let range = CellRange::parse("B2:A1").unwrap();
        assert_eq!(range.start, CellCoordinate::new(0, 0));

        let range = CellRange::parse("C3").unwrap();
        assert_eq!(range, CellRange::single(CellCoordinate::new(2, 2)));
        assert_eq!(range.to_string(), "C3");
    }

    #[test]
    fn test_cell_range_cells() {
        let range = CellRange::parse("A1:B2").unwrap();
        let cells: Vec<_> = range.cells().collect();

        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0], CellCoordinate::new(0, 0)); // A1
        assert_eq!(cells[1], CellCoordinate::new(0, 1)); // B1
        assert_eq!(cells[2], CellCoordinate::new(1, 0)); // A2
        assert_eq!(cells[3], CellCoordinate::new(1, 1)); // B2
        assert!(range.contains(&CellCoordinate::new(1, 1)));
        assert!(!range.contains(&CellCoordinate::new(2, 0)));
        assert_eq!(range.row_count(), 2);
        assert_eq!(range.col_count(), 2);
    }
}
