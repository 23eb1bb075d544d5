//! Cell naming and parsing.
//!
//! Every cell in a grid is identified by a fixed-width five character name:
//! a class letter followed by the 1-based row and column, each zero-padded to
//! two digits. `A` cells hold plain decimal input, `B` cells hold hex bytes,
//! references or formulas.
//!
//! # Examples
//!
//! ```
//! use crcgrid_engine::engine::{CellClass, CellName};
//!
//! let name = CellName::from_str("B0106").unwrap();
//! assert_eq!(name.class, CellClass::Formula);
//! assert_eq!(name.row, 1);
//! assert_eq!(name.col, 6);
//! assert_eq!(name.to_string(), "B0106");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a well-formed cell name.
const CELL_NAME_LEN: usize = 5;

/// The two kinds of cell in a grid.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum CellClass {
    /// `A` cells: decimal-only input, never part of a row's byte sequence.
    Decimal,
    /// `B` cells: hex byte, bare reference or formula.
    Formula,
}

impl CellClass {
    pub fn prefix(self) -> char {
        match self {
            CellClass::Decimal => 'A',
            CellClass::Formula => 'B',
        }
    }

    pub fn from_prefix(c: char) -> Option<CellClass> {
        match c.to_ascii_uppercase() {
            'A' => Some(CellClass::Decimal),
            'B' => Some(CellClass::Formula),
            _ => None,
        }
    }
}

/// A cell identified by class, row and column (all 1-based).
///
/// Ordering is class first, then row, then column, so a sorted store lists
/// every `A` cell before any `B` cell.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CellName {
    pub class: CellClass,
    pub row: usize,
    pub col: usize,
}

impl CellName {
    /// Rows and columns above 99 do not fit the two-digit format; the
    /// resulting name is longer than five characters and will not parse back.
    pub fn new(class: CellClass, row: usize, col: usize) -> CellName {
        CellName { class, row, col }
    }

    pub fn decimal(row: usize, col: usize) -> CellName {
        CellName::new(CellClass::Decimal, row, col)
    }

    pub fn formula(row: usize, col: usize) -> CellName {
        CellName::new(CellClass::Formula, row, col)
    }

    /// Parse a name like `A0101` or `b0210`.
    /// Returns None unless the input has exactly the five character shape.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Option<CellName> {
        let bytes = name.as_bytes();
        if bytes.len() != CELL_NAME_LEN {
            return None;
        }
        let class = CellClass::from_prefix(bytes[0] as char)?;
        let row = parse_two_digits(&bytes[1..3])?;
        let col = parse_two_digits(&bytes[3..5])?;
        Some(CellName::new(class, row, col))
    }
}

fn parse_two_digits(digits: &[u8]) -> Option<usize> {
    digits.iter().try_fold(0usize, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + (b - b'0') as usize)
    })
}

impl std::str::FromStr for CellName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellName::from_str(s).ok_or_else(|| format!("Invalid cell name: {}", s))
    }
}

impl TryFrom<String> for CellName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellName> for String {
    fn from(name: CellName) -> String {
        name.to_string()
    }
}

impl fmt::Display for CellName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}{:02}", self.class.prefix(), self.row, self.col)
    }
}
