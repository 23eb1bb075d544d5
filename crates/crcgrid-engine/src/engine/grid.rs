//! Grid configuration: how many rows and columns of each class exist.
//!
//! Counts are always clamped into their valid range on construction, so a
//! [`GridConfig`] value never describes an impossible grid.

use serde::{Deserialize, Serialize};

use super::cell_name::{CellClass, CellName};
use super::crc::CrcOrder;

pub const MIN_ROWS: usize = 1;
pub const MAX_ROWS: usize = 30;
pub const MIN_DEC_COLS: usize = 0;
pub const MAX_DEC_COLS: usize = 4;
pub const MIN_HEX_COLS: usize = 1;
pub const MAX_HEX_COLS: usize = 20;

pub const DEFAULT_ROWS: usize = 1;
pub const DEFAULT_DEC_COLS: usize = 0;
pub const DEFAULT_HEX_COLS: usize = 6;

/// Shape of the grid and the CRC byte order used for every row.
///
/// Deserialization goes through [`GridConfig::new`], so counts read from a
/// file are clamped as well.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "GridParams")]
pub struct GridConfig {
    pub rows: usize,
    pub dec_cols: usize,
    pub hex_cols: usize,
    pub crc_order: CrcOrder,
}

impl GridConfig {
    /// Build a configuration, clamping each count into range.
    pub fn new(rows: usize, dec_cols: usize, hex_cols: usize, crc_order: CrcOrder) -> GridConfig {
        GridConfig {
            rows: clamp_rows(rows),
            dec_cols: clamp_dec_cols(dec_cols),
            hex_cols: clamp_hex_cols(hex_cols),
            crc_order,
        }
    }

    /// Whether `name` exists under this configuration.
    pub fn contains(&self, name: &CellName) -> bool {
        let cols = match name.class {
            CellClass::Decimal => self.dec_cols,
            CellClass::Formula => self.hex_cols,
        };
        (1..=self.rows).contains(&name.row) && (1..=cols).contains(&name.col)
    }

    /// Decimal (`A`) cell names, row-major.
    pub fn decimal_cells(&self) -> impl Iterator<Item = CellName> + '_ {
        (1..=self.rows)
            .flat_map(move |row| (1..=self.dec_cols).map(move |col| CellName::decimal(row, col)))
    }

    /// Formula (`B`) cell names, row-major.
    pub fn formula_cells(&self) -> impl Iterator<Item = CellName> + '_ {
        (1..=self.rows).flat_map(move |row| self.row_cells(row))
    }

    /// The formula cells making up one row, in column order.
    pub fn row_cells(&self, row: usize) -> impl Iterator<Item = CellName> + '_ {
        (1..=self.hex_cols).map(move |col| CellName::formula(row, col))
    }
}

/// Unchecked counts as they appear in serialized form.
#[derive(Deserialize)]
#[serde(default)]
struct GridParams {
    rows: usize,
    dec_cols: usize,
    hex_cols: usize,
    crc_order: CrcOrder,
}

impl Default for GridParams {
    fn default() -> Self {
        let grid = GridConfig::default();
        GridParams {
            rows: grid.rows,
            dec_cols: grid.dec_cols,
            hex_cols: grid.hex_cols,
            crc_order: grid.crc_order,
        }
    }
}

impl From<GridParams> for GridConfig {
    fn from(params: GridParams) -> Self {
        GridConfig::new(params.rows, params.dec_cols, params.hex_cols, params.crc_order)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            rows: DEFAULT_ROWS,
            dec_cols: DEFAULT_DEC_COLS,
            hex_cols: DEFAULT_HEX_COLS,
            crc_order: CrcOrder::default(),
        }
    }
}

pub fn clamp_rows(rows: usize) -> usize {
    rows.clamp(MIN_ROWS, MAX_ROWS)
}

pub fn clamp_dec_cols(cols: usize) -> usize {
    cols.clamp(MIN_DEC_COLS, MAX_DEC_COLS)
}

pub fn clamp_hex_cols(cols: usize) -> usize {
    cols.clamp(MIN_HEX_COLS, MAX_HEX_COLS)
}
