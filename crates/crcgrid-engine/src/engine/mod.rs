//! Cell resolution engine API.
//!
//! This module provides the core computation engine for the byte grid:
//!
//! - [`CellName`], [`CellClass`] - Cell naming (`A0101` ↔ class/row/col)
//! - [`GridConfig`] - Row and column counts plus the CRC byte order
//! - [`RawTextStore`], [`ValueStore`] - Raw cell text and resolved bytes
//! - [`eval_expression`] - Closed arithmetic grammar over integers
//! - [`preprocess_formula`] - `#()`/`$()` extraction and reference substitution
//! - [`evaluate_formula_cell`], [`evaluate_decimal_cell`] - Single cell evaluation
//! - [`Resolver`] - Bounded fixed-point resolution of a whole grid
//! - [`crc16_modbus`], [`RowOutput`] - Row checksum and framing

mod cell;
mod cell_name;
mod crc;
mod eval;
mod expr;
mod format;
mod grid;
mod preprocess;
mod resolve;

pub use cell::{RawTextStore, ValueStore, lookup_value};
pub use cell_name::{CellClass, CellName};
pub use crc::{CrcOrder, RowOutput, crc16_modbus};
pub use eval::{
    CellInput, FORMULA_MARKERS, evaluate_decimal_cell, evaluate_formula, evaluate_formula_cell,
};
pub use expr::{ExprError, ExprResult, MAX_NESTING, Number, eval_expression};
pub use format::{format_byte, format_hex_compact, format_hex_spaced};
pub use grid::{
    DEFAULT_DEC_COLS, DEFAULT_HEX_COLS, DEFAULT_ROWS, GridConfig, MAX_DEC_COLS, MAX_HEX_COLS,
    MAX_ROWS, MIN_DEC_COLS, MIN_HEX_COLS, MIN_ROWS, clamp_dec_cols, clamp_hex_cols, clamp_rows,
};
pub use preprocess::{
    ByteSelect, expand_high_low, extract_byte, preprocess_formula, substitute_references,
};
pub use resolve::{DEFAULT_MAX_ROUNDS, Resolution, Resolver};
