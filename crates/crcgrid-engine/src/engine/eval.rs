//! Cell text evaluation.
//!
//! Turns one cell's raw text into a byte, given a snapshot of the values
//! resolved so far. Evaluation never fails: malformed text of any kind
//! resolves to 0 so that a half-typed edit cannot break the grid.

use super::cell::{ValueStore, lookup_value};
use super::expr::{ExprResult, eval_expression};
use super::preprocess::preprocess_formula;

/// Characters that mark formula cell text.
pub const FORMULA_MARKERS: &[char] = &['+', '-', '*', '/', '#', '$'];

/// How a formula cell's text is interpreted, in priority order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CellInput<'a> {
    Empty,
    Formula(&'a str),
    /// Exactly two characters: a hex byte such as `0A`.
    HexByte(&'a str),
    /// Anything else: a bare cell name such as `A0101`.
    Reference(&'a str),
}

impl<'a> CellInput<'a> {
    pub fn classify(text: &'a str) -> CellInput<'a> {
        let text = text.trim();
        if text.is_empty() {
            CellInput::Empty
        } else if text.contains(FORMULA_MARKERS) {
            CellInput::Formula(text)
        } else if text.chars().count() == 2 {
            CellInput::HexByte(text)
        } else {
            CellInput::Reference(text)
        }
    }
}

/// Evaluate a formula to a byte, reporting why it failed if it did.
pub fn evaluate_formula(formula: &str, values: &ValueStore) -> ExprResult<u8> {
    let expr = preprocess_formula(formula, values);
    eval_expression(&expr)?.to_byte()
}

/// Evaluate the text of a formula (`B`) cell.
pub fn evaluate_formula_cell(text: &str, values: &ValueStore) -> u8 {
    match CellInput::classify(text) {
        CellInput::Empty => 0,
        CellInput::Formula(formula) => evaluate_formula(formula, values).unwrap_or_else(|err| {
            tracing::trace!(formula, %err, "formula collapsed to 0");
            0
        }),
        CellInput::HexByte(hex) => parse_hex_byte(hex).unwrap_or(0),
        CellInput::Reference(name) => lookup_value(values, name),
    }
}

/// Evaluate the text of a decimal (`A`) cell: ASCII digits only, wrapped to
/// one byte. Anything else is 0.
pub fn evaluate_decimal_cell(text: &str) -> u8 {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    text.bytes()
        .fold(0u8, |acc, b| acc.wrapping_mul(10).wrapping_add(b - b'0'))
}

fn parse_hex_byte(text: &str) -> Option<u8> {
    if text.len() != 2 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(text, 16).ok()
}
