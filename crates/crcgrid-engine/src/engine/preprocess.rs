//! Formula preprocessing before arithmetic evaluation.
//!
//! A formula goes through two textual passes:
//!
//! - **High/low extraction**: `#(expr)` and `$(expr)` are replaced by the
//!   decimal value of the high or low byte of `expr`, evaluated on its own
//!   and wrapped to 16 bits. A failed inner expression becomes `0`.
//! - **Reference substitution**: every `A`/`B` cell name (a class letter and
//!   four digits) is replaced by its resolved decimal value, except directly
//!   after `0X`, where it is part of a hex literal such as `0XB0101`.
//!
//! The extraction pattern does not nest: the inner expression ends at the
//! first `)`.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::cell::{ValueStore, lookup_value};
use super::expr::{ExprResult, eval_expression};

const HEX_PREFIX: &str = "0X";

/// Which byte of a 16-bit value an extraction keeps.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ByteSelect {
    /// `#(...)`: bits 15-8.
    High,
    /// `$(...)`: bits 7-0.
    Low,
}

impl ByteSelect {
    fn from_marker(marker: &str) -> ByteSelect {
        if marker == "#" {
            ByteSelect::High
        } else {
            ByteSelect::Low
        }
    }

    pub fn apply(self, word: u16) -> u8 {
        let [high, low] = word.to_be_bytes();
        match self {
            ByteSelect::High => high,
            ByteSelect::Low => low,
        }
    }
}

fn high_low_re() -> &'static Regex {
    static HIGH_LOW_RE: OnceLock<Regex> = OnceLock::new();
    HIGH_LOW_RE.get_or_init(|| {
        Regex::new(r"([#$])\(([^)]+)\)").expect("high/low extraction regex must compile")
    })
}

fn cell_name_re() -> &'static Regex {
    static CELL_NAME_RE: OnceLock<Regex> = OnceLock::new();
    CELL_NAME_RE.get_or_init(|| {
        Regex::new(r"[AB][0-9]{4}").expect("cell name regex must compile")
    })
}

/// Replace cell names in upper-cased `expr` with their resolved values.
pub fn substitute_references(expr: &str, values: &ValueStore) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut last = 0;

    for m in cell_name_re().find_iter(expr) {
        if expr[..m.start()].ends_with(HEX_PREFIX) {
            continue;
        }
        out.push_str(&expr[last..m.start()]);
        out.push_str(&lookup_value(values, m.as_str()).to_string());
        last = m.end();
    }

    out.push_str(&expr[last..]);
    out
}

/// Evaluate the inner expression of `#(...)`/`$(...)` and pick one byte.
pub fn extract_byte(select: ByteSelect, inner: &str, values: &ValueStore) -> ExprResult<u8> {
    let expr = substitute_references(&inner.to_ascii_uppercase(), values);
    let word = eval_expression(&expr)?.to_word()?;
    Ok(select.apply(word))
}

/// Replace every `#(...)`/`$(...)` in `text` with the selected byte value.
pub fn expand_high_low(text: &str, values: &ValueStore) -> String {
    high_low_re()
        .replace_all(text, |caps: &Captures| {
            let select = ByteSelect::from_marker(&caps[1]);
            match extract_byte(select, &caps[2], values) {
                Ok(byte) => byte.to_string(),
                Err(err) => {
                    tracing::trace!(inner = &caps[2], %err, "byte extraction collapsed to 0");
                    "0".to_string()
                }
            }
        })
        .into_owned()
}

/// Run both passes over a formula, producing a plain arithmetic expression.
pub fn preprocess_formula(formula: &str, values: &ValueStore) -> String {
    let upper = formula.to_ascii_uppercase();
    let expanded = expand_high_low(&upper, values);
    substitute_references(&expanded, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CellName;

    fn values() -> ValueStore {
        let mut values = ValueStore::new();
        values.insert(CellName::decimal(1, 1), 20);
        values.insert(CellName::formula(1, 1), 7);
        values.insert(CellName::formula(1, 6), 10);
        values
    }

    #[test]
    fn test_substitute_references() {
        let values = values();
        assert_eq!(substitute_references("B0106+0XFF*2", &values), "10+0XFF*2");
        assert_eq!(substitute_references("A0101*B0101", &values), "20*7");
        assert_eq!(substitute_references("B0999+1", &values), "0+1");
    }

    #[test]
    fn test_substitute_skips_hex_literals() {
        let values = values();
        assert_eq!(substitute_references("0XB0101+B0101", &values), "0XB0101+7");
        assert_eq!(substitute_references("0X0A01", &values), "0X0A01");
    }

    #[test]
    fn test_substitute_has_no_word_boundary() {
        // The name is taken as the first five characters; the rest stays.
        assert_eq!(substitute_references("B010612+1", &values()), "1012+1");
    }

    #[test]
    fn test_extract_byte() {
        let values = values();
        assert_eq!(extract_byte(ByteSelect::High, "0X1234", &values), Ok(0x12));
        assert_eq!(extract_byte(ByteSelect::Low, "0X1234", &values), Ok(0x34));
        assert_eq!(extract_byte(ByteSelect::High, "b0101*300", &values), Ok(8));
        assert_eq!(extract_byte(ByteSelect::Low, "b0101*300", &values), Ok(52));
        assert_eq!(extract_byte(ByteSelect::Low, "0-1", &values), Ok(0xFF));
        assert!(extract_byte(ByteSelect::Low, "1/0", &values).is_err());
    }

    #[test]
    fn test_expand_high_low() {
        let values = values();
        assert_eq!(expand_high_low("#(0X1234)+$(0X1234)", &values), "18+52");
        assert_eq!(expand_high_low("#(45002+A0101*8-4001)", &values), "160");
        assert_eq!(expand_high_low("$(1/0)+1", &values), "0+1");
        // No nesting: the inner expression stops at the first ')'.
        assert_eq!(expand_high_low("#((1+2)*3)", &values), "0*3)");
    }

    #[test]
    fn test_preprocess_formula() {
        let values = values();
        assert_eq!(preprocess_formula("$(b0101*3+0x20)+a0101", &values), "53+20");
        assert_eq!(preprocess_formula("B0106+0XFF*2", &values), "10+0XFF*2");
    }
}
