//! Cell stores shared by the evaluator and the resolver.
//!
//! - [`RawTextStore`] - text exactly as entered, keyed by cell name
//! - [`ValueStore`] - resolved one-byte values, rebuilt on every pass
//!
//! Both are sorted maps so iteration and serialization order is stable.

use std::collections::BTreeMap;

use super::cell_name::CellName;

/// Raw text per cell, owned by the caller. Missing names count as empty.
pub type RawTextStore = BTreeMap<CellName, String>;

/// Resolved byte per cell. Always recomputable from a [`RawTextStore`] plus a
/// grid configuration.
pub type ValueStore = BTreeMap<CellName, u8>;

/// Look up a cell by its textual name (whitespace and case tolerant).
/// Unknown or malformed names read as 0.
pub fn lookup_value(values: &ValueStore, name: &str) -> u8 {
    let name = name.trim().to_ascii_uppercase();
    CellName::from_str(&name)
        .and_then(|cell| values.get(&cell).copied())
        .unwrap_or(0)
}
