//! JSON configuration record.
//!
//! The record holds the grid parameters and every cell's raw text:
//!
//! ```json
//! {
//!   "global_params": {
//!     "total_rows": 1,
//!     "dec_col_count": 0,
//!     "hex_col_count": 6,
//!     "crc_order": "low_first"
//!   },
//!   "raw_text_dict": { "B0101": "01", "B0102": "03" }
//! }
//! ```
//!
//! Parameters are clamped into range on load and an unknown `crc_order`
//! falls back to low byte first. Raw text entries whose names are malformed
//! or outside the loaded grid are dropped.

use crate::error::{CrcGridError, Result};
use crcgrid_engine::engine::{
    CellName, CrcOrder, DEFAULT_DEC_COLS, DEFAULT_HEX_COLS, DEFAULT_ROWS, GridConfig,
    RawTextStore,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const MAX_CONFIG_FILE_BYTES: u64 = 4 * 1_048_576; // 4 MiB
const GLOBAL_PARAMS_KEY: &str = "global_params";
const RAW_TEXT_KEY: &str = "raw_text_dict";

#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    global_params: GlobalParams,
    raw_text_dict: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GlobalParams {
    #[serde(default)]
    total_rows: Option<i64>,
    #[serde(default)]
    dec_col_count: Option<i64>,
    #[serde(default)]
    hex_col_count: Option<i64>,
    #[serde(default)]
    crc_order: Option<String>,
}

/// A loaded configuration record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SavedConfig {
    pub grid: GridConfig,
    pub raw_text: RawTextStore,
    /// Raw text keys that were dropped on load.
    pub dropped: Vec<String>,
}

/// Parse a configuration file.
pub fn parse_config(path: &Path) -> Result<SavedConfig> {
    let meta = fs::metadata(path)?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(CrcGridError::Format(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        )));
    }
    let content = fs::read_to_string(path)?;
    parse_config_content(&content)
}

/// Parse configuration JSON from a string.
pub fn parse_config_content(content: &str) -> Result<SavedConfig> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if !value.is_object() {
        return Err(CrcGridError::Format("expected a JSON object".to_string()));
    }
    for key in [GLOBAL_PARAMS_KEY, RAW_TEXT_KEY] {
        if value.get(key).is_none() {
            return Err(CrcGridError::Format(format!("missing `{}`", key)));
        }
    }
    let file: ConfigFile = serde_json::from_value(value)?;

    let grid = grid_from_params(&file.global_params);
    let mut raw_text = RawTextStore::new();
    let mut dropped = Vec::new();

    for (name, text) in file.raw_text_dict {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        match CellName::from_str(&name) {
            Some(cell) if grid.contains(&cell) => {
                raw_text.insert(cell, text.to_string());
            }
            _ => dropped.push(name),
        }
    }

    if !dropped.is_empty() {
        tracing::warn!(count = dropped.len(), "dropped raw text for cells outside the grid");
    }

    Ok(SavedConfig {
        grid,
        raw_text,
        dropped,
    })
}

fn grid_from_params(params: &GlobalParams) -> GridConfig {
    let count = |value: Option<i64>, default: usize| {
        value.map_or(default, |v| usize::try_from(v).unwrap_or(0))
    };
    let crc_order = match params.crc_order.as_deref() {
        None => CrcOrder::default(),
        Some(label) => CrcOrder::from_label(label).unwrap_or_else(|| {
            tracing::warn!(label, "unknown crc_order; using low_first");
            CrcOrder::default()
        }),
    };

    GridConfig::new(
        count(params.total_rows, DEFAULT_ROWS),
        count(params.dec_col_count, DEFAULT_DEC_COLS),
        count(params.hex_col_count, DEFAULT_HEX_COLS),
        crc_order,
    )
}

/// Write a configuration file.
pub fn write_config(path: &Path, grid: &GridConfig, raw_text: &RawTextStore) -> Result<()> {
    let content = write_config_content(grid, raw_text)?;
    fs::write(path, content)?;
    Ok(())
}

/// Render a configuration record as pretty-printed JSON.
pub fn write_config_content(grid: &GridConfig, raw_text: &RawTextStore) -> Result<String> {
    let file = ConfigFile {
        global_params: GlobalParams {
            total_rows: Some(grid.rows as i64),
            dec_col_count: Some(grid.dec_cols as i64),
            hex_col_count: Some(grid.hex_cols as i64),
            crc_order: Some(grid.crc_order.label().to_string()),
        },
        raw_text_dict: raw_text
            .iter()
            .filter(|(cell, _)| grid.contains(cell))
            .map(|(cell, text)| (cell.to_string(), text.clone()))
            .collect(),
    };
    let mut content = serde_json::to_string_pretty(&file)?;
    content.push('\n');
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_record() {
        let content = r#"{
            "global_params": {
                "total_rows": 2,
                "dec_col_count": 1,
                "hex_col_count": 3,
                "crc_order": "high_first"
            },
            "raw_text_dict": {"A0101": "20", "B0101": "A0101", "B0203": " FF "}
        }"#;
        let saved = parse_config_content(content).unwrap();
        assert_eq!(saved.grid, GridConfig::new(2, 1, 3, CrcOrder::HighFirst));
        assert_eq!(saved.raw_text.len(), 3);
        assert_eq!(saved.raw_text[&CellName::formula(2, 3)], "FF");
        assert!(saved.dropped.is_empty());
    }

    #[test]
    fn test_parse_accepts_desktop_labels() {
        let content = r#"{"global_params": {"crc_order": "高位在前"}, "raw_text_dict": {}}"#;
        let saved = parse_config_content(content).unwrap();
        assert_eq!(saved.grid.crc_order, CrcOrder::HighFirst);
        assert_eq!(saved.grid.hex_cols, DEFAULT_HEX_COLS);
    }

    #[test]
    fn test_parse_clamps_and_defaults() {
        let content = r#"{
            "global_params": {"total_rows": 99, "dec_col_count": -3, "hex_col_count": 0, "crc_order": "sideways"},
            "raw_text_dict": {}
        }"#;
        let saved = parse_config_content(content).unwrap();
        assert_eq!(saved.grid, GridConfig::new(30, 0, 1, CrcOrder::LowFirst));
    }

    #[test]
    fn test_parse_drops_unknown_and_out_of_range_names() {
        let content = r#"{
            "global_params": {"total_rows": 1, "dec_col_count": 0, "hex_col_count": 2},
            "raw_text_dict": {"B0101": "01", "B0103": "02", "A0101": "3", "junk": "4", "B0102": ""}
        }"#;
        let saved = parse_config_content(content).unwrap();
        assert_eq!(saved.raw_text.len(), 1);
        let mut dropped = saved.dropped.clone();
        dropped.sort();
        assert_eq!(dropped, vec!["A0101", "B0103", "junk"]);
    }

    #[test]
    fn test_parse_rejects_missing_sections() {
        assert!(matches!(
            parse_config_content(r#"{"global_params": {}}"#),
            Err(CrcGridError::Format(_))
        ));
        assert!(matches!(
            parse_config_content(r#"{"raw_text_dict": {}}"#),
            Err(CrcGridError::Format(_))
        ));
        assert!(matches!(parse_config_content("[1, 2]"), Err(CrcGridError::Format(_))));
        assert!(matches!(parse_config_content("{"), Err(CrcGridError::Json(_))));
        assert!(matches!(
            parse_config_content(r#"{"global_params": {"total_rows": "two"}, "raw_text_dict": {}}"#),
            Err(CrcGridError::Json(_))
        ));
    }

    #[test]
    fn test_write_then_parse_preserves_document() {
        let grid = GridConfig::new(2, 1, 2, CrcOrder::HighFirst);
        let mut raw_text = RawTextStore::new();
        raw_text.insert(CellName::decimal(1, 1), "20".to_string());
        raw_text.insert(CellName::formula(2, 2), "#(A0101*300)".to_string());

        let content = write_config_content(&grid, &raw_text).unwrap();
        assert!(content.contains("\"crc_order\": \"high_first\""));
        assert!(content.contains("\"B0202\": \"#(A0101*300)\""));

        let saved = parse_config_content(&content).unwrap();
        assert_eq!(saved.grid, grid);
        assert_eq!(saved.raw_text, raw_text);
    }
}
