//! User settings (`settings.toml`).
//!
//! ```toml
//! rows = 2
//! dec_cols = 1
//! hex_cols = 8
//! crc_order = "high_first"
//! max_rounds = 10
//! compact = true
//! ```
//!
//! Every key is optional. Problems with the file are reported as warnings
//! and the built-in defaults are used instead.

use crcgrid_engine::engine::{CrcOrder, GridConfig};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_SETTINGS_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub rows: Option<usize>,
    pub dec_cols: Option<usize>,
    pub hex_cols: Option<usize>,
    pub crc_order: Option<String>,
    pub max_rounds: Option<usize>,
    pub compact: Option<bool>,
}

impl Settings {
    /// Overlay these settings on a grid configuration.
    pub fn apply_grid(&self, grid: GridConfig, warnings: &mut Vec<String>) -> GridConfig {
        let crc_order = match self.crc_order.as_deref() {
            None => grid.crc_order,
            Some(label) => CrcOrder::from_label(label).unwrap_or_else(|| {
                warnings.push(format!("Unknown crc_order '{}' in settings", label));
                grid.crc_order
            }),
        };
        GridConfig::new(
            self.rows.unwrap_or(grid.rows),
            self.dec_cols.unwrap_or(grid.dec_cols),
            self.hex_cols.unwrap_or(grid.hex_cols),
            crc_order,
        )
    }
}

/// Load settings from `path`, or from the user's config directory when no
/// path is given. A missing default file is not a warning.
pub fn load_settings(path: Option<&Path>) -> (Settings, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let settings_path = path.map(Path::to_path_buf).or_else(user_settings_path);

    let Some(settings_path) = settings_path else {
        return (Settings::default(), warnings);
    };

    if !settings_path.exists() {
        if path.is_some() {
            warnings.push(format!("Settings file not found: {}", settings_path.display()));
        }
        return (Settings::default(), warnings);
    }

    let settings = match std::fs::metadata(&settings_path) {
        Ok(meta) if meta.len() > MAX_SETTINGS_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                settings_path.display(),
                meta.len(),
                MAX_SETTINGS_FILE_BYTES
            ));
            None
        }
        Ok(_) => match std::fs::read_to_string(&settings_path) {
            Ok(content) => match parse_settings(&content) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    warnings.push(format!(
                        "Failed to parse {}: {}",
                        settings_path.display(),
                        err
                    ));
                    None
                }
            },
            Err(err) => {
                warnings.push(format!("Failed to read {}: {}", settings_path.display(), err));
                None
            }
        },
        Err(err) => {
            warnings.push(format!(
                "Failed to read metadata for {}: {}",
                settings_path.display(),
                err
            ));
            None
        }
    };

    (settings.unwrap_or_default(), warnings)
}

pub fn parse_settings(content: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(content)
}

fn user_settings_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "crcgrid")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("settings.toml");
    Some(path)
}
