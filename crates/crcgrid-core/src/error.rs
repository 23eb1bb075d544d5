//! Error types for crcgrid core.

use thiserror::Error;

/// Errors that can occur while editing, loading or saving a document
#[derive(Error, Debug)]
pub enum CrcGridError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration file: {0}")]
    Format(String),

    #[error("Invalid cell name: {0}")]
    InvalidCellName(String),

    #[error("Cell {0} is outside the current grid")]
    CellOutOfRange(String),

    #[error("No file path set")]
    NoFilePath,
}

pub type Result<T> = std::result::Result<T, CrcGridError>;
