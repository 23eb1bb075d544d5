//! crcgrid-core - UI-agnostic document model + storage.

pub mod document;
pub mod error;
pub mod storage;

pub use document::Document;
pub use error::{CrcGridError, Result};

pub use crcgrid_engine::engine::{CellName, CrcOrder, GridConfig, RowOutput};
