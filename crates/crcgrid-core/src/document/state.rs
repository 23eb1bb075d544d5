use crate::error::Result;
use crcgrid_engine::engine::{
    DEFAULT_MAX_ROUNDS, GridConfig, RawTextStore, Resolution, Resolver, RowOutput,
};
use std::path::PathBuf;

/// UI-agnostic document state for one byte grid.
///
/// The raw text store is the only source of truth; `resolution` and `rows`
/// are derived from it and rebuilt by [`Document::recalculate`].
pub struct Document {
    /// Grid shape and CRC byte order
    pub grid: GridConfig,
    /// Cell text exactly as entered (trimmed), keyed by cell name
    pub raw_text: RawTextStore,
    /// Cap on fixed-point resolution rounds
    pub max_rounds: usize,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the document differs from its file
    pub modified: bool,
    /// Whether raw text changed since the last recalculation
    pub dirty: bool,
    /// Values from the last recalculation
    pub resolution: Resolution,
    /// Encoded rows from the last recalculation
    pub rows: Vec<RowOutput>,
}

impl Document {
    /// Create a new document with the default grid.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Self::with_grid(GridConfig::default())
    }

    /// Create an empty document with the given grid.
    pub fn with_grid(grid: GridConfig) -> Self {
        let mut doc = Document {
            grid,
            raw_text: RawTextStore::new(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            file_path: None,
            modified: false,
            dirty: true,
            resolution: Resolution::default(),
            rows: Vec::new(),
        };
        doc.recalculate();
        doc
    }

    /// Create a document with `grid` and load a file if provided.
    ///
    /// A loaded file replaces the grid. A path that does not exist yet
    /// becomes the save target. Also returns the raw text keys dropped on
    /// load (see [`Document::load_file`]).
    pub fn with_file(grid: GridConfig, path: Option<PathBuf>) -> Result<(Self, Vec<String>)> {
        let mut doc = Self::with_grid(grid);
        let mut dropped = Vec::new();

        if let Some(p) = path {
            if p.exists() {
                dropped = doc.load_file(&p)?;
            } else {
                doc.file_path = Some(p);
                doc.modified = false;
            }
        }
        Ok((doc, dropped))
    }

    pub(crate) fn resolver(&self) -> Resolver {
        Resolver::new(self.grid).with_max_rounds(self.max_rounds)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
