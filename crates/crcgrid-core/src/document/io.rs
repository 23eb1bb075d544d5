use super::Document;
use crate::error::{CrcGridError, Result};
use crate::storage::{ReportFormat, parse_config, write_config, write_report};
use std::path::{Path, PathBuf};

impl Document {
    /// Save to the current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = &self.file_path else {
            return Err(CrcGridError::NoFilePath);
        };

        write_config(path, &self.grid, &self.raw_text)?;
        self.modified = false;
        tracing::debug!(path = %path.display(), cells = self.raw_text.len(), "saved configuration");
        Ok(path.clone())
    }

    /// Save to a new path and make it the current file.
    pub fn save_as(&mut self, path: &Path) -> Result<PathBuf> {
        write_config(path, &self.grid, &self.raw_text)?;
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(path.to_path_buf())
    }

    /// Load from file, replacing the grid and all raw text.
    ///
    /// Loading is transactional: on error the document is left unchanged.
    /// Returns the raw text keys that were dropped because they were
    /// malformed or fell outside the loaded grid.
    pub fn load_file(&mut self, path: &Path) -> Result<Vec<String>> {
        let saved = parse_config(path)?;

        self.grid = saved.grid;
        self.raw_text = saved.raw_text;
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        self.recalculate();

        tracing::debug!(
            path = %path.display(),
            rows = self.grid.rows,
            cells = self.raw_text.len(),
            "loaded configuration"
        );
        Ok(saved.dropped)
    }

    /// Export the encoded rows as a report.
    pub fn export_report(&mut self, path: &Path, format: ReportFormat) -> Result<usize> {
        self.ensure_resolved();
        write_report(path, &self.rows, format)?;
        Ok(self.rows.len())
    }
}
