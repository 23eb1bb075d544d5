use super::Document;
use crate::error::{CrcGridError, Result};
use crcgrid_engine::engine::{
    CellName, CrcOrder, GridConfig, clamp_dec_cols, clamp_hex_cols, clamp_rows,
};

impl Document {
    /// Set a cell's raw text from its textual name (e.g. `B0106`).
    pub fn set_cell_text(&mut self, name: &str, text: &str) -> Result<CellName> {
        let cell = CellName::from_str(&name.trim().to_ascii_uppercase())
            .ok_or_else(|| CrcGridError::InvalidCellName(name.to_string()))?;
        self.set_cell(cell, text)?;
        Ok(cell)
    }

    /// Set a cell's raw text. Text is trimmed; empty text clears the cell.
    ///
    /// The document is marked dirty rather than recalculated, so a caller can
    /// batch several edits into one [`Document::recalculate`].
    pub fn set_cell(&mut self, cell: CellName, text: &str) -> Result<()> {
        if !self.grid.contains(&cell) {
            return Err(CrcGridError::CellOutOfRange(cell.to_string()));
        }

        let text = text.trim();
        let changed = if text.is_empty() {
            self.raw_text.remove(&cell).is_some()
        } else {
            self.raw_text.insert(cell, text.to_string()).as_deref() != Some(text)
        };

        if changed {
            self.modified = true;
            self.dirty = true;
        }
        Ok(())
    }

    /// Clear the specified cell. Returns whether it held any text.
    pub fn clear_cell(&mut self, cell: &CellName) -> bool {
        let removed = self.raw_text.remove(cell).is_some();
        if removed {
            self.modified = true;
            self.dirty = true;
        }
        removed
    }

    /// Change the number of rows (clamped). Removed rows lose their text.
    pub fn set_row_count(&mut self, rows: usize) {
        let grid = GridConfig {
            rows: clamp_rows(rows),
            ..self.grid
        };
        self.apply_grid(grid);
    }

    /// Change the number of decimal columns per row (clamped).
    pub fn set_dec_col_count(&mut self, cols: usize) {
        let grid = GridConfig {
            dec_cols: clamp_dec_cols(cols),
            ..self.grid
        };
        self.apply_grid(grid);
    }

    /// Change the number of hex/formula columns per row (clamped).
    pub fn set_hex_col_count(&mut self, cols: usize) {
        let grid = GridConfig {
            hex_cols: clamp_hex_cols(cols),
            ..self.grid
        };
        self.apply_grid(grid);
    }

    pub fn set_crc_order(&mut self, order: CrcOrder) {
        let grid = GridConfig {
            crc_order: order,
            ..self.grid
        };
        self.apply_grid(grid);
    }

    /// Replace the whole grid configuration. Counts are clamped.
    pub fn set_grid(&mut self, grid: GridConfig) {
        let grid = GridConfig::new(grid.rows, grid.dec_cols, grid.hex_cols, grid.crc_order);
        self.apply_grid(grid);
    }

    /// Change the round cap (minimum 1) and recalculate.
    pub fn set_max_rounds(&mut self, max_rounds: usize) {
        let max_rounds = max_rounds.max(1);
        if self.max_rounds != max_rounds {
            self.max_rounds = max_rounds;
            self.modified = true;
            self.recalculate();
        }
    }

    fn apply_grid(&mut self, grid: GridConfig) {
        if self.grid == grid {
            return;
        }
        self.grid = grid;
        self.prune_outside_grid();
        self.modified = true;
        self.recalculate();
    }

    /// Drop raw text and resolved values for cells the grid no longer has.
    /// Returns the number of raw text entries removed.
    pub(crate) fn prune_outside_grid(&mut self) -> usize {
        let grid = self.grid;
        let before = self.raw_text.len();
        self.raw_text.retain(|cell, _| grid.contains(cell));
        self.resolution.values.retain(|cell, _| grid.contains(cell));
        self.rows.retain(|row| row.row <= grid.rows);

        let removed = before - self.raw_text.len();
        if removed > 0 {
            tracing::debug!(removed, "pruned cell text outside the grid");
        }
        removed
    }
}
