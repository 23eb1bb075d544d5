use super::Document;
use crcgrid_engine::engine::{
    CellClass, CellInput, CellName, Resolution, RowOutput, format_byte, preprocess_formula,
};

impl Document {
    /// Resolve every cell from the raw text and re-encode all rows.
    pub fn recalculate(&mut self) -> &Resolution {
        let (resolution, rows) = self.resolver().resolve_rows(&self.raw_text);
        self.resolution = resolution;
        self.rows = rows;
        self.dirty = false;
        &self.resolution
    }

    /// Recalculate only if raw text changed since the last pass.
    pub fn ensure_resolved(&mut self) {
        if self.dirty {
            self.recalculate();
        }
    }

    /// Encoded output for a 1-based row.
    pub fn row_output(&self, row: usize) -> Option<&RowOutput> {
        row.checked_sub(1).and_then(|idx| self.rows.get(idx))
    }

    pub fn rows(&self) -> &[RowOutput] {
        &self.rows
    }

    /// Whether the last recalculation reached a fixed point.
    pub fn converged(&self) -> bool {
        self.resolution.converged
    }

    /// Resolved value of a cell, if it exists in the grid.
    pub fn cell_value(&self, cell: &CellName) -> Option<u8> {
        self.resolution.value(cell)
    }

    /// Raw text of a cell (empty when unset).
    pub fn cell_text(&self, cell: &CellName) -> &str {
        self.raw_text.get(cell).map(String::as_str).unwrap_or("")
    }

    /// Display string for a cell: decimal for `A` cells, two hex digits for
    /// `B` cells, empty for cells outside the grid.
    pub fn cell_display(&self, cell: &CellName) -> String {
        match self.cell_value(cell) {
            Some(value) => format_byte(value, cell.class),
            None => String::new(),
        }
    }

    /// For a formula cell, the arithmetic expression left after extraction
    /// and reference substitution against the current values.
    pub fn explain_cell(&self, cell: &CellName) -> Option<String> {
        if cell.class != CellClass::Formula || !self.grid.contains(cell) {
            return None;
        }
        match CellInput::classify(self.cell_text(cell)) {
            CellInput::Formula(formula) => {
                Some(preprocess_formula(formula, &self.resolution.values))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crcgrid_engine::engine::{CrcOrder, GridConfig};

    #[test]
    fn test_edits_wait_for_recalculate() {
        let mut doc = Document::with_grid(GridConfig::new(1, 0, 2, CrcOrder::LowFirst));
        doc.set_cell_text("B0101", "FF").unwrap();
        assert_eq!(doc.cell_value(&CellName::formula(1, 1)), Some(0));

        doc.ensure_resolved();
        assert_eq!(doc.cell_value(&CellName::formula(1, 1)), Some(255));
        assert!(!doc.dirty);
    }

    #[test]
    fn test_row_output_is_one_based() {
        let doc = Document::with_grid(GridConfig::new(2, 0, 1, CrcOrder::LowFirst));
        assert!(doc.row_output(0).is_none());
        assert_eq!(doc.row_output(1).map(|r| r.row), Some(1));
        assert_eq!(doc.row_output(2).map(|r| r.row), Some(2));
        assert!(doc.row_output(3).is_none());
        assert_eq!(doc.rows().len(), 2);
    }

    #[test]
    fn test_cell_display_by_class() {
        let mut doc = Document::with_grid(GridConfig::new(1, 1, 1, CrcOrder::LowFirst));
        doc.set_cell_text("A0101", "12").unwrap();
        doc.set_cell_text("B0101", "A0101").unwrap();
        doc.recalculate();
        assert_eq!(doc.cell_display(&CellName::decimal(1, 1)), "12");
        assert_eq!(doc.cell_display(&CellName::formula(1, 1)), "0C");
        assert_eq!(doc.cell_display(&CellName::formula(1, 2)), "");
    }

    #[test]
    fn test_explain_cell() {
        let mut doc = Document::with_grid(GridConfig::new(1, 1, 2, CrcOrder::LowFirst));
        doc.set_cell_text("A0101", "20").unwrap();
        doc.set_cell_text("B0101", "#(a0101*256+5)+B0102").unwrap();
        doc.set_cell_text("B0102", "0A").unwrap();
        doc.recalculate();
        assert_eq!(doc.explain_cell(&CellName::formula(1, 1)).as_deref(), Some("20+10"));
        assert_eq!(doc.explain_cell(&CellName::formula(1, 2)), None);
        assert_eq!(doc.explain_cell(&CellName::decimal(1, 1)), None);
        assert_eq!(doc.cell_value(&CellName::formula(1, 1)), Some(30));
    }

    #[test]
    fn test_non_convergence_is_reported() {
        let mut doc = Document::with_grid(GridConfig::new(1, 0, 2, CrcOrder::LowFirst));
        doc.set_cell_text("B0101", "B0102+1").unwrap();
        doc.set_cell_text("B0102", "B0101+1").unwrap();
        doc.recalculate();
        assert!(!doc.converged());
        assert_eq!(doc.resolution.rounds, doc.max_rounds);
    }
}
