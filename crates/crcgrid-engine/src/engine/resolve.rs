//! Fixed-point resolution of a whole grid.
//!
//! Formula cells may reference cells in any row or column, including ones
//! that come later in the grid or that depend back on themselves. Rather than
//! ordering cells by dependency, the resolver re-evaluates every formula cell
//! in rounds until a round changes nothing or the round cap is reached.
//!
//! Within a round cells are visited row by row, column by column, and each
//! new value is visible to the cells after it. An acyclic chain therefore
//! settles in at most one round per link plus a final confirming round.
//! Genuine cycles stop at the cap with whatever values they reached; that is
//! reported through [`Resolution::converged`], never as an error.

use super::cell::{RawTextStore, ValueStore};
use super::cell_name::CellName;
use super::crc::RowOutput;
use super::eval::{evaluate_decimal_cell, evaluate_formula_cell};
use super::grid::GridConfig;

/// Default cap on resolution rounds.
pub const DEFAULT_MAX_ROUNDS: usize = 5;

/// Outcome of one resolution pass.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Resolution {
    /// A value for every cell that exists under the grid configuration.
    pub values: ValueStore,
    /// Rounds run over the formula cells.
    pub rounds: usize,
    /// False when the last permitted round still changed a value.
    pub converged: bool,
}

impl Resolution {
    pub fn value(&self, name: &CellName) -> Option<u8> {
        self.values.get(name).copied()
    }

    /// The formula cell values of one row, in column order.
    pub fn row_bytes(&self, grid: &GridConfig, row: usize) -> Vec<u8> {
        grid.row_cells(row)
            .map(|name| self.value(&name).unwrap_or(0))
            .collect()
    }

    pub fn encode_row(&self, grid: &GridConfig, row: usize) -> RowOutput {
        RowOutput::encode(row, self.row_bytes(grid, row), grid.crc_order)
    }

    pub fn encode_rows(&self, grid: &GridConfig) -> Vec<RowOutput> {
        (1..=grid.rows).map(|row| self.encode_row(grid, row)).collect()
    }
}

/// Resolves raw cell text into byte values for one grid configuration.
#[derive(Clone, Copy, Debug)]
pub struct Resolver {
    grid: GridConfig,
    max_rounds: usize,
}

impl Resolver {
    pub fn new(grid: GridConfig) -> Self {
        Resolver {
            grid,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Set the round cap. At least one round always runs.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// Resolve every cell in the grid. Raw text for names outside the grid is
    /// ignored; names without raw text count as empty.
    pub fn resolve(&self, raw: &RawTextStore) -> Resolution {
        let text_of = |name: &CellName| raw.get(name).map(String::as_str).unwrap_or("");
        let mut values = ValueStore::new();

        for name in self.grid.decimal_cells() {
            values.insert(name, evaluate_decimal_cell(text_of(&name)));
        }

        let formula_cells: Vec<(CellName, &str)> = self
            .grid
            .formula_cells()
            .map(|name| (name, text_of(&name)))
            .collect();
        for (name, _) in &formula_cells {
            values.insert(*name, 0);
        }

        let mut rounds = 0;
        let mut changed = true;
        while changed && rounds < self.max_rounds {
            changed = false;
            rounds += 1;
            for &(name, text) in &formula_cells {
                let value = evaluate_formula_cell(text, &values);
                if values.insert(name, value) != Some(value) {
                    changed = true;
                }
            }
        }

        let converged = !changed;
        if converged {
            tracing::debug!(rounds, cells = values.len(), "resolution reached a fixed point");
        } else {
            tracing::warn!(
                rounds,
                "formula cells still changing after the round cap; keeping current values"
            );
        }

        Resolution {
            values,
            rounds,
            converged,
        }
    }

    /// Resolve and encode every row.
    pub fn resolve_rows(&self, raw: &RawTextStore) -> (Resolution, Vec<RowOutput>) {
        let resolution = self.resolve(raw);
        let rows = resolution.encode_rows(&self.grid);
        (resolution, rows)
    }
}
