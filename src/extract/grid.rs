//! Merge grid reconstruction
//!
//! A table's merge structure is stored cell-by-cell in the markup (vertical
//! merge markers plus horizontal span counts). This module resolves those
//! per-cell descriptors into a logical occupancy grid, identifying each
//! primary cell and its row/column span so extraction can emit exactly one
//! block per merged region.
//!
//! The grid is transient: built fresh per table, discarded after use.

use log::{debug, warn};

use crate::dom::{TableNode, VMerge};

/// State of one logical grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridSlot {
    /// Not yet assigned to any cell.
    Empty,
    /// Covered by the primary cell at the given logical position.
    Occupied { row: usize, col: usize },
    /// Structurally broken position (a continuation with no row above it).
    Invalid,
}

/// A resolved primary cell: the top-left of a merged region, or a plain
/// unmerged cell with both spans equal to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryCell {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
}

/// Logical occupancy grid for one table.
#[derive(Debug, Clone)]
pub struct MergeGrid {
    cols: usize,
    slots: Vec<Vec<GridSlot>>,
    primaries: Vec<PrimaryCell>,
}

/// Logical column count for a table: the grid definition when present,
/// otherwise the first row's physical cell count, otherwise one. A table
/// with no rows reports zero columns.
pub fn logical_column_count(table: &TableNode) -> usize {
    if table.grid_cols > 0 {
        return table.grid_cols;
    }
    match table.rows.first() {
        Some(row) if !row.cells.is_empty() => row.cells.len(),
        Some(_) => 1,
        None => 0,
    }
}

impl MergeGrid {
    /// Resolve a table's merge descriptors into an occupancy grid.
    ///
    /// Never fails: out-of-bounds spans are clipped, conflicting claims keep
    /// the earlier owner, and malformed continuations are marked invalid;
    /// each case leaves a log entry.
    pub fn build(table: &TableNode) -> MergeGrid {
        let rows = table.rows.len();
        let cols = logical_column_count(table);
        let mut grid = MergeGrid {
            cols,
            slots: vec![vec![GridSlot::Empty; cols]; rows],
            primaries: Vec::new(),
        };

        for row in 0..rows {
            for col in 0..cols {
                if grid.slots[row][col] != GridSlot::Empty {
                    continue;
                }
                let Some(cell) = table.cell_at(row, col) else {
                    debug!("no cell covers table position ({row},{col}); row is short");
                    continue;
                };
                if cell.v_merge == VMerge::Continue {
                    grid.attach_continuation(row, col);
                } else {
                    grid.claim_primary(table, row, col, cell.span(), cell.v_merge);
                }
            }
        }
        grid
    }

    /// A continuation cell that was not claimed by a span above it. Attach it
    /// to whatever owns the position one row up, falling back to that literal
    /// position when it is unowned.
    fn attach_continuation(&mut self, row: usize, col: usize) {
        if row == 0 {
            warn!("vertical-merge continuation in the first table row at column {col}");
            self.slots[row][col] = GridSlot::Invalid;
            return;
        }
        let owner = match self.slots[row - 1][col] {
            GridSlot::Occupied { row, col } => (row, col),
            _ => (row - 1, col),
        };
        self.slots[row][col] = GridSlot::Occupied {
            row: owner.0,
            col: owner.1,
        };
    }

    fn claim_primary(
        &mut self,
        table: &TableNode,
        row: usize,
        col: usize,
        col_span: usize,
        v_merge: VMerge,
    ) {
        let rows = self.slots.len();
        let mut row_span = 1;
        if v_merge == VMerge::Restart {
            // Count the continuation run directly below this column.
            while row + row_span < rows {
                match table.cell_at(row + row_span, col) {
                    Some(below) if below.v_merge == VMerge::Continue => row_span += 1,
                    _ => break,
                }
            }
        }

        for dr in 0..row_span {
            for dc in 0..col_span {
                let (r, c) = (row + dr, col + dc);
                if r >= rows || c >= self.cols {
                    warn!(
                        "merge span from ({row},{col}) reaches outside the {rows}x{} grid at ({r},{c}); clipping",
                        self.cols
                    );
                    continue;
                }
                match self.slots[r][c] {
                    GridSlot::Occupied {
                        row: prior_row,
                        col: prior_col,
                    } => warn!(
                        "grid position ({r},{c}) already belongs to ({prior_row},{prior_col}); keeping the earlier owner"
                    ),
                    _ => {
                        self.slots[r][c] = GridSlot::Occupied { row, col };
                    }
                }
            }
        }

        self.primaries.push(PrimaryCell {
            row,
            col,
            row_span,
            col_span,
        });
    }

    /// Primary cells in traversal order (row-major by top-left position).
    pub fn primaries(&self) -> &[PrimaryCell] {
        &self.primaries
    }

    pub fn rows(&self) -> usize {
        self.slots.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn slot(&self, row: usize, col: usize) -> GridSlot {
        self.slots
            .get(row)
            .and_then(|cells| cells.get(col))
            .copied()
            .unwrap_or(GridSlot::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{TableCellNode, TableRowNode};

    fn plain_table(rows: usize, cols: usize) -> TableNode {
        let mut table = TableNode::new(cols);
        for r in 0..rows {
            let cells = (0..cols)
                .map(|c| TableCellNode::with_text(format!("r{r}c{c}")))
                .collect();
            table = table.add_row(TableRowNode::new(cells));
        }
        table
    }

    #[test]
    fn unmerged_table_yields_one_primary_per_position() {
        let grid = MergeGrid::build(&plain_table(2, 3));
        assert_eq!(grid.primaries().len(), 6);
        assert!(grid
            .primaries()
            .iter()
            .all(|p| p.row_span == 1 && p.col_span == 1));
    }

    #[test]
    fn vertical_merge_is_counted_from_the_restart_marker() {
        let table = TableNode::new(1)
            .add_row(TableRowNode::new(vec![
                TableCellNode::with_text("top").v_merge(VMerge::Restart),
            ]))
            .add_row(TableRowNode::new(vec![
                TableCellNode::new().v_merge(VMerge::Continue),
            ]))
            .add_row(TableRowNode::new(vec![
                TableCellNode::new().v_merge(VMerge::Continue),
            ]));

        let grid = MergeGrid::build(&table);
        assert_eq!(grid.primaries(), &[PrimaryCell { row: 0, col: 0, row_span: 3, col_span: 1 }]);
        assert_eq!(grid.slot(1, 0), GridSlot::Occupied { row: 0, col: 0 });
        assert_eq!(grid.slot(2, 0), GridSlot::Occupied { row: 0, col: 0 });
    }

    #[test]
    fn continuation_in_first_row_is_marked_invalid() {
        let table = TableNode::new(1).add_row(TableRowNode::new(vec![
            TableCellNode::new().v_merge(VMerge::Continue),
        ]));
        let grid = MergeGrid::build(&table);
        assert_eq!(grid.slot(0, 0), GridSlot::Invalid);
        assert!(grid.primaries().is_empty());
    }

    #[test]
    fn oversized_column_span_is_clipped_at_the_grid_edge() {
        let table = TableNode::new(2).add_row(TableRowNode::new(vec![
            TableCellNode::with_text("wide").grid_span(5),
        ]));
        let grid = MergeGrid::build(&table);
        assert_eq!(
            grid.primaries(),
            &[PrimaryCell { row: 0, col: 0, row_span: 1, col_span: 5 }]
        );
        assert_eq!(grid.slot(0, 0), GridSlot::Occupied { row: 0, col: 0 });
        assert_eq!(grid.slot(0, 1), GridSlot::Occupied { row: 0, col: 0 });
    }

    #[test]
    fn column_count_falls_back_to_first_row_then_one() {
        let mut no_grid = plain_table(1, 4);
        no_grid.grid_cols = 0;
        assert_eq!(logical_column_count(&no_grid), 4);

        let empty_first_row = TableNode::new(0).add_row(TableRowNode::new(Vec::new()));
        assert_eq!(logical_column_count(&empty_first_row), 1);

        assert_eq!(logical_column_count(&TableNode::new(0)), 0);
    }
}
