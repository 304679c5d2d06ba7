use docsmith::dom::{DocumentTree, TableCellNode, TableNode, TableRowNode, VMerge};
use docsmith::extract::{ContentBlock, GridSlot, MergeGrid, extract_content};

fn plain_row(cols: usize, row: usize) -> TableRowNode {
    TableRowNode::new(
        (0..cols)
            .map(|c| TableCellNode::with_text(format!("r{row}c{c}")))
            .collect(),
    )
}

fn cell_geometry(blocks: &[ContentBlock]) -> Vec<(usize, usize, usize, usize)> {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::TableCell { row, col, row_span, col_span, .. } => {
                Some((*row, *col, *row_span, *col_span))
            }
            _ => None,
        })
        .collect()
}

#[test]
fn unmerged_table_emits_every_position_once() {
    let mut table = TableNode::new(4);
    for r in 0..3 {
        table = table.add_row(plain_row(4, r));
    }
    let blocks = extract_content(&DocumentTree::new().add_table(table));

    let cells = cell_geometry(&blocks);
    assert_eq!(cells.len(), 12, "an R x C table emits R*C cell blocks");
    assert!(cells.iter().all(|&(_, _, rs, cs)| rs == 1 && cs == 1));
}

#[test]
fn vertical_merge_emits_one_block_and_occupies_the_rest() {
    // Column 0 merged over all three rows; column 1 unmerged.
    let table = TableNode::new(2)
        .add_row(TableRowNode::new(vec![
            TableCellNode::with_text("tall").v_merge(VMerge::Restart),
            TableCellNode::with_text("r0c1"),
        ]))
        .add_row(TableRowNode::new(vec![
            TableCellNode::new().v_merge(VMerge::Continue),
            TableCellNode::with_text("r1c1"),
        ]))
        .add_row(TableRowNode::new(vec![
            TableCellNode::new().v_merge(VMerge::Continue),
            TableCellNode::with_text("r2c1"),
        ]));

    let grid = MergeGrid::build(&table);
    assert_eq!(grid.slot(1, 0), GridSlot::Occupied { row: 0, col: 0 });
    assert_eq!(grid.slot(2, 0), GridSlot::Occupied { row: 0, col: 0 });

    let blocks = extract_content(&DocumentTree::new().add_table(table));
    let cells = cell_geometry(&blocks);
    assert_eq!(cells.len(), 4, "one merged block plus three singles");
    assert!(cells.contains(&(0, 0, 3, 1)), "the span counts every continuation row");
    assert!(!cells.iter().any(|&(r, c, ..)| c == 0 && r > 0));
}

#[test]
fn merged_region_covering_four_positions_emits_seven_blocks() {
    // 3x3 table; cell (0,0) spans rowspan=2, colspan=2.
    let table = TableNode::new(3)
        .add_row(TableRowNode::new(vec![
            TableCellNode::with_text("big").grid_span(2).v_merge(VMerge::Restart),
            TableCellNode::with_text("r0c2"),
        ]))
        .add_row(TableRowNode::new(vec![
            TableCellNode::new().grid_span(2).v_merge(VMerge::Continue),
            TableCellNode::with_text("r1c2"),
        ]))
        .add_row(plain_row(3, 2));

    let blocks = extract_content(&DocumentTree::new().add_table(table));
    assert_eq!(blocks.len(), 7, "one metadata block plus six cell blocks");

    let cells = cell_geometry(&blocks);
    assert_eq!(cells.len(), 6);
    assert!(cells.contains(&(0, 0, 2, 2)));
    for covered in [(0, 1), (1, 0), (1, 1)] {
        assert!(
            !cells.iter().any(|&(r, c, ..)| (r, c) == covered),
            "covered position {covered:?} must not emit a block"
        );
    }
    for single in [(0, 2, 1, 1), (1, 2, 1, 1), (2, 0, 1, 1), (2, 1, 1, 1), (2, 2, 1, 1)] {
        assert!(cells.contains(&single), "missing unmerged cell {single:?}");
    }
}

#[test]
fn horizontal_span_wider_than_grid_is_clipped() {
    let table = TableNode::new(2).add_row(TableRowNode::new(vec![
        TableCellNode::with_text("too wide").grid_span(4),
    ]));

    let grid = MergeGrid::build(&table);
    assert_eq!(grid.cols(), 2);
    assert_eq!(grid.slot(0, 0), GridSlot::Occupied { row: 0, col: 0 });
    assert_eq!(grid.slot(0, 1), GridSlot::Occupied { row: 0, col: 0 });

    let blocks = extract_content(&DocumentTree::new().add_table(table));
    let cells = cell_geometry(&blocks);
    assert_eq!(cells.len(), 1, "clipping never drops the primary block");
}

#[test]
fn column_count_falls_back_to_first_row_width() {
    // No grid definition; the first row has three cells.
    let mut table = TableNode::new(0);
    table = table.add_row(plain_row(3, 0)).add_row(plain_row(3, 1));

    let blocks = extract_content(&DocumentTree::new().add_table(table));
    assert!(matches!(
        blocks[0],
        ContentBlock::TableMetadata { cols: 3, rows: 2, .. }
    ));
    assert_eq!(cell_geometry(&blocks).len(), 6);
}

#[test]
fn short_rows_leave_missing_positions_unassigned() {
    let table = TableNode::new(3)
        .add_row(plain_row(3, 0))
        .add_row(plain_row(1, 1));

    let grid = MergeGrid::build(&table);
    assert_eq!(grid.slot(1, 1), GridSlot::Empty);
    assert_eq!(grid.slot(1, 2), GridSlot::Empty);

    let blocks = extract_content(&DocumentTree::new().add_table(table));
    assert_eq!(cell_geometry(&blocks).len(), 4, "three cells in row 0, one in row 1");
}

#[test]
fn orphan_continuation_in_first_row_is_invalid_not_fatal() {
    let table = TableNode::new(1)
        .add_row(TableRowNode::new(vec![
            TableCellNode::with_text("orphan").v_merge(VMerge::Continue),
        ]))
        .add_row(TableRowNode::new(vec![TableCellNode::with_text("below")]));

    let grid = MergeGrid::build(&table);
    assert_eq!(grid.slot(0, 0), GridSlot::Invalid);

    let blocks = extract_content(&DocumentTree::new().add_table(table));
    let cells = cell_geometry(&blocks);
    assert_eq!(cells, vec![(1, 0, 1, 1)], "only the well-formed cell emits a block");
}
