//! Document tree traversal
//!
//! Walks the body nodes of a document in order and emits the flat
//! [`ContentBlock`] list: paragraphs and headings directly, tables as one
//! metadata block plus one block per primary cell of the resolved merge grid.
//! A single counter feeds both block ids and sequence indices, so output
//! order always equals body traversal order.

use log::warn;

use crate::dom::{BodyNode, DocumentTree, ParagraphNode, TableCellNode, TableNode};
use crate::formatting::capture_run;

use super::grid::{self, MergeGrid};
use super::models::{ContentBlock, RunFormat};

/// Extract the ordered content block list from a document tree.
///
/// The result is computed fresh on every call; nothing is cached on the tree.
pub fn extract_content(tree: &DocumentTree) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut next_id = 0usize;
    let mut paragraph_index = 0usize;
    let mut table_index = 0usize;

    for node in &tree.body {
        match node {
            BodyNode::Paragraph(paragraph) => {
                blocks.push(paragraph_block(paragraph, paragraph_index, &mut next_id));
                paragraph_index += 1;
            }
            BodyNode::Table(table) => {
                emit_table_blocks(table, table_index, &mut next_id, &mut blocks);
                table_index += 1;
            }
            BodyNode::Unsupported(tag) => {
                warn!("skipping unsupported body node <{tag}>");
            }
        }
    }
    blocks
}

/// Heading level of a style name, or `None` when the style is not a heading.
///
/// A style is a heading iff its name starts with "heading", case-insensitively.
/// The level is the trailing whitespace-delimited token parsed as an integer,
/// defaulting to 0 when that token is not numeric ("Heading 2" is level 2,
/// a bare "Heading" is level 0).
pub fn heading_level(style_name: &str) -> Option<u8> {
    if !style_name.to_lowercase().starts_with("heading") {
        return None;
    }
    let level = style_name
        .split_whitespace()
        .last()
        .and_then(|token| token.parse().ok())
        .unwrap_or(0);
    Some(level)
}

/// The effective page-break-before flag of a paragraph.
///
/// The paragraph-level property and an explicit page-type break marker inside
/// any run are independent representations of the same semantic; either one
/// sets the flag.
pub fn effective_page_break(paragraph: &ParagraphNode) -> bool {
    paragraph.page_break_before || paragraph.runs.iter().any(|run| run.page_break)
}

fn paragraph_block(
    paragraph: &ParagraphNode,
    paragraph_index: usize,
    next_id: &mut usize,
) -> ContentBlock {
    let id = take_id(next_id);
    let text = paragraph.text();
    let runs: Vec<RunFormat> = paragraph.runs.iter().map(capture_run).collect();
    let page_break_before = effective_page_break(paragraph);

    match heading_level(paragraph.style_name()) {
        Some(level) => ContentBlock::Heading {
            id,
            sequence: id,
            paragraph_index,
            level,
            text,
            style: paragraph.style.clone(),
            alignment: paragraph.alignment,
            page_break_before,
            runs,
        },
        None => ContentBlock::Paragraph {
            id,
            sequence: id,
            paragraph_index,
            text,
            style: paragraph.style.clone(),
            alignment: paragraph.alignment,
            page_break_before,
            runs,
        },
    }
}

fn emit_table_blocks(
    table: &TableNode,
    table_index: usize,
    next_id: &mut usize,
    blocks: &mut Vec<ContentBlock>,
) {
    let id = take_id(next_id);
    blocks.push(ContentBlock::TableMetadata {
        id,
        sequence: id,
        table_index,
        rows: table.rows.len(),
        cols: grid::logical_column_count(table),
        style: table.style.clone(),
    });

    let merge_grid = MergeGrid::build(table);
    for primary in merge_grid.primaries() {
        let Some(cell) = table.cell_at(primary.row, primary.col) else {
            // The grid only reports positions it resolved from a cell, so a
            // miss here means the table changed under us; recover by skipping.
            warn!(
                "primary cell at ({},{}) of table {table_index} has no backing node; skipping",
                primary.row, primary.col
            );
            continue;
        };
        let id = take_id(next_id);
        blocks.push(cell_block(cell, table_index, primary, id));
    }
}

fn cell_block(
    cell: &TableCellNode,
    table_index: usize,
    primary: &grid::PrimaryCell,
    id: usize,
) -> ContentBlock {
    let first = cell.paragraphs.first();
    ContentBlock::TableCell {
        id,
        sequence: id,
        table_index,
        row: primary.row,
        col: primary.col,
        row_span: primary.row_span,
        col_span: primary.col_span,
        text: cell.text(),
        style: first.and_then(|para| para.style.clone()),
        alignment: first.and_then(|para| para.alignment),
        page_break_before: first.is_some_and(effective_page_break),
        runs: cell
            .paragraphs
            .iter()
            .flat_map(|para| para.runs.iter().map(capture_run))
            .collect(),
    }
}

fn take_id(next_id: &mut usize) -> usize {
    let id = *next_id;
    *next_id += 1;
    id
}
