//! Format-preserving single-block editing
//!
//! Replaces the text of one located paragraph or table cell while reapplying
//! the formatting captured from a previous extraction. The target is fully
//! validated before any run or paragraph is removed, so an edit either
//! applies completely or fails without touching the document.

use log::warn;

use crate::dom::{
    Alignment, BodyNode, DocumentTree, ParagraphNode, RunNode, TableCellNode, TableNode, VMerge,
};
use crate::error::{DocError, Result};
use crate::extract::RunFormat;
use crate::formatting::apply_format;

/// Identifies the block an edit targets: a top-level paragraph by index, or a
/// primary table cell by table index and logical grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLocator {
    Paragraph(usize),
    TableCell { table: usize, row: usize, col: usize },
}

impl BlockLocator {
    /// Build a locator from optional parts, as an adapter surface receives
    /// them. Exactly one of the two must be present.
    pub fn from_parts(
        paragraph: Option<usize>,
        cell: Option<(usize, usize, usize)>,
    ) -> Result<BlockLocator> {
        match (paragraph, cell) {
            (Some(_), Some(_)) => Err(DocError::InvalidArgument(
                "supply either a paragraph index or a table cell, not both".to_string(),
            )),
            (None, None) => Err(DocError::InvalidArgument(
                "no block locator supplied".to_string(),
            )),
            (Some(index), None) => Ok(BlockLocator::Paragraph(index)),
            (None, Some((table, row, col))) => Ok(BlockLocator::TableCell { table, row, col }),
        }
    }
}

/// The replacement payload: new text, the formatting snapshot captured from
/// the block before the edit, and optional paragraph-level overrides.
///
/// An absent `page_break_before` leaves the current flag untouched; only an
/// explicit `Some(false)` clears it.
#[derive(Debug, Clone, Default)]
pub struct BlockEdit {
    pub new_text: String,
    pub original_runs: Vec<RunFormat>,
    pub style: Option<String>,
    pub alignment: Option<Alignment>,
    pub page_break_before: Option<bool>,
}

/// Apply a block edit to the document tree.
pub fn edit_block(tree: &mut DocumentTree, locator: BlockLocator, edit: &BlockEdit) -> Result<()> {
    // Style validity has to be resolved before borrowing the target node.
    let style_known = edit.style.as_deref().map(|name| tree.has_style(name));

    match locator {
        BlockLocator::Paragraph(index) => {
            let paragraph = paragraph_mut(tree, index)?;
            repopulate(paragraph, edit, style_known);
        }
        BlockLocator::TableCell { table, row, col } => {
            let cell = primary_cell_mut(tree, table, row, col)?;
            // Multi-paragraph cell content always collapses to one paragraph;
            // newlines in the new text stay literal characters.
            let mut paragraph = ParagraphNode::new();
            repopulate(&mut paragraph, edit, style_known);
            cell.paragraphs = vec![paragraph];
        }
    }
    Ok(())
}

/// Locate the n-th top-level paragraph for mutation.
fn paragraph_mut(tree: &mut DocumentTree, index: usize) -> Result<&mut ParagraphNode> {
    let count = tree.paragraph_count();
    tree.body
        .iter_mut()
        .filter_map(|node| match node {
            BodyNode::Paragraph(paragraph) => Some(paragraph),
            _ => None,
        })
        .nth(index)
        .ok_or_else(|| {
            DocError::IndexOutOfRange(format!(
                "paragraph index {index} out of range (document has {count} paragraphs)"
            ))
        })
}

/// Resolve a (table, row, col) locator to the primary cell carrying content.
///
/// A logical position inside a vertical continuation resolves upward to the
/// cell that opened the span, matching how extraction addresses merged cells.
fn primary_cell_mut<'tree>(
    tree: &'tree mut DocumentTree,
    table_index: usize,
    row: usize,
    col: usize,
) -> Result<&'tree mut TableCellNode> {
    let table_count = tree.table_count();
    let table = tree.table_mut(table_index).ok_or_else(|| {
        DocError::IndexOutOfRange(format!(
            "table index {table_index} out of range (document has {table_count} tables)"
        ))
    })?;
    let row_count = table.rows.len();
    if row >= row_count {
        return Err(DocError::IndexOutOfRange(format!(
            "row {row} out of range (table {table_index} has {row_count} rows)"
        )));
    }
    let primary_row = resolve_primary_row(table, row, col)?;
    // The resolver proved a cell covers (primary_row, col); failing to borrow
    // it back is an association failure, not a caller error.
    table.cell_at_mut(primary_row, col).ok_or_else(|| {
        DocError::MappingFailure(format!(
            "cell at ({primary_row},{col}) of table {table_index} has no backing node"
        ))
    })
}

fn resolve_primary_row(table: &TableNode, row: usize, col: usize) -> Result<usize> {
    let mut current = row;
    loop {
        let cell = table.cell_at(current, col).ok_or_else(|| {
            DocError::IndexOutOfRange(format!("column {col} out of range in row {current}"))
        })?;
        if cell.v_merge != VMerge::Continue || current == 0 {
            return Ok(current);
        }
        current -= 1;
    }
}

/// Rebuild a paragraph's runs from the edit payload, then apply overrides.
///
/// When the new text equals the concatenation of the captured run texts and
/// at least one run was captured, every captured run is reapplied in order
/// (an idempotent reformat). Otherwise the whole new text becomes a single run
/// carrying the first captured format, or no formatting when none was
/// captured.
fn repopulate(paragraph: &mut ParagraphNode, edit: &BlockEdit, style_known: Option<bool>) {
    let original_text: String = edit
        .original_runs
        .iter()
        .map(|run| run.text.as_str())
        .collect();

    paragraph.runs.clear();
    if edit.new_text == original_text && !edit.original_runs.is_empty() {
        for format in &edit.original_runs {
            let mut run = RunNode::default();
            apply_format(format, &mut run);
            paragraph.runs.push(run);
        }
    } else {
        let mut run = RunNode::default();
        match edit.original_runs.first() {
            Some(first) => {
                let format = RunFormat {
                    text: edit.new_text.clone(),
                    ..first.clone()
                };
                apply_format(&format, &mut run);
            }
            None => run.text = edit.new_text.clone(),
        }
        paragraph.runs.push(run);
    }

    match (&edit.style, style_known) {
        (Some(name), Some(true)) => paragraph.style = Some(name.clone()),
        (Some(name), _) => {
            warn!("style {name:?} is not defined in this document; keeping the current style");
        }
        (None, _) => {}
    }
    if let Some(alignment) = edit.alignment {
        paragraph.alignment = Some(alignment);
    }
    if let Some(flag) = edit.page_break_before {
        paragraph.page_break_before = flag;
    }
}
