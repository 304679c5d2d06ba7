//! Simple document operations
//!
//! The unconditioned counterparts to the format-preserving editors: plain
//! search, search-and-replace, content insertion, deletion, and cell merging.
//! None of these carry formatting guarantees: a replace collapses affected
//! paragraphs to a single unformatted run, and that is the documented
//! contract.

use log::{debug, warn};
use serde::Serialize;

use crate::dom::{
    Alignment, BodyNode, ParagraphNode, RunNode, TableCellNode, TableNode, TableRowNode, VMerge,
};
use crate::error::{DocError, Result};
use crate::extract::{RunFormat, logical_column_count};
use crate::formatting::apply_format;
use crate::session::Session;

/// Where a search or replace hit landed.
///
/// Table positions are logical grid coordinates (the starting column of the
/// physical cell), matching the addressing used by extraction and the block
/// editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HitLocation {
    Paragraph { index: usize },
    TableCell { table: usize, row: usize, col: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub location: HitLocation,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replacement {
    pub location: HitLocation,
    pub original: String,
    pub replaced: String,
    pub occurrences: usize,
}

impl Session {
    /// Find every paragraph and table cell containing `keyword`.
    pub fn search_text(&self, keyword: &str) -> Result<Vec<SearchHit>> {
        let tree = self.document()?;
        let mut hits = Vec::new();

        for (index, paragraph) in tree.paragraphs().enumerate() {
            let text = paragraph.text();
            if text.contains(keyword) {
                hits.push(SearchHit {
                    location: HitLocation::Paragraph { index },
                    text,
                });
            }
        }

        for (table_index, table) in tree.tables().enumerate() {
            for (row, table_row) in table.rows.iter().enumerate() {
                let mut col = 0;
                for cell in &table_row.cells {
                    let text = cell.text();
                    if text.contains(keyword) {
                        hits.push(SearchHit {
                            location: HitLocation::TableCell {
                                table: table_index,
                                row,
                                col,
                            },
                            text,
                        });
                    }
                    col += cell.span();
                }
            }
        }
        Ok(hits)
    }

    /// Replace every occurrence of `keyword` with `replacement`.
    ///
    /// With `preview` set, reports what would change without mutating the
    /// document. Affected paragraphs collapse to a single unformatted run.
    pub fn search_and_replace(
        &mut self,
        keyword: &str,
        replacement: &str,
        preview: bool,
    ) -> Result<Vec<Replacement>> {
        if keyword.is_empty() {
            return Err(DocError::InvalidArgument(
                "search keyword must not be empty".to_string(),
            ));
        }
        let tree = self.document_mut()?;
        let mut replacements = Vec::new();

        let mut paragraph_index = 0;
        let mut table_index = 0;
        for node in &mut tree.body {
            match node {
                BodyNode::Paragraph(paragraph) => {
                    let original = paragraph.text();
                    if original.contains(keyword) {
                        let replaced = original.replace(keyword, replacement);
                        replacements.push(Replacement {
                            location: HitLocation::Paragraph {
                                index: paragraph_index,
                            },
                            original: original.clone(),
                            replaced: replaced.clone(),
                            occurrences: original.matches(keyword).count(),
                        });
                        if !preview {
                            paragraph.set_text(replaced);
                        }
                    }
                    paragraph_index += 1;
                }
                BodyNode::Table(table) => {
                    for (row, table_row) in table.rows.iter_mut().enumerate() {
                        let mut col = 0;
                        for cell in &mut table_row.cells {
                            let original = cell.text();
                            if original.contains(keyword) {
                                let replaced = original.replace(keyword, replacement);
                                let occurrences = original.matches(keyword).count();
                                replacements.push(Replacement {
                                    location: HitLocation::TableCell {
                                        table: table_index,
                                        row,
                                        col,
                                    },
                                    original,
                                    replaced,
                                    occurrences,
                                });
                                if !preview {
                                    for paragraph in &mut cell.paragraphs {
                                        let text = paragraph.text();
                                        if text.contains(keyword) {
                                            paragraph.set_text(text.replace(keyword, replacement));
                                        }
                                    }
                                }
                            }
                            col += cell.span();
                        }
                    }
                    table_index += 1;
                }
                BodyNode::Unsupported(_) => {}
            }
        }
        Ok(replacements)
    }

    /// Append a paragraph, optionally styled, aligned, and formatted.
    pub fn add_paragraph(
        &mut self,
        text: &str,
        style: Option<&str>,
        alignment: Option<Alignment>,
        format: Option<&RunFormat>,
    ) -> Result<()> {
        let style_known = match style {
            Some(name) => Some((name.to_string(), self.document()?.has_style(name))),
            None => None,
        };
        let tree = self.document_mut()?;

        let mut run = RunNode::default();
        match format {
            Some(format) => apply_format(
                &RunFormat {
                    text: text.to_string(),
                    ..format.clone()
                },
                &mut run,
            ),
            None => run.text = text.to_string(),
        }

        let mut paragraph = ParagraphNode::new().add_run(run);
        if let Some((name, known)) = style_known {
            if known {
                paragraph.style = Some(name);
            } else {
                warn!("style {name:?} is not defined in this document; adding an unstyled paragraph");
            }
        }
        paragraph.alignment = alignment;
        tree.body.push(BodyNode::Paragraph(paragraph));
        Ok(())
    }

    /// Append a heading paragraph at the given level (style "Heading N").
    pub fn add_heading(&mut self, text: &str, level: u8) -> Result<()> {
        let style = format!("Heading {level}");
        let tree = self.document_mut()?;
        if !tree.has_style(&style) {
            warn!("style {style:?} is not defined in this document");
        }
        tree.body
            .push(BodyNode::Paragraph(ParagraphNode::with_text(text).style(style)));
        Ok(())
    }

    /// Append an empty-celled table, optionally filled row-major from `data`.
    pub fn add_table(&mut self, rows: usize, cols: usize, data: Option<&[Vec<String>]>) -> Result<()> {
        if rows == 0 || cols == 0 {
            return Err(DocError::InvalidArgument(
                "a table needs at least one row and one column".to_string(),
            ));
        }
        let tree = self.document_mut()?;
        let mut table = TableNode::new(cols);
        for row in 0..rows {
            let cells = (0..cols)
                .map(|col| {
                    let text = data
                        .and_then(|rows| rows.get(row))
                        .and_then(|cells| cells.get(col))
                        .cloned()
                        .unwrap_or_default();
                    TableCellNode::with_text(text)
                })
                .collect();
            table = table.add_row(TableRowNode::new(cells));
        }
        tree.body.push(BodyNode::Table(table));
        Ok(())
    }

    /// Append a row to a table, optionally filled from `data`.
    pub fn add_table_row(&mut self, table_index: usize, data: Option<&[String]>) -> Result<()> {
        let tree = self.document_mut()?;
        let table_count = tree.table_count();
        let table = tree.table_mut(table_index).ok_or_else(|| {
            DocError::IndexOutOfRange(format!(
                "table index {table_index} out of range (document has {table_count} tables)"
            ))
        })?;
        let cols = logical_column_count(table).max(1);
        let cells = (0..cols)
            .map(|col| {
                let text = data
                    .and_then(|values| values.get(col))
                    .cloned()
                    .unwrap_or_default();
                TableCellNode::with_text(text)
            })
            .collect();
        table.rows.push(TableRowNode::new(cells));
        Ok(())
    }

    /// Remove one row from a table.
    pub fn delete_table_row(&mut self, table_index: usize, row: usize) -> Result<()> {
        let tree = self.document_mut()?;
        let table_count = tree.table_count();
        let table = tree.table_mut(table_index).ok_or_else(|| {
            DocError::IndexOutOfRange(format!(
                "table index {table_index} out of range (document has {table_count} tables)"
            ))
        })?;
        if row >= table.rows.len() {
            return Err(DocError::IndexOutOfRange(format!(
                "row {row} out of range (table {table_index} has {} rows)",
                table.rows.len()
            )));
        }
        table.rows.remove(row);
        Ok(())
    }

    /// Remove the n-th top-level paragraph.
    pub fn delete_paragraph(&mut self, index: usize) -> Result<()> {
        let tree = self.document_mut()?;
        let paragraph_body = tree.paragraph_body_indices();
        let body_index = paragraph_body.get(index).copied().ok_or_else(|| {
            DocError::IndexOutOfRange(format!(
                "paragraph index {index} out of range (document has {} paragraphs)",
                paragraph_body.len()
            ))
        })?;
        tree.body.remove(body_index);
        Ok(())
    }

    /// Append a paragraph holding an explicit page break.
    pub fn add_page_break(&mut self) -> Result<()> {
        let tree = self.document_mut()?;
        let run = RunNode {
            page_break: true,
            ..RunNode::default()
        };
        tree.body
            .push(BodyNode::Paragraph(ParagraphNode::new().add_run(run)));
        Ok(())
    }

    /// Merge the rectangle of cells from `(start_row, start_col)` through
    /// `(end_row, end_col)` inclusive, in logical grid coordinates.
    ///
    /// The top-left cell becomes the primary of the region: it receives the
    /// horizontal span, opens the vertical merge, and keeps its content.
    /// Every row is validated against the requested rectangle before any row
    /// is touched, so the merge either applies to the whole region or not at
    /// all.
    pub fn merge_table_cells(
        &mut self,
        table_index: usize,
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    ) -> Result<()> {
        if end_row < start_row || end_col < start_col {
            return Err(DocError::InvalidArgument(format!(
                "merge region ({start_row},{start_col})..({end_row},{end_col}) is inverted"
            )));
        }
        let tree = self.document_mut()?;
        let table_count = tree.table_count();
        let table = tree.table_mut(table_index).ok_or_else(|| {
            DocError::IndexOutOfRange(format!(
                "table index {table_index} out of range (document has {table_count} tables)"
            ))
        })?;
        let rows = table.rows.len();
        let cols = logical_column_count(table);
        if end_row >= rows || end_col >= cols {
            return Err(DocError::IndexOutOfRange(format!(
                "merge region ({start_row},{start_col})..({end_row},{end_col}) exceeds the {rows}x{cols} table"
            )));
        }

        // First pass: every row must align with the rectangle's edges and
        // must not intersect an existing merged region.
        for row in start_row..=end_row {
            let (_, carrier_start) = table.cell_index_at(row, start_col).ok_or_else(|| {
                DocError::IndexOutOfRange(format!("row {row} has no cell at column {start_col}"))
            })?;
            if carrier_start != start_col {
                return Err(DocError::InvalidArgument(format!(
                    "column {start_col} in row {row} is inside an existing horizontal span"
                )));
            }
            let mut col = start_col;
            while col <= end_col {
                let Some(cell) = table.cell_at(row, col) else {
                    return Err(DocError::IndexOutOfRange(format!(
                        "row {row} has no cell at column {col}"
                    )));
                };
                if (row > start_row || col > start_col) && cell.v_merge != VMerge::None {
                    return Err(DocError::InvalidArgument(format!(
                        "cell at ({row},{col}) already belongs to a vertical merge"
                    )));
                }
                col += cell.span();
            }
            if col != end_col + 1 {
                return Err(DocError::InvalidArgument(format!(
                    "an existing span in row {row} crosses column {end_col}"
                )));
            }
        }

        // Second pass: rewrite each row. The carrier cell absorbs the
        // horizontal span; physically spanned cells disappear from the row.
        let span = end_col - start_col + 1;
        let vertical = end_row > start_row;
        for row in start_row..=end_row {
            let Some((carrier_index, _)) = table.cell_index_at(row, start_col) else {
                continue;
            };
            let mut removed = 0;
            if let Some(table_row) = table.rows.get_mut(row) {
                let mut covered = table_row
                    .cells
                    .get(carrier_index)
                    .map(TableCellNode::span)
                    .unwrap_or(1);
                while covered < span && carrier_index + 1 < table_row.cells.len() {
                    let cell = table_row.cells.remove(carrier_index + 1);
                    covered += cell.span();
                    removed += 1;
                    if !cell.text().is_empty() {
                        debug!(
                            "dropping content of horizontally merged cell at row {row}: {:?}",
                            cell.text()
                        );
                    }
                }
                if let Some(carrier) = table_row.cells.get_mut(carrier_index) {
                    carrier.grid_span = span;
                    carrier.v_merge = if !vertical {
                        VMerge::None
                    } else if row == start_row {
                        VMerge::Restart
                    } else {
                        VMerge::Continue
                    };
                }
            }
            debug!("merged {removed} cells into ({row},{start_col})");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DocumentTree;
    use crate::extract::ContentBlock;

    fn session_with(tree: DocumentTree) -> Session {
        let mut session = Session::new();
        session.attach("test.docx", tree);
        session
    }

    fn grid_table(rows: usize, cols: usize) -> TableNode {
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
    fn search_finds_paragraphs_and_cells() {
        let tree = DocumentTree::new()
            .add_paragraph(ParagraphNode::with_text("alpha beta"))
            .add_table(grid_table(2, 2))
            .add_paragraph(ParagraphNode::with_text("gamma"));
        let session = session_with(tree);

        let hits = session.search_text("r1c0").expect("search succeeds");
        assert_eq!(hits.len(), 1);
        assert_eq!(
            hits[0].location,
            HitLocation::TableCell { table: 0, row: 1, col: 0 }
        );

        let hits = session.search_text("alpha").expect("search succeeds");
        assert_eq!(hits[0].location, HitLocation::Paragraph { index: 0 });
    }

    #[test]
    fn preview_replace_reports_without_mutating() {
        let tree = DocumentTree::new().add_paragraph(ParagraphNode::with_text("old old"));
        let mut session = session_with(tree);

        let replacements = session
            .search_and_replace("old", "new", true)
            .expect("preview succeeds");
        assert_eq!(replacements.len(), 1);
        assert_eq!(replacements[0].occurrences, 2);
        assert_eq!(replacements[0].replaced, "new new");

        let blocks = session.extract().expect("extraction succeeds");
        assert_eq!(blocks[0].text(), Some("old old"), "preview must not mutate");
    }

    #[test]
    fn replace_collapses_paragraph_to_plain_run() {
        let paragraph = ParagraphNode::new()
            .add_run(RunNode { text: "old ".to_string(), bold: true, ..RunNode::default() })
            .add_run(RunNode::text("value"));
        let mut session = session_with(DocumentTree::new().add_paragraph(paragraph));

        session
            .search_and_replace("old", "new", false)
            .expect("replace succeeds");
        let blocks = session.extract().expect("extraction succeeds");
        assert_eq!(blocks[0].text(), Some("new value"));
        assert_eq!(blocks[0].runs().len(), 1, "replace is unconditioned");
        assert!(!blocks[0].runs()[0].bold);
    }

    #[test]
    fn merge_then_extract_reports_merged_geometry() {
        let mut session = session_with(DocumentTree::new().add_table(grid_table(3, 3)));
        session
            .merge_table_cells(0, 0, 0, 1, 1)
            .expect("merge succeeds");

        let blocks = session.extract().expect("extraction succeeds");
        let cells: Vec<_> = blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::TableCell { row, col, row_span, col_span, .. } => {
                    Some((*row, *col, *row_span, *col_span))
                }
                _ => None,
            })
            .collect();

        assert_eq!(cells.len(), 6, "one merged block plus five singles");
        assert!(cells.contains(&(0, 0, 2, 2)), "primary carries both spans");
        assert!(!cells.iter().any(|&(r, c, ..)| (r, c) == (1, 1)));
    }

    #[test]
    fn merge_validation_rejects_crossing_spans_without_mutating() {
        let mut table = grid_table(2, 3);
        // Row 1 already spans columns 1-2.
        table.rows[1].cells.remove(2);
        table.rows[1].cells[1].grid_span = 2;
        let mut session = session_with(DocumentTree::new().add_table(table));

        let before = session.extract().expect("extraction succeeds");
        let err = session
            .merge_table_cells(0, 0, 0, 1, 1)
            .expect_err("crossing span must be rejected");
        assert!(matches!(err, DocError::InvalidArgument(_)));
        let after = session.extract().expect("extraction succeeds");
        assert_eq!(before, after, "failed merge must not mutate the table");
    }

    #[test]
    fn row_and_paragraph_deletion_validate_indices() {
        let tree = DocumentTree::new()
            .add_paragraph(ParagraphNode::with_text("only"))
            .add_table(grid_table(1, 1));
        let mut session = session_with(tree);

        assert!(matches!(
            session.delete_table_row(0, 5),
            Err(DocError::IndexOutOfRange(_))
        ));
        assert!(matches!(
            session.delete_paragraph(3),
            Err(DocError::IndexOutOfRange(_))
        ));
        session.delete_paragraph(0).expect("valid index deletes");
        assert_eq!(session.document().expect("open").paragraph_count(), 0);
    }

    #[test]
    fn add_operations_build_expected_nodes() {
        let mut session = session_with(DocumentTree::new());
        session.add_heading("Overview", 2).expect("heading appends");
        session
            .add_paragraph("body", None, Some(Alignment::Center), None)
            .expect("paragraph appends");
        session.add_table(2, 2, None).expect("table appends");
        session
            .add_table_row(0, Some(&["a".to_string(), "b".to_string()]))
            .expect("row appends");
        session.add_page_break().expect("page break appends");

        let blocks = session.extract().expect("extraction succeeds");
        assert!(matches!(
            blocks[0],
            ContentBlock::Heading { level: 2, .. }
        ));
        let table = session.document().expect("open").table(0).expect("table exists");
        assert_eq!(table.rows.len(), 3);
        let last = blocks.last().expect("blocks are not empty");
        assert!(matches!(
            last,
            ContentBlock::Paragraph { page_break_before: true, .. }
        ));
    }
}
