//! In-memory markup tree for a word-processing document
//!
//! This module defines the mutable document model that every operation in the
//! crate works against: an ordered sequence of body nodes, each a paragraph or
//! a table, carrying the same descriptors the underlying WordprocessingML
//! exposes (style names, justification, page-break flags, run properties,
//! vertical-merge and grid-span markers).
//!
//! The tree is plain data. Structural relationships (which primary cell owns a
//! grid position, which body slot holds the n-th paragraph) are computed as
//! index maps per operation rather than stored as back-pointers.

use serde::{Deserialize, Serialize};

/// Paragraph justification, mirroring the `w:jc` value set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    Distribute,
    ThaiJustify,
}

impl Alignment {
    /// Parse a `w:jc` attribute value.
    pub fn from_jc(val: &str) -> Option<Alignment> {
        match val {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" => Some(Alignment::Justify),
            "distribute" => Some(Alignment::Distribute),
            "thaiDistribute" => Some(Alignment::ThaiJustify),
            _ => None,
        }
    }

    /// Parse a human-facing name, as accepted on the command line.
    pub fn from_name(name: &str) -> Option<Alignment> {
        match name.to_ascii_lowercase().as_str() {
            "left" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            "distribute" => Some(Alignment::Distribute),
            "thai-justify" | "thai_justify" | "thaijustify" => Some(Alignment::ThaiJustify),
            _ => None,
        }
    }
}

/// Vertical-merge marker on a table cell.
///
/// `Restart` opens a vertical span; `Continue` extends the span opened in the
/// row above; `None` means the cell is not vertically merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VMerge {
    #[default]
    None,
    Restart,
    Continue,
}

/// A contiguous fragment of formatted text inside a paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunNode {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Primary (ASCII/Latin) font name.
    pub font: Option<String>,
    /// East-Asian font override. Kept separate because the markup stores it
    /// separately; leaving it unset makes East-Asian glyphs fall back to a
    /// different font than the one requested.
    pub east_asia_font: Option<String>,
    /// Font size in points.
    pub size: Option<f32>,
    /// Color as six hex digits, e.g. `FF0000`.
    pub color: Option<String>,
    /// The run contains an explicit page-type break marker.
    pub page_break: bool,
}

impl RunNode {
    /// A plain, unformatted run.
    pub fn text(text: impl Into<String>) -> RunNode {
        RunNode {
            text: text.into(),
            ..RunNode::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphNode {
    /// Display name of the paragraph style ("Heading 1", "Normal", ...).
    pub style: Option<String>,
    pub alignment: Option<Alignment>,
    /// The paragraph-level page-break-before property.
    pub page_break_before: bool,
    pub runs: Vec<RunNode>,
}

impl ParagraphNode {
    pub fn new() -> ParagraphNode {
        ParagraphNode::default()
    }

    /// A paragraph holding a single plain run.
    pub fn with_text(text: impl Into<String>) -> ParagraphNode {
        ParagraphNode {
            runs: vec![RunNode::text(text)],
            ..ParagraphNode::default()
        }
    }

    pub fn style(mut self, name: impl Into<String>) -> ParagraphNode {
        self.style = Some(name.into());
        self
    }

    pub fn align(mut self, alignment: Alignment) -> ParagraphNode {
        self.alignment = Some(alignment);
        self
    }

    pub fn page_break_before(mut self, flag: bool) -> ParagraphNode {
        self.page_break_before = flag;
        self
    }

    pub fn add_run(mut self, run: RunNode) -> ParagraphNode {
        self.runs.push(run);
        self
    }

    /// Effective style name; unstyled paragraphs resolve to "Normal".
    pub fn style_name(&self) -> &str {
        self.style.as_deref().unwrap_or("Normal")
    }

    /// Concatenated text of all runs, in order.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Replace the paragraph content with a single unformatted run.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.runs = vec![RunNode::text(text)];
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCellNode {
    pub v_merge: VMerge,
    /// Number of logical grid columns this cell covers (>= 1).
    pub grid_span: usize,
    pub paragraphs: Vec<ParagraphNode>,
}

impl TableCellNode {
    pub fn new() -> TableCellNode {
        TableCellNode {
            grid_span: 1,
            ..TableCellNode::default()
        }
    }

    /// A cell holding a single paragraph of plain text.
    pub fn with_text(text: impl Into<String>) -> TableCellNode {
        TableCellNode {
            grid_span: 1,
            paragraphs: vec![ParagraphNode::with_text(text)],
            ..TableCellNode::default()
        }
    }

    pub fn v_merge(mut self, marker: VMerge) -> TableCellNode {
        self.v_merge = marker;
        self
    }

    pub fn grid_span(mut self, span: usize) -> TableCellNode {
        self.grid_span = span.max(1);
        self
    }

    pub fn add_paragraph(mut self, paragraph: ParagraphNode) -> TableCellNode {
        self.paragraphs.push(paragraph);
        self
    }

    /// Newline-joined text of all paragraphs in the cell.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(ParagraphNode::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Logical columns covered by this cell, never less than one.
    pub fn span(&self) -> usize {
        self.grid_span.max(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRowNode {
    pub cells: Vec<TableCellNode>,
}

impl TableRowNode {
    pub fn new(cells: Vec<TableCellNode>) -> TableRowNode {
        TableRowNode { cells }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableNode {
    /// Display name of the table style, when one is set.
    pub style: Option<String>,
    /// Column count from the table's grid definition; 0 when absent.
    pub grid_cols: usize,
    pub rows: Vec<TableRowNode>,
}

impl TableNode {
    pub fn new(grid_cols: usize) -> TableNode {
        TableNode {
            grid_cols,
            ..TableNode::default()
        }
    }

    pub fn style(mut self, name: impl Into<String>) -> TableNode {
        self.style = Some(name.into());
        self
    }

    pub fn add_row(mut self, row: TableRowNode) -> TableNode {
        self.rows.push(row);
        self
    }

    /// The physical cell covering logical column `col` in row `row`.
    ///
    /// Each physical cell occupies `grid_span` consecutive logical columns;
    /// a lookup in the middle of a span resolves to the covering cell.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&TableCellNode> {
        let mut cursor = 0;
        for cell in &self.rows.get(row)?.cells {
            let next = cursor + cell.span();
            if col < next {
                return Some(cell);
            }
            cursor = next;
        }
        None
    }

    pub fn cell_at_mut(&mut self, row: usize, col: usize) -> Option<&mut TableCellNode> {
        let mut cursor = 0;
        for cell in &mut self.rows.get_mut(row)?.cells {
            let next = cursor + cell.span();
            if col < next {
                return Some(cell);
            }
            cursor = next;
        }
        None
    }

    /// Physical index and starting logical column of the cell covering `col`.
    pub fn cell_index_at(&self, row: usize, col: usize) -> Option<(usize, usize)> {
        let mut cursor = 0;
        for (index, cell) in self.rows.get(row)?.cells.iter().enumerate() {
            let next = cursor + cell.span();
            if col < next {
                return Some((index, cursor));
            }
            cursor = next;
        }
        None
    }
}

/// A known paragraph style: markup identifier plus display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleInfo {
    pub style_id: String,
    pub name: String,
}

/// One top-level node of the document body.
///
/// `Unsupported` preserves the tag name of body content the model does not
/// represent (section properties, structured document tags, ...) so traversal
/// can skip it explicitly instead of silently losing track of positions.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyNode {
    Paragraph(ParagraphNode),
    Table(TableNode),
    Unsupported(String),
}

/// The in-memory document: ordered body nodes plus the known style registry.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTree {
    pub body: Vec<BodyNode>,
    pub styles: Vec<StyleInfo>,
}

impl Default for DocumentTree {
    fn default() -> DocumentTree {
        DocumentTree::new()
    }
}

impl DocumentTree {
    /// An empty document seeded with the built-in paragraph styles.
    pub fn new() -> DocumentTree {
        let mut styles = vec![StyleInfo {
            style_id: "Normal".to_string(),
            name: "Normal".to_string(),
        }];
        for level in 1..=9 {
            styles.push(StyleInfo {
                style_id: format!("Heading{level}"),
                name: format!("Heading {level}"),
            });
        }
        DocumentTree {
            body: Vec::new(),
            styles,
        }
    }

    pub fn add_paragraph(mut self, paragraph: ParagraphNode) -> DocumentTree {
        self.body.push(BodyNode::Paragraph(paragraph));
        self
    }

    pub fn add_table(mut self, table: TableNode) -> DocumentTree {
        self.body.push(BodyNode::Table(table));
        self
    }

    /// Top-level paragraphs in body order (paragraphs inside table cells are
    /// not included).
    pub fn paragraphs(&self) -> impl Iterator<Item = &ParagraphNode> {
        self.body.iter().filter_map(|node| match node {
            BodyNode::Paragraph(para) => Some(para),
            _ => None,
        })
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Body positions of the top-level paragraphs, in paragraph order.
    ///
    /// Built fresh per operation; editing the body invalidates the map.
    pub fn paragraph_body_indices(&self) -> Vec<usize> {
        self.body
            .iter()
            .enumerate()
            .filter_map(|(index, node)| match node {
                BodyNode::Paragraph(_) => Some(index),
                _ => None,
            })
            .collect()
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableNode> {
        self.body.iter().filter_map(|node| match node {
            BodyNode::Table(table) => Some(table),
            _ => None,
        })
    }

    pub fn table(&self, index: usize) -> Option<&TableNode> {
        self.tables().nth(index)
    }

    pub fn table_mut(&mut self, index: usize) -> Option<&mut TableNode> {
        self.body
            .iter_mut()
            .filter_map(|node| match node {
                BodyNode::Table(table) => Some(table),
                _ => None,
            })
            .nth(index)
    }

    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    /// Whether `name` is a known paragraph style display name.
    pub fn has_style(&self, name: &str) -> bool {
        self.styles.iter().any(|style| style.name == name)
    }

    /// Markup identifier for a style display name. Unknown names fall back to
    /// the name with whitespace removed, which matches the identifiers word
    /// processors generate.
    pub fn style_id_for(&self, name: &str) -> String {
        self.styles
            .iter()
            .find(|style| style.name == name)
            .map(|style| style.style_id.clone())
            .unwrap_or_else(|| name.split_whitespace().collect())
    }
}
