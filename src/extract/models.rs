//! Data structures for extracted document content
//!
//! This module defines the public types produced by content extraction: the
//! ordered [`ContentBlock`] list and the flat [`RunFormat`] record used to
//! carry inline formatting through edits.

use serde::{Deserialize, Serialize};

use crate::dom::Alignment;

/// A flat record of one run's text and inline formatting.
///
/// This is the unit the editors capture and reapply: everything needed to
/// rebuild a run, with no references back into the markup tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunFormat {
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Font size in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    /// Color as six hex digits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl RunFormat {
    /// A plain record with no formatting set.
    pub fn plain(text: impl Into<String>) -> RunFormat {
        RunFormat {
            text: text.into(),
            ..RunFormat::default()
        }
    }
}

/// One structural unit of extracted content, in document order.
///
/// A table contributes one `TableMetadata` block followed by one `TableCell`
/// block per primary (top-left-of-merge) cell; continuation cells covered by
/// a merge emit nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentBlock {
    Paragraph {
        id: usize,
        sequence: usize,
        paragraph_index: usize,
        text: String,
        style: Option<String>,
        alignment: Option<Alignment>,
        page_break_before: bool,
        runs: Vec<RunFormat>,
    },
    Heading {
        id: usize,
        sequence: usize,
        paragraph_index: usize,
        level: u8,
        text: String,
        style: Option<String>,
        alignment: Option<Alignment>,
        page_break_before: bool,
        runs: Vec<RunFormat>,
    },
    TableMetadata {
        id: usize,
        sequence: usize,
        table_index: usize,
        rows: usize,
        cols: usize,
        style: Option<String>,
    },
    TableCell {
        id: usize,
        sequence: usize,
        table_index: usize,
        row: usize,
        col: usize,
        row_span: usize,
        col_span: usize,
        text: String,
        style: Option<String>,
        alignment: Option<Alignment>,
        page_break_before: bool,
        runs: Vec<RunFormat>,
    },
}

impl ContentBlock {
    pub fn id(&self) -> usize {
        match self {
            ContentBlock::Paragraph { id, .. }
            | ContentBlock::Heading { id, .. }
            | ContentBlock::TableMetadata { id, .. }
            | ContentBlock::TableCell { id, .. } => *id,
        }
    }

    pub fn sequence(&self) -> usize {
        match self {
            ContentBlock::Paragraph { sequence, .. }
            | ContentBlock::Heading { sequence, .. }
            | ContentBlock::TableMetadata { sequence, .. }
            | ContentBlock::TableCell { sequence, .. } => *sequence,
        }
    }

    /// Textual payload of content-bearing blocks; `None` for table metadata.
    pub fn text(&self) -> Option<&str> {
        match self {
            ContentBlock::Paragraph { text, .. }
            | ContentBlock::Heading { text, .. }
            | ContentBlock::TableCell { text, .. } => Some(text),
            ContentBlock::TableMetadata { .. } => None,
        }
    }

    /// Captured run records of content-bearing blocks.
    pub fn runs(&self) -> &[RunFormat] {
        match self {
            ContentBlock::Paragraph { runs, .. }
            | ContentBlock::Heading { runs, .. }
            | ContentBlock::TableCell { runs, .. } => runs,
            ContentBlock::TableMetadata { .. } => &[],
        }
    }
}
