//! Writing the markup tree back to a .docx container
//!
//! The writer rebuilds the document through the `docx-rs` builders: style
//! definitions for every known style, paragraphs with their runs and
//! properties, tables with grid-span and vertical-merge cells. Literal
//! newlines inside run text become text-wrapping breaks so word processors
//! render them as line breaks.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use docx_rs::{
    AlignmentType, BreakType, Docx, Paragraph, Run, RunFonts, Style, StyleType, Table, TableCell,
    TableRow, VMergeType,
};
use log::debug;

use crate::dom::{Alignment, BodyNode, DocumentTree, ParagraphNode, RunNode, TableNode, VMerge};
use crate::error::{DocError, Result};

/// Write a document tree to disk.
pub fn write_document(tree: &DocumentTree, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_document_to(tree, file)
}

/// Write a document tree to any seekable sink.
pub fn write_document_to<W: Write + Seek>(tree: &DocumentTree, writer: W) -> Result<()> {
    let mut docx = Docx::new();

    for style in &tree.styles {
        docx = docx.add_style(
            Style::new(style.style_id.as_str(), StyleType::Paragraph).name(style.name.as_str()),
        );
    }

    for node in &tree.body {
        match node {
            BodyNode::Paragraph(paragraph) => {
                docx = docx.add_paragraph(build_paragraph(paragraph, tree));
            }
            BodyNode::Table(table) => {
                docx = docx.add_table(build_table(table, tree));
            }
            BodyNode::Unsupported(tag) => {
                debug!("dropping unsupported body node <{tag}> on save");
            }
        }
    }

    docx.build()
        .pack(writer)
        .map_err(|err| DocError::InvalidDocument(format!("failed to pack container: {err}")))?;
    Ok(())
}

fn build_paragraph(paragraph: &ParagraphNode, tree: &DocumentTree) -> Paragraph {
    let mut out = Paragraph::new();
    for run in &paragraph.runs {
        out = out.add_run(build_run(run));
    }
    if let Some(style) = &paragraph.style {
        out = out.style(&tree.style_id_for(style));
    }
    if let Some(alignment) = paragraph.alignment {
        out = out.align(map_alignment(alignment));
    }
    if paragraph.page_break_before {
        out = out.page_break_before(true);
    }
    out
}

fn build_run(run: &RunNode) -> Run {
    let mut out = Run::new();

    // Literal newlines become text-wrapping breaks.
    let mut first = true;
    for line in run.text.split('\n') {
        if !first {
            out = out.add_break(BreakType::TextWrapping);
        }
        if !line.is_empty() {
            out = out.add_text(line);
        }
        first = false;
    }
    if run.page_break {
        out = out.add_break(BreakType::Page);
    }

    if run.bold {
        out = out.bold();
    }
    if run.italic {
        out = out.italic();
    }
    if run.underline {
        out = out.underline("single");
    }
    if let Some(size) = run.size {
        // docx stores sizes in half-points.
        out = out.size((size * 2.0).round() as usize);
    }
    if let Some(color) = &run.color {
        out = out.color(color.as_str());
    }
    if run.font.is_some() || run.east_asia_font.is_some() {
        let mut fonts = RunFonts::new();
        if let Some(font) = &run.font {
            fonts = fonts.ascii(font.as_str());
        }
        if let Some(font) = &run.east_asia_font {
            fonts = fonts.east_asia(font.as_str());
        }
        out = out.fonts(fonts);
    }
    out
}

fn build_table(table: &TableNode, tree: &DocumentTree) -> Table {
    let mut rows = Vec::new();
    for row in &table.rows {
        let mut cells = Vec::new();
        for cell in &row.cells {
            let mut out = TableCell::new();
            for paragraph in &cell.paragraphs {
                out = out.add_paragraph(build_paragraph(paragraph, tree));
            }
            if cell.paragraphs.is_empty() {
                // A table cell must hold at least one paragraph.
                out = out.add_paragraph(Paragraph::new());
            }
            if cell.span() > 1 {
                out = out.grid_span(cell.span());
            }
            match cell.v_merge {
                VMerge::Restart => out = out.vertical_merge(VMergeType::Restart),
                VMerge::Continue => out = out.vertical_merge(VMergeType::Continue),
                VMerge::None => {}
            }
            cells.push(out);
        }
        rows.push(TableRow::new(cells));
    }
    Table::new(rows)
}

fn map_alignment(alignment: Alignment) -> AlignmentType {
    match alignment {
        Alignment::Left => AlignmentType::Left,
        Alignment::Center => AlignmentType::Center,
        Alignment::Right => AlignmentType::Right,
        Alignment::Justify => AlignmentType::Both,
        // The thai-distribute justification has no dedicated builder value;
        // distribute is the closest the writer can emit.
        Alignment::Distribute | Alignment::ThaiJustify => AlignmentType::Distribute,
    }
}
