//! Reading .docx containers into the markup tree
//!
//! A .docx file is a zip package; the document body lives in
//! `word/document.xml` and the style definitions in `word/styles.xml`. The
//! reader parses both with `roxmltree` and builds a [`DocumentTree`],
//! resolving style identifiers to display names and merge descriptors to the
//! model's vertical-merge/grid-span fields. Body content the model does not
//! represent is preserved as `BodyNode::Unsupported` so traversal stays
//! position-faithful.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use log::warn;
use zip::ZipArchive;

use crate::dom::{
    Alignment, BodyNode, DocumentTree, ParagraphNode, RunNode, StyleInfo, TableCellNode, TableNode,
    TableRowNode, VMerge,
};
use crate::error::{DocError, Result};

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Validate that the file looks like a Word document container.
pub fn validate_docx_file(path: &Path) -> Result<()> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    if extension != "docx" {
        return Err(DocError::InvalidDocument(format!(
            "expected a .docx file, got .{extension}"
        )));
    }

    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|err| DocError::InvalidDocument(format!("not a zip container: {err}")))?;
    if archive.by_name("word/document.xml").is_err() {
        if archive.by_name("xl/workbook.xml").is_ok() {
            return Err(DocError::InvalidDocument(
                "this is a spreadsheet (.xlsx), not a Word document".to_string(),
            ));
        }
        return Err(DocError::InvalidDocument(
            "missing word/document.xml; the file may be corrupted".to_string(),
        ));
    }
    Ok(())
}

/// Read a document from disk.
pub fn read_document(path: &Path) -> Result<DocumentTree> {
    validate_docx_file(path)?;
    let file = File::open(path)?;
    read_document_from(file)
}

/// Read a document from any seekable byte source.
pub fn read_document_from<R: Read + Seek>(reader: R) -> Result<DocumentTree> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|err| DocError::InvalidDocument(format!("not a zip container: {err}")))?;

    let styles = match read_zip_text(&mut archive, "word/styles.xml") {
        Some(xml) => parse_styles(&xml)?,
        None => Vec::new(),
    };

    let document_xml = read_zip_text(&mut archive, "word/document.xml").ok_or_else(|| {
        DocError::InvalidDocument("missing word/document.xml".to_string())
    })?;
    parse_document(&document_xml, styles)
}

fn read_zip_text<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Option<String> {
    let mut content = String::new();
    archive.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

/// Find a WordprocessingML child element by local name.
fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|child| child.tag_name().name() == name && child.tag_name().namespace() == Some(WML_NS))
}

/// The `w:val` attribute of a WordprocessingML child element.
fn wml_attr<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|found| found.attribute((WML_NS, "val")))
}

/// A WordprocessingML boolean toggle: present with no value (or any value
/// other than "0"/"false") means true.
fn wml_bool(node: roxmltree::Node, name: &str) -> Option<bool> {
    wml(node, name).map(|found| {
        found
            .attribute((WML_NS, "val"))
            .is_none_or(|val| val != "0" && val != "false")
    })
}

/// Parse `word/styles.xml` into the known paragraph style registry.
fn parse_styles(xml: &str) -> Result<Vec<StyleInfo>> {
    let document = roxmltree::Document::parse(xml)
        .map_err(|err| DocError::InvalidDocument(format!("malformed styles.xml: {err}")))?;
    let mut styles = Vec::new();

    for node in document.root_element().children() {
        if node.tag_name().name() != "style" || node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        if node.attribute((WML_NS, "type")) != Some("paragraph") {
            continue;
        }
        let Some(style_id) = node.attribute((WML_NS, "styleId")) else {
            continue;
        };
        let name = wml_attr(node, "name").unwrap_or(style_id);
        styles.push(StyleInfo {
            style_id: style_id.to_string(),
            name: name.to_string(),
        });
    }
    Ok(styles)
}

fn parse_document(xml: &str, styles: Vec<StyleInfo>) -> Result<DocumentTree> {
    let document = roxmltree::Document::parse(xml)
        .map_err(|err| DocError::InvalidDocument(format!("malformed document.xml: {err}")))?;
    let body = wml(document.root_element(), "body")
        .ok_or_else(|| DocError::InvalidDocument("missing w:body".to_string()))?;

    let style_names: HashMap<&str, &str> = styles
        .iter()
        .map(|style| (style.style_id.as_str(), style.name.as_str()))
        .collect();

    let mut tree = DocumentTree {
        body: Vec::new(),
        styles: Vec::new(),
    };
    for node in body.children() {
        if !node.is_element() {
            continue;
        }
        match node.tag_name().name() {
            "p" => tree
                .body
                .push(BodyNode::Paragraph(parse_paragraph(node, &style_names))),
            "tbl" => tree
                .body
                .push(BodyNode::Table(parse_table(node, &style_names))),
            other => tree.body.push(BodyNode::Unsupported(other.to_string())),
        }
    }
    tree.styles = styles;
    Ok(tree)
}

fn resolve_style_name(style_id: &str, style_names: &HashMap<&str, &str>) -> String {
    match style_names.get(style_id) {
        Some(name) => (*name).to_string(),
        None => {
            warn!("style id {style_id:?} has no definition; using the id as its name");
            style_id.to_string()
        }
    }
}

fn parse_paragraph(node: roxmltree::Node, style_names: &HashMap<&str, &str>) -> ParagraphNode {
    let properties = wml(node, "pPr");

    let style = properties
        .and_then(|props| wml_attr(props, "pStyle"))
        .map(|id| resolve_style_name(id, style_names));
    let alignment = properties
        .and_then(|props| wml_attr(props, "jc"))
        .and_then(Alignment::from_jc);
    let page_break_before = properties
        .and_then(|props| wml_bool(props, "pageBreakBefore"))
        .unwrap_or(false);

    let runs = node
        .children()
        .filter(|child| {
            child.tag_name().name() == "r" && child.tag_name().namespace() == Some(WML_NS)
        })
        .map(parse_run)
        .collect();

    ParagraphNode {
        style,
        alignment,
        page_break_before,
        runs,
    }
}

fn parse_run(node: roxmltree::Node) -> RunNode {
    let properties = wml(node, "rPr");

    let bold = properties.and_then(|props| wml_bool(props, "b")).unwrap_or(false);
    let italic = properties.and_then(|props| wml_bool(props, "i")).unwrap_or(false);
    let underline = properties
        .and_then(|props| wml(props, "u"))
        .and_then(|u| u.attribute((WML_NS, "val")))
        .map(|val| val != "none")
        .unwrap_or(false);

    let fonts = properties.and_then(|props| wml(props, "rFonts"));
    let font = fonts
        .and_then(|f| f.attribute((WML_NS, "ascii")))
        .map(str::to_string);
    let east_asia_font = fonts
        .and_then(|f| f.attribute((WML_NS, "eastAsia")))
        .map(str::to_string);

    // Sizes are stored in half-points.
    let size = properties
        .and_then(|props| wml_attr(props, "sz"))
        .and_then(|val| val.parse::<f32>().ok())
        .map(|half_points| half_points / 2.0);
    let color = properties
        .and_then(|props| wml_attr(props, "color"))
        .filter(|val| *val != "auto")
        .map(|val| val.to_ascii_uppercase());

    let mut text = String::new();
    let mut page_break = false;
    for child in node.children() {
        if child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match child.tag_name().name() {
            "t" => {
                if let Some(fragment) = child.text() {
                    text.push_str(fragment);
                }
            }
            "tab" => text.push('\t'),
            "br" => {
                if child.attribute((WML_NS, "type")) == Some("page") {
                    page_break = true;
                } else {
                    text.push('\n');
                }
            }
            _ => {}
        }
    }

    RunNode {
        text,
        bold,
        italic,
        underline,
        font,
        east_asia_font,
        size,
        color,
        page_break,
    }
}

fn parse_table(node: roxmltree::Node, style_names: &HashMap<&str, &str>) -> TableNode {
    let grid_cols = wml(node, "tblGrid")
        .map(|grid| {
            grid.children()
                .filter(|child| {
                    child.tag_name().name() == "gridCol"
                        && child.tag_name().namespace() == Some(WML_NS)
                })
                .count()
        })
        .unwrap_or(0);

    let style = wml(node, "tblPr")
        .and_then(|props| wml_attr(props, "tblStyle"))
        .map(|id| resolve_style_name(id, style_names));

    let mut table = TableNode {
        style,
        grid_cols,
        rows: Vec::new(),
    };
    for row_node in node.children() {
        if row_node.tag_name().name() != "tr" || row_node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        let cells = row_node
            .children()
            .filter(|child| {
                child.tag_name().name() == "tc" && child.tag_name().namespace() == Some(WML_NS)
            })
            .map(|cell_node| parse_cell(cell_node, style_names))
            .collect();
        table.rows.push(TableRowNode::new(cells));
    }
    table
}

fn parse_cell(node: roxmltree::Node, style_names: &HashMap<&str, &str>) -> TableCellNode {
    let properties = wml(node, "tcPr");

    let grid_span = properties
        .and_then(|props| wml_attr(props, "gridSpan"))
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1);

    let v_merge = properties
        .and_then(|props| wml(props, "vMerge"))
        .map(|marker| match marker.attribute((WML_NS, "val")) {
            Some("restart") => VMerge::Restart,
            _ => VMerge::Continue,
        })
        .unwrap_or(VMerge::None);

    let paragraphs = node
        .children()
        .filter(|child| {
            child.tag_name().name() == "p" && child.tag_name().namespace() == Some(WML_NS)
        })
        .map(|paragraph| parse_paragraph(paragraph, style_names))
        .collect();

    TableCellNode {
        v_merge,
        grid_span,
        paragraphs,
    }
}
