//! Style-propagating section replacement
//!
//! Locates a region of top-level paragraphs by a title or keyword anchor,
//! captures the positional formatting of the paragraphs it covers, deletes
//! the region, and splices in new content that carries the captured
//! formatting, stretching the last captured record when the new content is
//! longer than the region it replaces.

use log::warn;

use crate::dom::{Alignment, BodyNode, DocumentTree, ParagraphNode, RunNode};
use crate::error::{DocError, Result};
use crate::extract::RunFormat;
use crate::formatting::{apply_format, capture_run};

/// How the replacement region is located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionAnchor {
    /// The region under the first paragraph containing `title`, ending at the
    /// next heading whose style name compares lexically at or below the
    /// anchor's. With `preserve_title` the title paragraph itself survives.
    Title { title: String, preserve_title: bool },
    /// The paragraphs within `range` of the first paragraph containing
    /// `keyword`, clamped to the document.
    Keyword { keyword: String, range: usize },
}

/// Formatting captured from one paragraph position in the region.
#[derive(Debug, Clone, Default)]
struct CapturedStyle {
    style: Option<String>,
    alignment: Option<Alignment>,
    page_break_before: bool,
    runs: Vec<RunFormat>,
}

/// Replace the anchored region with `new_content`, one paragraph per item.
///
/// Returns the number of paragraphs inserted. Fails with `NotFound` (and
/// leaves the tree untouched) when the anchor matches nothing; an empty
/// `new_content` deletes the region outright.
pub fn replace_section(
    tree: &mut DocumentTree,
    anchor: &SectionAnchor,
    new_content: &[String],
) -> Result<usize> {
    let paragraph_body = tree.paragraph_body_indices();
    let paragraph_count = paragraph_body.len();
    let (start, end) = resolve_region(tree, &paragraph_body, anchor)?;

    // Capture formatting for the positions the new content will land on.
    let capture_end = end.min(start + new_content.len());
    let mut captured: Vec<CapturedStyle> = Vec::new();
    for index in start..capture_end {
        match tree.body.get(paragraph_body[index]) {
            Some(BodyNode::Paragraph(paragraph)) => captured.push(CapturedStyle {
                style: paragraph.style.clone(),
                alignment: paragraph.alignment,
                page_break_before: paragraph.page_break_before,
                runs: paragraph.runs.iter().map(capture_run).collect(),
            }),
            _ => warn!("paragraph {index} moved during capture; using a default style record"),
        }
    }
    // Stretch the last captured record over any overflow positions; an empty
    // region gets default records throughout.
    while captured.len() < new_content.len() {
        captured.push(captured.last().cloned().unwrap_or_default());
    }

    // Body position where the new content goes: the slot of the first
    // paragraph in the region, or the end of the body when the region starts
    // past the last paragraph.
    let insert_at = match paragraph_body.get(start) {
        Some(&body_index) => body_index,
        None => tree.body.len(),
    };

    // Delete from the highest index down so earlier removals never shift a
    // position that is still pending.
    for index in (start..end).rev() {
        if index < paragraph_count {
            tree.body.remove(paragraph_body[index]);
        }
    }

    for (offset, content) in new_content.iter().enumerate() {
        let capture = captured.get(offset).cloned().unwrap_or_default();
        let mut paragraph = ParagraphNode::new();
        paragraph.style = capture.style;
        paragraph.alignment = capture.alignment;
        paragraph.page_break_before = capture.page_break_before;

        let mut run = RunNode::default();
        match capture.runs.first() {
            Some(first) => {
                let format = RunFormat {
                    text: content.clone(),
                    ..first.clone()
                };
                apply_format(&format, &mut run);
            }
            None => run.text = content.clone(),
        }
        paragraph.runs.push(run);
        tree.body.insert(insert_at + offset, BodyNode::Paragraph(paragraph));
    }

    Ok(new_content.len())
}

/// Resolve the anchor to a `[start, end)` range of paragraph indices.
fn resolve_region(
    tree: &DocumentTree,
    paragraph_body: &[usize],
    anchor: &SectionAnchor,
) -> Result<(usize, usize)> {
    let paragraphs: Vec<&ParagraphNode> = tree.paragraphs().collect();
    match anchor {
        SectionAnchor::Title {
            title,
            preserve_title,
        } => {
            let anchor_index = paragraphs
                .iter()
                .position(|paragraph| paragraph.text().contains(title.as_str()))
                .ok_or_else(|| DocError::NotFound(format!("title not found: {title:?}")))?;

            // The region runs to the next heading at or above the anchor's
            // level. "At or above" is a raw lexical comparison of style
            // names, so "Heading 10" sorts below "Heading 2" and terminates
            // its section; this matches the long-standing observable
            // behavior and is covered by a regression test.
            let anchor_style = paragraphs[anchor_index].style_name().to_string();
            let mut end = paragraphs.len();
            for (index, paragraph) in paragraphs.iter().enumerate().skip(anchor_index + 1) {
                let name = paragraph.style_name();
                if name.starts_with("Heading") && name <= anchor_style.as_str() {
                    end = index;
                    break;
                }
            }

            let start = if *preserve_title {
                anchor_index + 1
            } else {
                anchor_index
            };
            Ok((start, end.max(start)))
        }
        SectionAnchor::Keyword { keyword, range } => {
            let anchor_index = paragraphs
                .iter()
                .position(|paragraph| paragraph.text().contains(keyword.as_str()))
                .ok_or_else(|| DocError::NotFound(format!("keyword not found: {keyword:?}")))?;
            let start = anchor_index.saturating_sub(*range);
            let end = (anchor_index + range + 1).min(paragraph_body.len());
            Ok((start, end))
        }
    }
}
