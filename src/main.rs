//! Command-line interface for docsmith
//!
//! Thin adapter over the library: each subcommand opens a document, runs one
//! operation, and saves when the operation mutated anything. Extraction and
//! search results print as JSON so other tools can consume them.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use docsmith::edit::{BlockEdit, BlockLocator};
use docsmith::{Alignment, ContentBlock, Session};

#[derive(Parser)]
#[command(name = "docsmith", version, about = "Structural extraction and format-preserving editing for .docx documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the document's content blocks as JSON
    Extract {
        file: PathBuf,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Replace the text of one paragraph or table cell, reapplying its
    /// captured formatting
    EditBlock {
        file: PathBuf,
        /// Top-level paragraph index
        #[arg(long, conflicts_with = "cell")]
        paragraph: Option<usize>,
        /// Table cell as TABLE ROW COL
        #[arg(long, num_args = 3, value_names = ["TABLE", "ROW", "COL"])]
        cell: Option<Vec<usize>>,
        /// The new text
        #[arg(long)]
        text: String,
        /// Paragraph style override (display name, e.g. "Heading 2")
        #[arg(long)]
        style: Option<String>,
        /// Alignment override: left, center, right, justify, distribute
        #[arg(long)]
        align: Option<String>,
        /// Page-break-before override
        #[arg(long)]
        page_break_before: Option<bool>,
    },
    /// Replace the section under a title, propagating captured styles
    ReplaceSection {
        file: PathBuf,
        #[arg(long)]
        title: String,
        /// New paragraphs, one per flag occurrence
        #[arg(long = "content")]
        content: Vec<String>,
        /// Remove the title paragraph as well
        #[arg(long)]
        drop_title: bool,
    },
    /// Replace the paragraphs around the first occurrence of a keyword
    ReplaceKeyword {
        file: PathBuf,
        #[arg(long)]
        keyword: String,
        #[arg(long = "content")]
        content: Vec<String>,
        /// Paragraphs on each side of the match to replace
        #[arg(long, default_value_t = 3)]
        range: usize,
    },
    /// Find a keyword in paragraphs and table cells
    Search { file: PathBuf, keyword: String },
    /// Replace every occurrence of a keyword (unconditioned, drops formatting)
    Replace {
        file: PathBuf,
        keyword: String,
        replacement: String,
        /// Report what would change without saving
        #[arg(long)]
        preview: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Extract { file, pretty } => {
            let mut session = Session::new();
            session.open(&file).context("failed to open document")?;
            let blocks = session.extract()?;
            print_json(&blocks, pretty)?;
        }
        Command::EditBlock {
            file,
            paragraph,
            cell,
            text,
            style,
            align,
            page_break_before,
        } => {
            let cell = match cell.as_deref() {
                Some([table, row, col]) => Some((*table, *row, *col)),
                Some(_) => bail!("--cell takes exactly three values: TABLE ROW COL"),
                None => None,
            };
            let locator = BlockLocator::from_parts(paragraph, cell)?;
            let alignment = match align.as_deref() {
                Some(name) => Some(
                    Alignment::from_name(name)
                        .with_context(|| format!("unknown alignment {name:?}"))?,
                ),
                None => None,
            };

            let mut session = Session::new();
            session.open(&file).context("failed to open document")?;
            let edit = BlockEdit {
                new_text: text,
                original_runs: captured_runs(&session, locator)?,
                style,
                alignment,
                page_break_before,
            };
            session.edit_block(locator, &edit)?;
            session.save()?;
            println!("edited 1 block in {}", file.display());
        }
        Command::ReplaceSection {
            file,
            title,
            content,
            drop_title,
        } => {
            let mut session = Session::new();
            session.open(&file).context("failed to open document")?;
            let inserted = session.replace_section(&title, &content, !drop_title)?;
            session.save()?;
            println!("replaced section {title:?} with {inserted} paragraphs");
        }
        Command::ReplaceKeyword {
            file,
            keyword,
            content,
            range,
        } => {
            let mut session = Session::new();
            session.open(&file).context("failed to open document")?;
            let inserted = session.replace_section_by_keyword(&keyword, &content, range)?;
            session.save()?;
            println!("replaced region around {keyword:?} with {inserted} paragraphs");
        }
        Command::Search { file, keyword } => {
            let mut session = Session::new();
            session.open(&file).context("failed to open document")?;
            let hits = session.search_text(&keyword)?;
            print_json(&hits, true)?;
        }
        Command::Replace {
            file,
            keyword,
            replacement,
            preview,
        } => {
            let mut session = Session::new();
            session.open(&file).context("failed to open document")?;
            let replacements = session.search_and_replace(&keyword, &replacement, preview)?;
            if !preview {
                session.save()?;
            }
            let total: usize = replacements.iter().map(|hit| hit.occurrences).sum();
            let action = if preview { "would replace" } else { "replaced" };
            println!("{action} {total} occurrences at {} locations", replacements.len());
        }
    }
    Ok(())
}

/// The formatting snapshot an edit reapplies: the target block's current runs
/// as reported by extraction.
fn captured_runs(session: &Session, locator: BlockLocator) -> Result<Vec<docsmith::RunFormat>> {
    let blocks = session.extract()?;
    let found = blocks.iter().find(|block| match (block, locator) {
        (ContentBlock::Paragraph { paragraph_index, .. }, BlockLocator::Paragraph(index))
        | (ContentBlock::Heading { paragraph_index, .. }, BlockLocator::Paragraph(index)) => {
            *paragraph_index == index
        }
        (
            ContentBlock::TableCell { table_index, row, col, .. },
            BlockLocator::TableCell { table, row: r, col: c },
        ) => *table_index == table && *row == r && *col == c,
        _ => false,
    });
    Ok(found.map(|block| block.runs().to_vec()).unwrap_or_default())
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
