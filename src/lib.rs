//! docsmith: structural extraction and format-preserving editing for .docx files
//!
//! The crate works against an in-memory markup tree ([`dom::DocumentTree`])
//! and offers three layers on top of it:
//!
//! - **Extraction** ([`extract`]): walk the document body in order and emit a
//!   flat list of content blocks: paragraphs, headings, table metadata, and
//!   one combined block per primary cell of each table's reconstructed merge
//!   grid.
//! - **Format-preserving editing** ([`edit`]): replace the text of one
//!   located block while reapplying captured run formatting, or replace a
//!   title/keyword-anchored region while propagating per-position styles
//!   onto the new content.
//! - **Simple operations** ([`ops`]): unconditioned search, replace, insert,
//!   delete, and cell merging, with no formatting guarantees.
//!
//! A [`Session`] owns the opened documents and is the entry point for all of
//! it; the [`io`] module moves trees between memory and `.docx` containers.

pub mod dom;
pub mod edit;
pub mod error;
pub mod extract;
pub mod formatting;
pub mod io;
pub mod ops;
pub mod session;

pub use dom::{
    Alignment, BodyNode, DocumentTree, ParagraphNode, RunNode, StyleInfo, TableCellNode,
    TableNode, TableRowNode, VMerge,
};
pub use edit::{BlockEdit, BlockLocator, SectionAnchor, edit_block, replace_section};
pub use error::{DocError, Result};
pub use extract::{ContentBlock, MergeGrid, RunFormat, extract_content};
pub use ops::{HitLocation, Replacement, SearchHit};
pub use session::Session;
