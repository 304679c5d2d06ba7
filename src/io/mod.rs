//! Document container I/O
//!
//! Reading `.docx` packages into the markup tree and writing trees back out.
//! The reader goes through `zip` + `roxmltree` directly; the writer rebuilds
//! the package through `docx-rs`.

pub mod reader;
pub mod writer;

pub use reader::{read_document, read_document_from, validate_docx_file};
pub use writer::{write_document, write_document_to};
