//! Error taxonomy for document operations
//!
//! Every fallible operation returns a [`DocError`]. Recoverable conditions
//! (clipped merge spans, malformed colors, unknown style names, skipped body
//! nodes) are logged and absorbed instead of surfacing here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocError>;

#[derive(Debug, Error)]
pub enum DocError {
    /// An operation was invoked while no document is open in the session.
    #[error("no document is open")]
    PreconditionFailed,

    /// A paragraph, table, row, or column index is outside the document.
    #[error("index out of range: {0}")]
    IndexOutOfRange(String),

    /// The caller supplied an ambiguous, missing, or malformed argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A title or keyword anchor matched nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// A markup node could not be associated with its structural wrapper.
    #[error("mapping failure: {0}")]
    MappingFailure(String),

    /// The file is not a well-formed .docx container.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
