//! Content extraction: document walking and merge grid reconstruction
//!
//! Turns the in-memory markup tree into the ordered [`ContentBlock`] list
//! consumed by presentation and editing clients.

pub mod grid;
pub mod models;
pub mod walker;

pub use grid::{GridSlot, MergeGrid, PrimaryCell, logical_column_count};
pub use models::{ContentBlock, RunFormat};
pub use walker::{extract_content, heading_level};
