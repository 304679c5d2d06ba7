//! Format-preserving editors
//!
//! Two editing surfaces share the run formatting codec: single-block text
//! replacement ([`block`]) and anchor-based section replacement ([`section`]).

pub mod block;
pub mod section;

pub use block::{BlockEdit, BlockLocator, edit_block};
pub use section::{SectionAnchor, replace_section};
