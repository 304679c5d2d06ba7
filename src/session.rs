//! Document session
//!
//! A [`Session`] owns the set of opened in-memory document trees and tracks
//! which one is current. It is an explicit value threaded through callers
//! rather than an ambient global, and it is where the "no document is
//! open" precondition lives: every high-level operation resolves the current
//! tree first and fails with [`DocError::PreconditionFailed`] when there is
//! none.
//!
//! Operations on one session are strictly sequential; callers that share a
//! session across logical actors must serialize access themselves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::dom::DocumentTree;
use crate::edit::{BlockEdit, BlockLocator, SectionAnchor, edit_block, replace_section};
use crate::error::{DocError, Result};
use crate::extract::{ContentBlock, extract_content};
use crate::io;

#[derive(Debug, Default)]
pub struct Session {
    documents: HashMap<PathBuf, DocumentTree>,
    current: Option<PathBuf>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    /// Open a document from disk and make it current.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let tree = io::read_document(path)?;
        self.documents.insert(path.to_path_buf(), tree);
        self.current = Some(path.to_path_buf());
        Ok(())
    }

    /// Create a fresh document at `path`, write it out, and make it current.
    pub fn create(&mut self, path: &Path) -> Result<()> {
        let tree = DocumentTree::new();
        io::write_document(&tree, path)?;
        self.documents.insert(path.to_path_buf(), tree);
        self.current = Some(path.to_path_buf());
        Ok(())
    }

    /// Attach an already-built tree under a name and make it current.
    ///
    /// This is how adapters hand over documents that did not come from disk.
    pub fn attach(&mut self, name: impl Into<PathBuf>, tree: DocumentTree) {
        let name = name.into();
        self.documents.insert(name.clone(), tree);
        self.current = Some(name);
    }

    /// Write the current document back to its path.
    pub fn save(&self) -> Result<()> {
        let path = self.current_path().ok_or(DocError::PreconditionFailed)?;
        io::write_document(self.document()?, path)
    }

    /// Write the current document to a new path and switch to it.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        let tree = self.document()?.clone();
        io::write_document(&tree, path)?;
        if let Some(previous) = self.current.take() {
            self.documents.remove(&previous);
        }
        self.documents.insert(path.to_path_buf(), tree);
        self.current = Some(path.to_path_buf());
        Ok(())
    }

    /// Drop the current document from the session.
    pub fn close(&mut self) {
        if let Some(path) = self.current.take() {
            self.documents.remove(&path);
        }
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// The current document tree, or `PreconditionFailed`.
    pub fn document(&self) -> Result<&DocumentTree> {
        self.current
            .as_ref()
            .and_then(|path| self.documents.get(path))
            .ok_or(DocError::PreconditionFailed)
    }

    pub fn document_mut(&mut self) -> Result<&mut DocumentTree> {
        match &self.current {
            Some(path) => self
                .documents
                .get_mut(path)
                .ok_or(DocError::PreconditionFailed),
            None => Err(DocError::PreconditionFailed),
        }
    }

    /// Extract the ordered content block list of the current document.
    pub fn extract(&self) -> Result<Vec<ContentBlock>> {
        Ok(extract_content(self.document()?))
    }

    /// Apply a format-preserving block edit to the current document.
    pub fn edit_block(&mut self, locator: BlockLocator, edit: &BlockEdit) -> Result<()> {
        edit_block(self.document_mut()?, locator, edit)
    }

    /// Replace the section under `title` with `new_content`.
    pub fn replace_section(
        &mut self,
        title: &str,
        new_content: &[String],
        preserve_title: bool,
    ) -> Result<usize> {
        let anchor = SectionAnchor::Title {
            title: title.to_string(),
            preserve_title,
        };
        replace_section(self.document_mut()?, &anchor, new_content)
    }

    /// Replace the paragraphs around the first occurrence of `keyword`.
    pub fn replace_section_by_keyword(
        &mut self,
        keyword: &str,
        new_content: &[String],
        range: usize,
    ) -> Result<usize> {
        let anchor = SectionAnchor::Keyword {
            keyword: keyword.to_string(),
            range,
        };
        replace_section(self.document_mut()?, &anchor, new_content)
    }
}
