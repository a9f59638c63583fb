//! Ingested document identity.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::detect;
use crate::error::Result;

/// A document accepted into the pipeline.
///
/// Immutable once ingested: the source path is its identity, bytes are
/// read on demand, and the page count is recorded once the first
/// collaborator learns it.
#[derive(Debug, Clone)]
pub struct Document {
    source: PathBuf,
    page_count: OnceLock<u32>,
}

impl Document {
    /// Ingest a document, verifying the PDF header up front.
    pub fn ingest<P: AsRef<Path>>(path: P) -> Result<Self> {
        detect::verify_pdf(&path)?;
        Ok(Self {
            source: path.as_ref().to_path_buf(),
            page_count: OnceLock::new(),
        })
    }

    /// Source path of the document.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// File stem used for deterministic output naming.
    pub fn base_name(&self) -> String {
        self.source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string())
    }

    /// Read the full byte content.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.source)?)
    }

    /// Page count, once known. `None` until a collaborator has opened the
    /// document.
    pub fn page_count(&self) -> Option<u32> {
        self.page_count.get().copied()
    }

    /// Record the page count; the first value wins.
    pub fn record_page_count(&self, pages: u32) {
        let _ = self.page_count.set(pages);
    }
}
