//! Direct text layer extraction using lopdf.

use lopdf::Document as LopdfDocument;

use crate::engine::TextLayer;
use crate::error::{Error, Result};
use crate::model::Document;

/// Reads the text already encoded in the document structure.
///
/// Cheapest rung of the ladder: no rendering, no recognition. Scanned
/// documents typically yield little or nothing here and are caught by
/// the quality gate.
#[derive(Debug, Default)]
pub struct LopdfTextLayer;

impl LopdfTextLayer {
    pub fn new() -> Self {
        Self
    }
}

impl TextLayer for LopdfTextLayer {
    fn extract(&self, document: &Document) -> Result<String> {
        let bytes = document.read_bytes()?;
        let doc = LopdfDocument::load_mem(&bytes).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;

        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(Error::ZeroPages);
        }
        document.record_page_count(pages.len() as u32);

        let mut parts = Vec::with_capacity(pages.len());
        for (&page_num, _) in pages.iter() {
            match doc.extract_text(&[page_num]) {
                Ok(text) => parts.push(text),
                Err(e) => {
                    // Pages with broken content streams lose their text;
                    // the rest of the document still counts.
                    log::warn!(
                        "{}: page {} text extraction failed: {}",
                        document.source().display(),
                        page_num,
                        e
                    );
                    parts.push(String::new());
                }
            }
        }
        Ok(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;

    #[test]
    fn test_garbage_bytes_fail_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pdf");
        std::fs::write(&path, b"%PDF-1.4\nnot really a pdf body").unwrap();
        let doc = Document::ingest(&path).unwrap();

        let result = LopdfTextLayer::new().extract(&doc);
        assert!(result.is_err());
    }
}
