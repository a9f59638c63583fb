//! Input detection and discovery.
//!
//! PDF magic-byte sniffing plus directory discovery by extension, used by
//! the batch scheduler and the CLI to turn a path argument into a concrete
//! list of documents.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Check if bytes start with a PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    data.len() >= PDF_MAGIC.len() && data.starts_with(PDF_MAGIC)
}

/// Verify that a file starts with a PDF header.
///
/// Returns `Err(Error::UnknownFormat)` for non-PDF content so malformed
/// inputs fail before any extraction work is scheduled.
pub fn verify_pdf<P: AsRef<Path>>(path: P) -> Result<()> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 8];
    let read = reader.read(&mut header)?;
    if is_pdf_bytes(&header[..read]) {
        Ok(())
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Check if a file is a PDF by header, without surfacing I/O errors.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    verify_pdf(path).is_ok()
}

/// Discover input documents under a path.
///
/// A file path yields itself (after extension check); a directory is
/// scanned for `*.pdf` files, optionally recursively. Results are sorted
/// so discovery order is deterministic across runs.
pub fn discover<P: AsRef<Path>>(input: P, recursive: bool) -> Result<Vec<PathBuf>> {
    let input = input.as_ref();
    if input.is_file() {
        return if has_pdf_extension(input) {
            Ok(vec![input.to_path_buf()])
        } else {
            Err(Error::UnknownFormat)
        };
    }
    if !input.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input not found: {}", input.display()),
        )));
    }

    let mut found = Vec::new();
    collect_pdfs(input, recursive, &mut found)?;
    found.sort();
    Ok(found)
}

fn collect_pdfs(dir: &Path, recursive: bool, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_pdfs(&path, recursive, found)?;
            }
        } else if has_pdf_extension(&path) {
            found.push(path);
        }
    }
    Ok(())
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_bytes() {
        assert!(is_pdf_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3"));
        assert!(is_pdf_bytes(b"%PDF-2.0\n"));
        assert!(!is_pdf_bytes(b"<!DOCTYPE html>"));
        assert!(!is_pdf_bytes(b"%PDF"));
        assert!(!is_pdf_bytes(b""));
    }

    #[test]
    fn test_verify_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.pdf");
        std::fs::write(&good, b"%PDF-1.4\n1 0 obj").unwrap();
        assert!(verify_pdf(&good).is_ok());

        let bad = dir.path().join("bad.pdf");
        std::fs::write(&bad, b"plain text, definitely").unwrap();
        assert!(matches!(verify_pdf(&bad), Err(Error::UnknownFormat)));

        // Empty file: not a PDF, not a crash
        let empty = dir.path().join("empty.pdf");
        std::fs::write(&empty, b"").unwrap();
        assert!(matches!(verify_pdf(&empty), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_discover_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("a.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();

        let docs = discover(&pdf, false).unwrap();
        assert_eq!(docs, vec![pdf]);

        let txt = dir.path().join("a.txt");
        std::fs::write(&txt, b"nope").unwrap();
        assert!(discover(&txt, false).is_err());
    }

    #[test]
    fn test_discover_directory_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.pdf", "a.PDF", "b.pdf", "skip.txt"] {
            std::fs::write(dir.path().join(name), b"%PDF-1.4").unwrap();
        }
        let sub = dir.path().join("nested");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("d.pdf"), b"%PDF-1.4").unwrap();

        let flat = discover(dir.path(), false).unwrap();
        let names: Vec<_> = flat
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf", "c.pdf"]);

        let deep = discover(dir.path(), true).unwrap();
        assert_eq!(deep.len(), 4);
    }
}
