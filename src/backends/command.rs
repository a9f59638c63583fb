//! Backends that shell out to external tools.
//!
//! Rendering uses `pdftoppm` (poppler-utils) and recognition uses
//! `tesseract`. Wrapping the CLIs keeps the crate free of image and
//! OCR bindings while the heuristics stay testable with fakes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::engine::{
    EnhancementProfile, ImageEnhancer, PageImage, PageRenderer, Recognition, RecognitionEngine,
};
use crate::error::{Error, Result};
use crate::model::Document;

fn spawn_error(program: &str, e: std::io::Error) -> Error {
    if e.kind() == ErrorKind::NotFound {
        Error::BackendUnavailable(program.to_string())
    } else {
        Error::Io(e)
    }
}

/// Classify pdftoppm stderr into the document error taxonomy.
fn classify_render_stderr(stderr: &str) -> Error {
    let lower = stderr.to_lowercase();
    if lower.contains("incorrect password") || lower.contains("encrypted") {
        Error::Encrypted
    } else if lower.contains("may not be a pdf file") || lower.contains("couldn't read xref") {
        Error::Corrupted(stderr.trim().to_string())
    } else {
        Error::Render(stderr.trim().to_string())
    }
}

/// Renders pages to PNG via `pdftoppm`.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
}

impl Default for CommandRenderer {
    fn default() -> Self {
        Self {
            program: "pdftoppm".to_string(),
        }
    }
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `pdftoppm` numbers output as `page-1.png`, `page-2.png`, ...
    fn collect_pages(workdir: &Path) -> Result<Vec<PageImage>> {
        let mut pages: Vec<PageImage> = std::fs::read_dir(workdir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|s| s.to_str()) != Some("png") {
                    return None;
                }
                let number = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|stem| stem.rsplit('-').next())
                    .and_then(|n| n.parse::<u32>().ok())?;
                Some(PageImage::new(number, path))
            })
            .collect();
        pages.sort_by_key(|p| p.page_number);
        Ok(pages)
    }
}

impl PageRenderer for CommandRenderer {
    fn render(&self, document: &Document, dpi: u32, workdir: &Path) -> Result<Vec<PageImage>> {
        let prefix = workdir.join("page");
        let output = Command::new(&self.program)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(document.source())
            .arg(&prefix)
            .output()
            .map_err(|e| spawn_error(&self.program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_render_stderr(&stderr));
        }

        let pages = Self::collect_pages(workdir)?;
        log::debug!(
            "{}: rendered {} page(s) at {} dpi",
            document.source().display(),
            pages.len(),
            dpi
        );
        Ok(pages)
    }
}

/// Recognizes page images via `tesseract`, text on stdout.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    name: String,
    program: String,
    extra_args: Vec<String>,
}

impl CommandRecognizer {
    pub fn new(
        name: impl Into<String>,
        program: impl Into<String>,
        extra_args: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            extra_args,
        }
    }

    /// LSTM engine with automatic page segmentation. First OCR rung.
    pub fn tesseract_fast() -> Self {
        Self::new(
            "tesseract-fast",
            "tesseract",
            vec!["--oem".into(), "1".into(), "--psm".into(), "3".into()],
        )
    }

    /// Slower configuration that assumes a single text block, which
    /// recovers columns and sparse scans the fast profile mangles.
    pub fn tesseract_robust() -> Self {
        Self::new(
            "tesseract-robust",
            "tesseract",
            vec!["--oem".into(), "1".into(), "--psm".into(), "6".into()],
        )
    }
}

impl RecognitionEngine for CommandRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn recognize(&self, image: &PageImage) -> Result<Recognition> {
        let output = Command::new(&self.program)
            .arg(&image.path)
            .arg("stdout")
            .args(&self.extra_args)
            .output()
            .map_err(|e| spawn_error(&self.program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Recognition {
                engine: self.name.clone(),
                cause: stderr.trim().to_string(),
            });
        }

        Ok(Recognition {
            text: String::from_utf8_lossy(&output.stdout).into_owned(),
            confidence: None,
        })
    }

    fn available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

/// Pre-recognition cleanup through an external image tool.
///
/// The command receives the input path, the output path, and the
/// profile's extra arguments, in that order.
#[derive(Debug, Clone)]
pub struct CommandEnhancer {
    program: String,
    default_args: Vec<String>,
    high_contrast_args: Vec<String>,
}

impl CommandEnhancer {
    pub fn new(
        program: impl Into<String>,
        default_args: Vec<String>,
        high_contrast_args: Vec<String>,
    ) -> Self {
        Self {
            program: program.into(),
            default_args,
            high_contrast_args,
        }
    }

    fn enhanced_path(path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("page");
        path.with_file_name(format!("{}-enh.png", stem))
    }
}

impl ImageEnhancer for CommandEnhancer {
    fn enhance(&self, image: &PageImage, profile: EnhancementProfile) -> Result<PageImage> {
        let out = Self::enhanced_path(&image.path);
        let args = match profile {
            EnhancementProfile::Default => &self.default_args,
            EnhancementProfile::HighContrast => &self.high_contrast_args,
        };
        let output = Command::new(&self.program)
            .arg(&image.path)
            .arg(&out)
            .args(args)
            .output()
            .map_err(|e| spawn_error(&self.program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Enhance(stderr.trim().to_string()));
        }
        Ok(PageImage::new(image.page_number, out))
    }
}

/// Passes page images through untouched.
#[derive(Debug, Default)]
pub struct NoopEnhancer;

impl ImageEnhancer for NoopEnhancer {
    fn enhance(&self, image: &PageImage, _profile: EnhancementProfile) -> Result<PageImage> {
        Ok(image.clone())
    }
}
