//! # docmine
//!
//! Quality-gated text and table extraction from PDF documents.
//!
//! Extraction climbs a ladder of strategies, cheapest first: the
//! document's own text layer, then rendered pages through one or more
//! OCR engines. Each strategy's output must clear a quality gate before
//! it is accepted; anything below the bar escalates to the next rung.
//! A batch scheduler fans the pipeline out over a worker pool and
//! aggregates a per-run report.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docmine::Docmine;
//!
//! fn main() -> docmine::Result<()> {
//!     // Process one document with default collaborators
//!     let processed = Docmine::new().process("invoice.pdf")?;
//!     println!("{}", processed.text);
//!
//!     // Or a whole directory, in parallel
//!     let report = Docmine::new()
//!         .with_output("out")
//!         .run("./inbox", true)?;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```
//!
//! External tools (`pdftoppm`, `tesseract`) are required only when a
//! document actually needs the OCR rungs; born-digital PDFs never
//! touch them.

pub mod backends;
pub mod batch;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod tables;

// Re-export commonly used types
pub use batch::{BatchScheduler, OutputWriter};
pub use config::PipelineConfig;
pub use detect::{discover, is_pdf, is_pdf_bytes};
pub use engine::{
    EngineSet, ExtractionEngine, ExtractionOptions, GateDecision, QualityGate, QualityMetrics,
    QualityThresholds, RetryPolicy,
};
pub use error::{Error, Result};
pub use model::{
    BatchReport, Document, DocumentOutcome, ExtractionResult, ExtractionStatus, Region,
    RegionType, Strategy, TableRecord,
};
pub use normalize::{NormalizePreset, TextNormalizer};
pub use pipeline::{DocumentPipeline, ProcessedDocument};
pub use tables::TableDetector;

use std::path::{Path, PathBuf};

/// Extract normalized text from a single PDF with default settings.
///
/// # Example
///
/// ```no_run
/// let text = docmine::extract_text("document.pdf").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(Docmine::new().process(path)?.text)
}

/// Builder over [`PipelineConfig`] for one-off runs.
///
/// # Example
///
/// ```no_run
/// use docmine::Docmine;
///
/// let report = Docmine::new()
///     .strict()
///     .with_workers(4)
///     .with_timeout_secs(120)
///     .with_output("out")
///     .run("./scans", false)?;
/// # Ok::<(), docmine::Error>(())
/// ```
pub struct Docmine {
    config: PipelineConfig,
    output: PathBuf,
}

impl Docmine {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            output: PathBuf::from("out"),
        }
    }

    /// Start from a loaded configuration instead of defaults.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Raise the quality bar to the strict threshold set.
    pub fn strict(mut self) -> Self {
        self.config.thresholds = QualityThresholds::strict();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn with_render_dpi(mut self, dpi: u32) -> Self {
        self.config.render_dpi = dpi;
        self
    }

    pub fn with_normalize(mut self, preset: NormalizePreset) -> Self {
        self.config.normalize = preset;
        self
    }

    /// Disable the OCR rungs; only the direct text layer is tried.
    pub fn text_layer_only(mut self) -> Self {
        self.config.ocr = false;
        self
    }

    /// Output root for artifacts, default `out`.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    fn pipeline(&self) -> DocumentPipeline {
        DocumentPipeline::new(
            self.config.extraction_options(),
            TextNormalizer::from_preset(self.config.normalize),
            TableDetector::new(self.config.tables.clone()),
        )
    }

    /// Process one document in-process, without persisting artifacts.
    pub fn process<P: AsRef<Path>>(&self, path: P) -> Result<ProcessedDocument> {
        let engines = self.config.engine_set();
        self.pipeline().process(&engines, path.as_ref())
    }

    /// Discover documents under `input` and process them in parallel,
    /// persisting artifacts under the output root.
    ///
    /// A misconfigured OCR ladder is a startup error here, before any
    /// worker spawns, never a mid-batch surprise.
    pub fn run<P: AsRef<Path>>(&self, input: P, recursive: bool) -> Result<BatchReport> {
        if self.config.ocr {
            self.config.engine_set().validate()?;
        }
        let documents = discover(input.as_ref(), recursive)?;
        let mut scheduler = BatchScheduler::new(self.pipeline(), OutputWriter::new(&self.output))
            .with_workers(self.config.workers)
            .with_chunk_size(self.config.chunk_size);
        if let Some(timeout) = self.config.timeout() {
            scheduler = scheduler.with_timeout(timeout);
        }
        let config = self.config.clone();
        scheduler.run(documents, &move || config.engine_set())
    }
}

impl Default for Docmine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chained() {
        let miner = Docmine::new()
            .strict()
            .with_workers(2)
            .with_timeout_secs(60)
            .with_render_dpi(150)
            .with_output("/tmp/docmine-out");

        assert_eq!(miner.config.thresholds.min_word_count, 100);
        assert_eq!(miner.config.workers, 2);
        assert_eq!(miner.config.timeout_secs, 60);
        assert_eq!(miner.config.render_dpi, 150);
        assert_eq!(miner.output, PathBuf::from("/tmp/docmine-out"));
    }

    #[test]
    fn test_process_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, b"<!DOCTYPE html>").unwrap();
        let result = Docmine::new().process(&path);
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_run_rejects_unavailable_ocr_backend_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            recognizers: vec![crate::config::RecognizerConfig {
                name: "phantom".to_string(),
                program: "docmine-no-such-ocr-binary".to_string(),
                args: vec![],
            }],
            ..PipelineConfig::default()
        };
        let result = Docmine::new().with_config(config).run(dir.path(), false);
        assert!(matches!(result, Err(Error::BackendUnavailable(_))));
    }

    #[test]
    fn test_is_pdf_bytes() {
        assert!(is_pdf_bytes(b"%PDF-1.7\ncontent"));
        assert!(!is_pdf_bytes(b"Not a PDF file"));
        assert!(!is_pdf_bytes(b""));
    }
}
