//! Per-document processing: extraction, normalization, structuring.

use std::path::{Path, PathBuf};

use crate::engine::{EngineSet, ExtractionEngine, ExtractionOptions, QualityMetrics};
use crate::error::Result;
use crate::model::{Document, ExtractionResult, TableRecord};
use crate::normalize::TextNormalizer;
use crate::tables::TableDetector;

/// Everything produced for one document, ready to persist.
#[derive(Debug)]
pub struct ProcessedDocument {
    pub source: PathBuf,
    pub result: ExtractionResult,
    /// Normalized text; empty when extraction failed.
    pub text: String,
    pub tables: Vec<TableRecord>,
    pub metrics: QualityMetrics,
}

impl ProcessedDocument {
    pub fn base_name(&self) -> &str {
        self.source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document")
    }
}

/// The fixed sequence applied to each document.
pub struct DocumentPipeline {
    options: ExtractionOptions,
    normalizer: TextNormalizer,
    detector: TableDetector,
}

impl DocumentPipeline {
    pub fn new(
        options: ExtractionOptions,
        normalizer: TextNormalizer,
        detector: TableDetector,
    ) -> Self {
        Self {
            options,
            normalizer,
            detector,
        }
    }

    /// Run one document through extraction, normalization, and table
    /// detection.
    ///
    /// Extraction failures are carried inside the returned record; `Err`
    /// is reserved for documents that cannot even be ingested.
    pub fn process(&self, engines: &EngineSet, path: &Path) -> Result<ProcessedDocument> {
        let document = Document::ingest(path)?;
        let result = ExtractionEngine::new(engines, &self.options).extract(&document);

        // Tables are detected on the raw extracted text: normalization
        // collapses the blank-line runs that separate candidate blocks.
        let (text, tables) = if result.is_usable() {
            let tables = self.detector.detect(&result.text);
            let text = self.normalizer.normalize(&result.text);
            (text, tables)
        } else {
            (String::new(), Vec::new())
        };

        let metrics = QualityMetrics::compute(&text);
        Ok(ProcessedDocument {
            source: path.to_path_buf(),
            result,
            text,
            tables,
            metrics,
        })
    }
}

impl Default for DocumentPipeline {
    fn default() -> Self {
        Self::new(
            ExtractionOptions::new(),
            TextNormalizer::default(),
            TableDetector::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{
        EnhancementProfile, ImageEnhancer, PageImage, PageRenderer, RetryConfig, TextLayer,
    };
    use crate::error::Error;
    use crate::model::ExtractionStatus;

    struct StaticLayer(String);
    impl TextLayer for StaticLayer {
        fn extract(&self, _d: &Document) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct DeadRenderer;
    impl PageRenderer for DeadRenderer {
        fn render(&self, _d: &Document, _dpi: u32, _w: &Path) -> Result<Vec<PageImage>> {
            Err(Error::Render("no renderer in this test".into()))
        }
    }

    struct Passthrough;
    impl ImageEnhancer for Passthrough {
        fn enhance(&self, image: &PageImage, _p: EnhancementProfile) -> Result<PageImage> {
            Ok(image.clone())
        }
    }

    fn set_with_text(text: &str) -> EngineSet {
        EngineSet {
            text_layer: Box::new(StaticLayer(text.to_string())),
            renderer: Box::new(DeadRenderer),
            enhancer: Box::new(Passthrough),
            recognizers: vec![],
            probe: None,
        }
    }

    fn pipeline() -> DocumentPipeline {
        DocumentPipeline::new(
            ExtractionOptions {
                retry: RetryConfig {
                    max_attempts: 1,
                    min_wait_ms: 1,
                    max_wait_ms: 1,
                },
                ..ExtractionOptions::new()
            },
            TextNormalizer::default(),
            TableDetector::default(),
        )
    }

    fn body(words: usize) -> String {
        (0..words)
            .map(|i| format!("word{}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_process_extracts_normalizes_and_detects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.4\n").unwrap();

        let text = format!("{}\n\n\na|b|c\nd|e|f\ng|h|i", body(60));
        let set = set_with_text(&text);

        let processed = pipeline().process(&set, &path).unwrap();
        assert_eq!(processed.result.status, ExtractionStatus::Success);
        assert_eq!(processed.base_name(), "report");
        assert_eq!(processed.tables.len(), 1);
        assert!(processed.metrics.word_count >= 60);
    }

    #[test]
    fn test_non_pdf_is_rejected_at_ingest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"plain text, no magic").unwrap();

        let set = set_with_text(&body(100));
        let err = pipeline().process(&set, &path).unwrap_err();
        assert!(matches!(err, Error::UnknownFormat));
    }

    #[test]
    fn test_failed_extraction_yields_empty_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thin.pdf");
        std::fs::write(&path, b"%PDF-1.4\n").unwrap();

        // Direct text is too thin and there is no working ladder below it.
        let set = set_with_text("hardly anything");
        let processed = pipeline().process(&set, &path).unwrap();
        assert_eq!(processed.result.status, ExtractionStatus::Failed);
        assert!(processed.text.is_empty());
        assert!(processed.tables.is_empty());
    }
}
