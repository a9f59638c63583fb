//! End-to-end tests for the extraction pipeline and batch scheduler,
//! driven by mock collaborators.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use docmine::batch::{BatchScheduler, OutputWriter};
use docmine::engine::{
    EngineSet, EnhancementProfile, ExtractionOptions, ImageEnhancer, PageImage, PageRenderer,
    Recognition, RecognitionEngine, RetryConfig, TextLayer,
};
use docmine::error::{Error, Result};
use docmine::model::{Document, ExtractionStatus, Strategy};
use docmine::normalize::TextNormalizer;
use docmine::pipeline::DocumentPipeline;
use docmine::tables::TableDetector;

fn words(n: usize) -> String {
    (0..n)
        .map(|i| format!("word{}", i))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text layer that returns per-file canned output. Files whose names
/// contain "locked" behave as password protected, "slow" sleeps.
struct MockTextLayer {
    default_text: String,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl TextLayer for MockTextLayer {
    fn extract(&self, document: &Document) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = document
            .source()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");
        if name.contains("locked") {
            return Err(Error::Encrypted);
        }
        if name.contains("slow") {
            std::thread::sleep(self.delay);
        }
        if name.contains("scan") {
            // Scanned document: the text layer holds nothing useful.
            return Ok(String::new());
        }
        Ok(self.default_text.clone())
    }
}

struct MockRenderer {
    pages: usize,
    calls: Arc<AtomicUsize>,
}

impl PageRenderer for MockRenderer {
    fn render(&self, document: &Document, _dpi: u32, workdir: &Path) -> Result<Vec<PageImage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = document
            .source()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");
        if name.contains("locked") {
            return Err(Error::Encrypted);
        }
        Ok((1..=self.pages)
            .map(|i| PageImage::new(i as u32, workdir.join(format!("page-{}.png", i))))
            .collect())
    }
}

struct MockEnhancer;

impl ImageEnhancer for MockEnhancer {
    fn enhance(&self, image: &PageImage, _profile: EnhancementProfile) -> Result<PageImage> {
        Ok(image.clone())
    }
}

struct MockOcr {
    name: String,
    per_page_words: usize,
    calls: Arc<AtomicUsize>,
}

impl RecognitionEngine for MockOcr {
    fn name(&self) -> &str {
        &self.name
    }

    fn recognize(&self, _image: &PageImage) -> Result<Recognition> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Recognition {
            text: words(self.per_page_words),
            confidence: Some(0.85),
        })
    }
}

struct Counters {
    text_layer: Arc<AtomicUsize>,
    renderer: Arc<AtomicUsize>,
    primary: Arc<AtomicUsize>,
    secondary: Arc<AtomicUsize>,
}

impl Counters {
    fn new() -> Self {
        Self {
            text_layer: Arc::new(AtomicUsize::new(0)),
            renderer: Arc::new(AtomicUsize::new(0)),
            primary: Arc::new(AtomicUsize::new(0)),
            secondary: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// Collaborator set: direct text of `direct_words` words, a one-page
/// renderer, and a fast/robust OCR pair yielding 20 and 200 words.
fn engine_set(counters: &Counters, direct_words: usize, delay: Duration) -> EngineSet {
    EngineSet {
        text_layer: Box::new(MockTextLayer {
            default_text: words(direct_words),
            delay,
            calls: counters.text_layer.clone(),
        }),
        renderer: Box::new(MockRenderer {
            pages: 1,
            calls: counters.renderer.clone(),
        }),
        enhancer: Box::new(MockEnhancer),
        recognizers: vec![
            Box::new(MockOcr {
                name: "mock-fast".into(),
                per_page_words: 20,
                calls: counters.primary.clone(),
            }),
            Box::new(MockOcr {
                name: "mock-robust".into(),
                per_page_words: 200,
                calls: counters.secondary.clone(),
            }),
        ],
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

fn write_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.4\n").unwrap();
    path
}

#[test]
fn test_clean_document_never_touches_ocr() {
    // A 500-word text layer clears the gate immediately.
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "report.pdf");

    let counters = Counters::new();
    let set = engine_set(&counters, 500, Duration::ZERO);
    let processed = pipeline().process(&set, &path).unwrap();

    assert_eq!(processed.result.status, ExtractionStatus::Success);
    assert_eq!(processed.result.strategy_path(), vec![&Strategy::DirectText]);
    assert_eq!(counters.renderer.load(Ordering::SeqCst), 0);
    assert_eq!(counters.primary.load(Ordering::SeqCst), 0);
    assert_eq!(counters.secondary.load(Ordering::SeqCst), 0);
}

#[test]
fn test_scanned_document_escalates_to_second_engine() {
    // Empty text layer, thin primary OCR, rich secondary OCR.
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "scan.pdf");

    let counters = Counters::new();
    let set = engine_set(&counters, 500, Duration::ZERO);
    let processed = pipeline().process(&set, &path).unwrap();

    assert_eq!(processed.result.status, ExtractionStatus::Success);
    assert_eq!(counters.renderer.load(Ordering::SeqCst), 1);
    assert_eq!(counters.primary.load(Ordering::SeqCst), 1);
    assert_eq!(counters.secondary.load(Ordering::SeqCst), 1);
    assert_eq!(processed.result.recognition_attempts(), 2);
    assert!(processed.text.split_whitespace().count() >= 100);
}

#[test]
fn test_password_protected_fails_without_recognition() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "locked.pdf");

    let counters = Counters::new();
    let set = engine_set(&counters, 500, Duration::ZERO);
    let processed = pipeline().process(&set, &path).unwrap();

    assert_eq!(processed.result.status, ExtractionStatus::Failed);
    assert!(processed
        .result
        .failure
        .as_deref()
        .unwrap()
        .contains("password"));
    assert_eq!(counters.primary.load(Ordering::SeqCst), 0);
    assert_eq!(counters.secondary.load(Ordering::SeqCst), 0);
}

#[test]
fn test_tables_extracted_from_accepted_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "invoice.pdf");

    let counters = Counters::new();
    let mut set = engine_set(&counters, 0, Duration::ZERO);
    let table_text = format!("{}\n\n\na|b|c\nd|e|f\ng|h|i", words(80));
    set.text_layer = Box::new(MockTextLayer {
        default_text: table_text,
        delay: Duration::ZERO,
        calls: counters.text_layer.clone(),
    });
    let processed = pipeline().process(&set, &path).unwrap();

    assert_eq!(processed.result.status, ExtractionStatus::Success);
    assert_eq!(processed.tables.len(), 1);
    assert_eq!(processed.tables[0].row_count(), 3);
    assert_eq!(processed.tables[0].column_count(), 3);
}

#[test]
fn test_batch_isolates_failures_and_counts_add_up() {
    // Ten inputs: seven good, two invalid files, one over the time
    // limit. attempted == succeeded + failed must hold.
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let mut paths: Vec<PathBuf> = ["a", "b", "c", "d", "e", "f", "g"]
        .iter()
        .map(|n| write_pdf(input.path(), &format!("{}.pdf", n)))
        .collect();
    for name in ["bad1.pdf", "bad2.pdf"] {
        let path = input.path().join(name);
        std::fs::write(&path, b"html, not pdf").unwrap();
        paths.push(path);
    }
    paths.push(write_pdf(input.path(), "slow.pdf"));
    assert_eq!(paths.len(), 10);

    let scheduler = BatchScheduler::new(pipeline(), OutputWriter::new(output.path()))
        .with_workers(4)
        .with_timeout(Duration::from_millis(250));
    let report = scheduler
        .run(paths.clone(), &|| {
            engine_set(&Counters::new(), 300, Duration::from_secs(10))
        })
        .unwrap();

    assert_eq!(report.attempted, 10);
    assert_eq!(report.succeeded, 7);
    assert_eq!(report.failed, 3);
    assert_eq!(report.attempted, report.succeeded + report.failed);

    let mut reported: Vec<_> = report.outcomes.iter().map(|o| o.path.clone()).collect();
    reported.sort();
    paths.sort();
    assert_eq!(reported, paths);

    // Artifacts for survivors, reports always.
    assert!(output.path().join("txt/a.txt").exists());
    assert!(output.path().join("quality/a_qc.txt").exists());
    assert!(output.path().join("report.json").exists());
    assert!(output.path().join("report.txt").exists());
    assert!(!output.path().join("txt/bad1.txt").exists());
}

#[test]
fn test_single_run_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "stable.pdf");

    let run = || {
        let counters = Counters::new();
        let set = engine_set(&counters, 120, Duration::ZERO);
        pipeline().process(&set, &path).unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first.result.status, second.result.status);
    assert_eq!(first.text, second.text);
    assert_eq!(first.metrics, second.metrics);
}
