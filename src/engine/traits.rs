//! Capability interfaces for external collaborators.
//!
//! Rendering, enhancement, recognition, and layout probing are external
//! services consumed through these narrow traits. The set of available
//! recognition engines is a fixed, ordered list; a missing engine is a
//! configuration error surfaced at startup, never a silent runtime
//! fallback.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{Document, Region};

/// A rendered page raster.
///
/// Transient artifact owned by one extraction run: produced by rendering,
/// consumed by recognition, discarded with the run's working directory.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub page_number: u32,
    pub path: PathBuf,
}

impl PageImage {
    pub fn new(page_number: u32, path: PathBuf) -> Self {
        Self { page_number, path }
    }
}

/// Named enhancement profile applied before recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnhancementProfile {
    /// Plain grayscale cleanup.
    #[default]
    Default,
    /// Contrast boost and sharpening for low-quality scans.
    HighContrast,
}

/// Output of one recognition call.
#[derive(Debug, Clone)]
pub struct Recognition {
    pub text: String,
    /// Engine-reported confidence in [0, 1], if the engine provides one.
    pub confidence: Option<f32>,
}

/// Direct text-layer access: reading text already encoded in the document
/// structure, without rendering.
pub trait TextLayer: Send + Sync {
    /// Extract the full text layer, pages concatenated in order.
    fn extract(&self, document: &Document) -> Result<String>;
}

/// Renders document pages to raster images at a given resolution.
pub trait PageRenderer: Send + Sync {
    /// Render all pages into `workdir`, returned in page order.
    fn render(&self, document: &Document, dpi: u32, workdir: &Path) -> Result<Vec<PageImage>>;
}

/// Prepares a page image for recognition.
pub trait ImageEnhancer: Send + Sync {
    fn enhance(&self, image: &PageImage, profile: EnhancementProfile) -> Result<PageImage>;
}

/// Derives text from a rasterized page image.
pub trait RecognitionEngine: Send + Sync {
    /// Stable engine name, recorded on the strategy path.
    fn name(&self) -> &str;

    fn recognize(&self, image: &PageImage) -> Result<Recognition>;

    /// Whether the engine can run at all (binary present, model loaded).
    fn available(&self) -> bool {
        true
    }
}

/// Black-box region detector over extracted text.
pub trait LayoutProbe: Send + Sync {
    fn probe(&self, text: &str) -> Vec<Region>;
}

/// The full collaborator set one worker owns.
///
/// Expensive to construct, cheap to reuse: built once per worker, never
/// shared mutably across workers.
pub struct EngineSet {
    pub text_layer: Box<dyn TextLayer>,
    pub renderer: Box<dyn PageRenderer>,
    pub enhancer: Box<dyn ImageEnhancer>,
    /// Recognition engines in escalation order: fastest first.
    pub recognizers: Vec<Box<dyn RecognitionEngine>>,
    pub probe: Option<Box<dyn LayoutProbe>>,
}

impl EngineSet {
    /// Verify the configured collaborators before any work is scheduled.
    pub fn validate(&self) -> Result<()> {
        if self.recognizers.is_empty() {
            return Err(Error::Config(
                "no recognition engines configured".to_string(),
            ));
        }
        for engine in &self.recognizers {
            if !engine.available() {
                return Err(Error::BackendUnavailable(engine.name().to_string()));
            }
        }
        Ok(())
    }

    /// Engine names in escalation order.
    pub fn engine_order(&self) -> Vec<&str> {
        self.recognizers.iter().map(|e| e.name()).collect()
    }
}
