//! Run configuration, loadable from a TOML file.
//!
//! Every field has a working default; absence of a config file never
//! prevents operation.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::backends::{
    CommandEnhancer, CommandRecognizer, CommandRenderer, HeuristicLayoutProbe, LopdfTextLayer,
    NoopEnhancer,
};
use crate::engine::{
    EngineSet, EnhancementProfile, ExtractionOptions, QualityThresholds, RetryConfig,
};
use crate::error::{Error, Result};
use crate::normalize::NormalizePreset;
use crate::tables::TableDetectorConfig;

pub const DEFAULT_CONFIG_FILE: &str = "docmine.toml";

/// External recognition engine invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct RecognizerConfig {
    pub name: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// External image enhancement invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct EnhancerConfig {
    pub program: String,
    #[serde(default)]
    pub default_args: Vec<String>,
    #[serde(default)]
    pub high_contrast_args: Vec<String>,
}

/// Full run configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Worker count; zero means available parallelism minus one.
    pub workers: usize,
    /// Documents handed to a worker per scheduling step; zero means one.
    pub chunk_size: usize,
    pub render_dpi: u32,
    pub enhancement: EnhancementProfile,
    /// Per-document wall-clock limit in seconds; zero disables it.
    pub timeout_secs: u64,
    pub thresholds: QualityThresholds,
    pub normalize: NormalizePreset,
    pub retry: RetryConfig,
    pub tables: TableDetectorConfig,
    /// Master switch for the OCR rungs; off means text layer only.
    pub ocr: bool,
    /// Recognition engines, tried in listed order.
    pub recognizers: Vec<RecognizerConfig>,
    /// Optional external enhancer; pages pass through untouched without one.
    pub enhancer: Option<EnhancerConfig>,
    /// Renderer program, pdftoppm-compatible.
    pub renderer: String,
    /// Attach heuristic layout regions to results.
    pub layout_probe: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            chunk_size: 1,
            render_dpi: 300,
            enhancement: EnhancementProfile::Default,
            timeout_secs: 0,
            thresholds: QualityThresholds::standard(),
            normalize: NormalizePreset::Standard,
            retry: RetryConfig::default(),
            tables: TableDetectorConfig::default(),
            ocr: true,
            recognizers: Vec::new(),
            enhancer: None,
            renderer: "pdftoppm".to_string(),
            layout_probe: true,
        }
    }
}

impl PipelineConfig {
    /// Load from an explicit path, or fall back to defaults when the
    /// conventional file is absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let conventional = Path::new(DEFAULT_CONFIG_FILE);
                if conventional.exists() {
                    Self::from_file(conventional)
                } else {
                    log::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn extraction_options(&self) -> ExtractionOptions {
        ExtractionOptions {
            thresholds: self.thresholds.clone(),
            render_dpi: self.render_dpi,
            enhancement: self.enhancement,
            retry: self.retry.clone(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Build the collaborator set this configuration describes.
    ///
    /// Empty `recognizers` gets the stock tesseract pair, fast first.
    pub fn engine_set(&self) -> EngineSet {
        let recognizers: Vec<Box<dyn crate::engine::RecognitionEngine>> =
            if !self.ocr {
                Vec::new()
            } else if self.recognizers.is_empty() {
                vec![
                    Box::new(CommandRecognizer::tesseract_fast()),
                    Box::new(CommandRecognizer::tesseract_robust()),
                ]
            } else {
                self.recognizers
                    .iter()
                    .map(|r| {
                        Box::new(CommandRecognizer::new(
                            r.name.clone(),
                            r.program.clone(),
                            r.args.clone(),
                        )) as Box<dyn crate::engine::RecognitionEngine>
                    })
                    .collect()
            };

        let enhancer: Box<dyn crate::engine::ImageEnhancer> = match &self.enhancer {
            Some(cfg) => Box::new(CommandEnhancer::new(
                cfg.program.clone(),
                cfg.default_args.clone(),
                cfg.high_contrast_args.clone(),
            )),
            None => Box::new(NoopEnhancer),
        };

        EngineSet {
            text_layer: Box::new(LopdfTextLayer::new()),
            renderer: Box::new(CommandRenderer::new(self.renderer.clone())),
            enhancer,
            recognizers,
            probe: self.layout_probe.then(|| {
                Box::new(HeuristicLayoutProbe::new()) as Box<dyn crate::engine::LayoutProbe>
            }),
        }
    }
}
