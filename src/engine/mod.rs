//! Extraction engine: quality gating, retries, and the strategy ladder.

mod extraction;
mod quality;
mod retry;
mod traits;

pub use extraction::{ExtractionEngine, ExtractionOptions};
pub use quality::{GateDecision, QualityGate, QualityMetrics, QualityThresholds, RejectReason};
pub use retry::{RetryConfig, RetryPolicy};
pub use traits::{
    EngineSet, EnhancementProfile, ImageEnhancer, LayoutProbe, PageImage, PageRenderer,
    Recognition, RecognitionEngine, TextLayer,
};
