//! Layout regions and bounding boxes.

use serde::{Deserialize, Serialize};

/// Kind of layout element a region represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionType {
    Text,
    Title,
    List,
    Table,
    Figure,
}

/// Axis-aligned bounding box in page coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// A box with negative width or height is never kept.
    pub fn is_degenerate(&self) -> bool {
        self.x2 < self.x1 || self.y2 < self.y1
    }
}

/// A detected layout element with type, position, and optional content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub region_type: RegionType,
    pub bbox: BoundingBox,
    /// Text associated with this region, if already known.
    pub text: Option<String>,
    /// Detector confidence in [0, 1].
    pub confidence: Option<f32>,
}

impl Region {
    pub fn new(region_type: RegionType, bbox: BoundingBox) -> Self {
        Self {
            region_type,
            bbox,
            text: None,
            confidence: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set confidence, clamped into [0, 1].
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }
}

/// Drop regions whose bounding boxes are degenerate.
///
/// Run before any structuring step so downstream consumers never see a
/// negative-extent box.
pub fn drop_degenerate(regions: Vec<Region>) -> Vec<Region> {
    let before = regions.len();
    let kept: Vec<Region> = regions
        .into_iter()
        .filter(|r| !r.bbox.is_degenerate())
        .collect();
    if kept.len() < before {
        log::debug!("dropped {} degenerate region(s)", before - kept.len());
    }
    kept
}
