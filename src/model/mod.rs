//! Data model for the mining pipeline.
//!
//! These types carry content between components: an ingested [`Document`],
//! the [`ExtractionResult`] its run produces, [`Region`]s from layout
//! probing, [`TableRecord`]s from table detection, and the batch-level
//! [`BatchReport`].

mod document;
mod region;
mod report;
mod result;
mod table;

pub use document::Document;
pub use region::{drop_degenerate, BoundingBox, Region, RegionType};
pub use report::{BatchReport, DocumentOutcome};
pub use result::{AttemptOutcome, ExtractionResult, ExtractionStatus, Strategy, StrategyAttempt};
pub use table::TableRecord;
