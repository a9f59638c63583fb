//! Batch orchestration: worker pool, artifact persistence, reporting.

mod output;
mod scheduler;

pub use output::OutputWriter;
pub use scheduler::{default_workers, BatchScheduler, EngineFactory};
