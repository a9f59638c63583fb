//! Batch run reporting.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::result::ExtractionStatus;

/// Outcome of processing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    pub status: ExtractionStatus,
    /// Where artifacts were written, for usable outcomes.
    pub output: Option<PathBuf>,
    /// Human-readable cause, for failed outcomes.
    pub error: Option<String>,
    pub elapsed: Duration,
}

impl DocumentOutcome {
    pub fn succeeded(
        path: PathBuf,
        status: ExtractionStatus,
        output: PathBuf,
        elapsed: Duration,
    ) -> Self {
        debug_assert_ne!(status, ExtractionStatus::Failed);
        Self {
            path,
            status,
            output: Some(output),
            error: None,
            elapsed,
        }
    }

    pub fn failed(path: PathBuf, cause: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            path,
            status: ExtractionStatus::Failed,
            output: None,
            error: Some(cause.into()),
            elapsed,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == ExtractionStatus::Failed
    }
}

/// Aggregated report for one batch run.
///
/// Counts are computed from completed worker results, never estimated:
/// `attempted == succeeded + failed` holds for every report, and every
/// input document appears in `outcomes` exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<DocumentOutcome>,
    pub attempted: usize,
    pub succeeded: usize,
    /// Subset of `succeeded` that finished below the quality threshold.
    pub degraded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl BatchReport {
    /// Finalize a report from completed outcomes.
    pub fn from_outcomes(
        started_at: DateTime<Utc>,
        outcomes: Vec<DocumentOutcome>,
        elapsed: Duration,
    ) -> Self {
        let attempted = outcomes.len();
        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        let degraded = outcomes
            .iter()
            .filter(|o| o.status == ExtractionStatus::Degraded)
            .count();
        Self {
            started_at,
            attempted,
            succeeded: attempted - failed,
            degraded,
            failed,
            elapsed,
            outcomes,
        }
    }

    /// Documents per second over the whole run.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempted as f64 / secs
        } else {
            0.0
        }
    }

    pub fn any_succeeded(&self) -> bool {
        self.succeeded > 0
    }

    /// Human-readable run summary.
    pub fn summary(&self) -> String {
        format!(
            "attempted {} | succeeded {} ({} degraded) | failed {} | {:.1}s | {:.2} docs/s",
            self.attempted,
            self.succeeded,
            self.degraded,
            self.failed,
            self.elapsed.as_secs_f64(),
            self.throughput()
        )
    }

    /// One line per document: path, status, cause if failed.
    pub fn detail_lines(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .map(|o| match &o.error {
                Some(cause) => format!("{}\t{}\t{}", o.path.display(), o.status, cause),
                None => format!("{}\t{}", o.path.display(), o.status),
            })
            .collect()
    }
}
