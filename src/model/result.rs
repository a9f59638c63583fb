//! Extraction outcome types.
//!
//! The strategy path taken for a document is recorded as data. Every
//! attempt carries its gate outcome, so the fallback order is a visible
//! contract rather than buried control flow.

use serde::{Deserialize, Serialize};

use super::region::Region;

/// An extraction strategy on the escalation ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Text already encoded in the document structure, no rendering.
    DirectText,
    /// Rendered pages recognized by the named engine.
    Recognition(String),
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::DirectText => write!(f, "direct-text"),
            Strategy::Recognition(engine) => write!(f, "ocr:{}", engine),
        }
    }
}

/// How a single strategy attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Output cleared the quality gate.
    Accepted,
    /// Output was produced but the gate rejected it.
    Rejected { reason: String },
    /// The strategy itself failed; treated as a rejection for escalation.
    Errored { cause: String },
}

/// One rung of the ladder: strategy plus its evaluated outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    pub strategy: Strategy,
    pub outcome: AttemptOutcome,
}

/// Terminal status of one document's extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    /// Some strategy cleared the quality gate.
    Success,
    /// Text was produced but no strategy cleared the gate; best-effort
    /// output is returned rather than discarded.
    Degraded,
    /// A structural failure ended extraction with no usable output.
    Failed,
}

impl std::fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionStatus::Success => write!(f, "success"),
            ExtractionStatus::Degraded => write!(f, "degraded"),
            ExtractionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Result of running the extraction ladder on one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Attempts in the order they were made.
    pub attempts: Vec<StrategyAttempt>,
    /// Final text, possibly empty for failed or fully-errored runs.
    pub text: String,
    /// Layout regions contributed by the probe, degenerate boxes dropped.
    pub regions: Vec<Region>,
    pub status: ExtractionStatus,
    /// Human-readable cause when `status == Failed`.
    pub failure: Option<String>,
}

impl ExtractionResult {
    pub fn success(attempts: Vec<StrategyAttempt>, text: String, regions: Vec<Region>) -> Self {
        Self {
            attempts,
            text,
            regions,
            status: ExtractionStatus::Success,
            failure: None,
        }
    }

    pub fn degraded(attempts: Vec<StrategyAttempt>, text: String, regions: Vec<Region>) -> Self {
        Self {
            attempts,
            text,
            regions,
            status: ExtractionStatus::Degraded,
            failure: None,
        }
    }

    pub fn failed(attempts: Vec<StrategyAttempt>, cause: impl Into<String>) -> Self {
        Self {
            attempts,
            text: String::new(),
            regions: Vec::new(),
            status: ExtractionStatus::Failed,
            failure: Some(cause.into()),
        }
    }

    /// Strategies attempted, in order.
    pub fn strategy_path(&self) -> Vec<&Strategy> {
        self.attempts.iter().map(|a| &a.strategy).collect()
    }

    /// Number of recognition attempts on the path.
    pub fn recognition_attempts(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| matches!(a.strategy, Strategy::Recognition(_)))
            .count()
    }

    pub fn is_usable(&self) -> bool {
        self.status != ExtractionStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::DirectText.to_string(), "direct-text");
        assert_eq!(
            Strategy::Recognition("tesseract".into()).to_string(),
            "ocr:tesseract"
        );
    }

    #[test]
    fn test_strategy_path_order() {
        let result = ExtractionResult::degraded(
            vec![
                StrategyAttempt {
                    strategy: Strategy::DirectText,
                    outcome: AttemptOutcome::Rejected {
                        reason: "word count 3 below 50".into(),
                    },
                },
                StrategyAttempt {
                    strategy: Strategy::Recognition("fast".into()),
                    outcome: AttemptOutcome::Rejected {
                        reason: "word count 20 below 50".into(),
                    },
                },
                StrategyAttempt {
                    strategy: Strategy::Recognition("robust".into()),
                    outcome: AttemptOutcome::Rejected {
                        reason: "word count 30 below 50".into(),
                    },
                },
            ],
            "best effort".into(),
            vec![],
        );

        assert_eq!(result.recognition_attempts(), 2);
        assert_eq!(result.strategy_path()[0], &Strategy::DirectText);
        assert!(result.is_usable());
    }

    #[test]
    fn test_failed_result_carries_cause() {
        let result = ExtractionResult::failed(vec![], "Document is password protected");
        assert_eq!(result.status, ExtractionStatus::Failed);
        assert!(result.failure.as_deref().unwrap().contains("password"));
        assert!(!result.is_usable());
    }
}
