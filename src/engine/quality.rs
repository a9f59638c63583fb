//! Quality metrics and the accept/reject gate between strategies.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").unwrap())
}

/// Metrics describing a piece of extracted text.
///
/// Derived data: always recomputed from the text it describes, never
/// cached or persisted on its own. Rescanning is cheap relative to the
/// extraction that produced the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub char_count: usize,
    pub word_count: usize,
    pub line_count: usize,
    pub sentence_count: usize,
    pub avg_word_length: f64,
    pub avg_words_per_line: f64,
    pub whitespace_ratio: f64,
    pub bullet_point_count: usize,
}

impl QualityMetrics {
    /// Compute metrics for a text. Pure and deterministic.
    pub fn compute(text: &str) -> Self {
        let char_count = text.chars().count();
        let lines: Vec<&str> = text.lines().collect();

        // Word-boundary match, never raw length: whitespace-only or
        // punctuation-only text counts zero words.
        let words: Vec<&str> = word_regex().find_iter(text).map(|m| m.as_str()).collect();
        let word_count = words.len();

        let sentence_count = text
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count();

        let total_word_len: usize = words.iter().map(|w| w.chars().count()).sum();
        let avg_word_length = if word_count > 0 {
            total_word_len as f64 / word_count as f64
        } else {
            0.0
        };
        let avg_words_per_line = if !lines.is_empty() {
            word_count as f64 / lines.len() as f64
        } else {
            0.0
        };
        let whitespace_ratio = if char_count > 0 {
            text.chars().filter(|c| *c == ' ').count() as f64 / char_count as f64
        } else {
            0.0
        };
        let bullet_point_count =
            text.chars().filter(|c| *c == '•').count() + text.chars().filter(|c| *c == '*').count();

        Self {
            char_count,
            word_count,
            line_count: lines.len(),
            sentence_count,
            avg_word_length,
            avg_words_per_line,
            whitespace_ratio,
            bullet_point_count,
        }
    }
}

/// Thresholds the gate evaluates against.
///
/// Part of the extraction configuration; defaults documented here and
/// overridable per profile or per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    /// Minimum words for a strategy's output to be accepted. Default 50.
    pub min_word_count: usize,
    /// Minimum bullet markers, for documents expected to be
    /// list-structured. Unset by default.
    pub min_bullet_points: Option<usize>,
}

impl QualityThresholds {
    /// Standard profile: 50-word floor.
    pub fn standard() -> Self {
        Self {
            min_word_count: 50,
            min_bullet_points: None,
        }
    }

    /// Strict profile: 100-word floor.
    pub fn strict() -> Self {
        Self {
            min_word_count: 100,
            min_bullet_points: None,
        }
    }

    pub fn with_min_bullet_points(mut self, min: usize) -> Self {
        self.min_bullet_points = Some(min);
        self
    }
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self::standard()
    }
}

/// Why the gate rejected a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Empty,
    WordCount { found: usize, min: usize },
    BulletPoints { found: usize, min: usize },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Empty => write!(f, "no characters extracted"),
            RejectReason::WordCount { found, min } => {
                write!(f, "word count {} below minimum {}", found, min)
            }
            RejectReason::BulletPoints { found, min } => {
                write!(f, "bullet marker count {} below minimum {}", found, min)
            }
        }
    }
}

/// Gate decision: accept the strategy's output or escalate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Accept,
    Reject(RejectReason),
}

impl GateDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, GateDecision::Accept)
    }
}

/// The quality checkpoint between extraction strategies.
pub struct QualityGate;

impl QualityGate {
    /// Evaluate a text against thresholds. Pure, deterministic, no I/O.
    pub fn evaluate(text: &str, thresholds: &QualityThresholds) -> GateDecision {
        let metrics = QualityMetrics::compute(text);

        if metrics.char_count == 0 {
            return GateDecision::Reject(RejectReason::Empty);
        }
        if metrics.word_count < thresholds.min_word_count {
            return GateDecision::Reject(RejectReason::WordCount {
                found: metrics.word_count,
                min: thresholds.min_word_count,
            });
        }
        if let Some(min) = thresholds.min_bullet_points {
            if metrics.bullet_point_count < min {
                return GateDecision::Reject(RejectReason::BulletPoints {
                    found: metrics.bullet_point_count,
                    min,
                });
            }
        }
        GateDecision::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_metrics_basic() {
        let m = QualityMetrics::compute("Hello world.\nSecond line here!");
        assert_eq!(m.word_count, 5);
        assert_eq!(m.line_count, 2);
        assert_eq!(m.sentence_count, 2);
        assert!(m.avg_word_length > 4.0);
    }

    #[test]
    fn test_metrics_whitespace_only_is_zero_words() {
        let m = QualityMetrics::compute("   \n\t  \n ");
        assert_eq!(m.word_count, 0);
        assert!(m.char_count > 0);
        assert_eq!(m.avg_word_length, 0.0);
    }

    #[test]
    fn test_metrics_punctuation_only() {
        let m = QualityMetrics::compute("... --- !!! ???");
        assert_eq!(m.word_count, 0);
        assert_eq!(m.sentence_count, 1); // the dashes between separators
    }

    #[test]
    fn test_metrics_empty() {
        let m = QualityMetrics::compute("");
        assert_eq!(m.char_count, 0);
        assert_eq!(m.whitespace_ratio, 0.0);
    }

    #[test]
    fn test_metrics_bullets() {
        let m = QualityMetrics::compute("• first\n• second\n* third");
        assert_eq!(m.bullet_point_count, 3);
    }

    #[test]
    fn test_gate_deterministic() {
        let text = words(60);
        let thresholds = QualityThresholds::standard();
        let first = QualityGate::evaluate(&text, &thresholds);
        for _ in 0..10 {
            assert_eq!(QualityGate::evaluate(&text, &thresholds), first);
        }
    }

    #[test]
    fn test_gate_rejects_empty() {
        let d = QualityGate::evaluate("", &QualityThresholds::standard());
        assert_eq!(d, GateDecision::Reject(RejectReason::Empty));
    }

    #[test]
    fn test_gate_word_count_thresholds() {
        let fifty = words(50);
        assert!(QualityGate::evaluate(&fifty, &QualityThresholds::standard()).is_accept());
        assert!(!QualityGate::evaluate(&fifty, &QualityThresholds::strict()).is_accept());
        assert!(QualityGate::evaluate(&words(100), &QualityThresholds::strict()).is_accept());

        match QualityGate::evaluate(&words(20), &QualityThresholds::standard()) {
            GateDecision::Reject(RejectReason::WordCount { found, min }) => {
                assert_eq!(found, 20);
                assert_eq!(min, 50);
            }
            other => panic!("expected word-count reject, got {:?}", other),
        }
    }

    #[test]
    fn test_gate_bullet_minimum() {
        let thresholds = QualityThresholds::standard().with_min_bullet_points(2);
        let listy = format!("• one\n• two\n{}", words(60));
        assert!(QualityGate::evaluate(&listy, &thresholds).is_accept());

        let flat = words(60);
        assert!(matches!(
            QualityGate::evaluate(&flat, &thresholds),
            GateDecision::Reject(RejectReason::BulletPoints { .. })
        ));
    }
}
