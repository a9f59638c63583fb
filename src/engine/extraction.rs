//! The extraction state machine.
//!
//! Fallback order is an explicit ladder, monotonic in cost: direct text
//! layer, then page rendering plus each configured recognition engine in
//! order. Every strategy's output passes the quality gate before the next
//! rung is tried; no strategy is re-run with itself. Retries for
//! transient faults are RetryPolicy's concern, not part of the ladder.

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{
    drop_degenerate, AttemptOutcome, Document, ExtractionResult, Region, Strategy, StrategyAttempt,
};

use super::quality::{GateDecision, QualityGate, QualityThresholds};
use super::retry::{RetryConfig, RetryPolicy};
use super::traits::{EngineSet, EnhancementProfile, PageImage};

/// Extraction tuning consumed by the engine.
#[derive(Debug, Clone, Default)]
pub struct ExtractionOptions {
    pub thresholds: QualityThresholds,
    pub render_dpi: u32,
    pub enhancement: EnhancementProfile,
    pub retry: RetryConfig,
}

impl ExtractionOptions {
    pub fn new() -> Self {
        Self {
            render_dpi: 300,
            ..Self::default()
        }
    }
}

/// States of one document's extraction run.
enum State {
    Start,
    /// Direct text layer evaluated; escalate to rendering.
    Render { attempts: Vec<StrategyAttempt> },
    /// Pages rendered and enhanced; try recognition engines in order.
    Recognize {
        attempts: Vec<StrategyAttempt>,
        pages: Vec<PageImage>,
        next_engine: usize,
        /// Best text so far on the OCR rungs; later attempts are assumed
        /// at least as informative, so this tracks the latest producer.
        last_text: Option<String>,
    },
    Done(ExtractionResult),
}

/// Drives the strategy ladder for single documents.
pub struct ExtractionEngine<'a> {
    engines: &'a EngineSet,
    options: &'a ExtractionOptions,
    retry: RetryPolicy,
}

impl<'a> ExtractionEngine<'a> {
    pub fn new(engines: &'a EngineSet, options: &'a ExtractionOptions) -> Self {
        Self {
            engines,
            options,
            retry: RetryPolicy::new(&options.retry),
        }
    }

    /// Run the ladder to completion for one document.
    ///
    /// Structural failures terminate with a `Failed` result; they are
    /// never surfaced as `Err` so one document's outcome stays a value
    /// the batch can aggregate.
    pub fn extract(&self, document: &Document) -> ExtractionResult {
        let workdir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                return ExtractionResult::failed(
                    vec![],
                    format!("cannot create working directory: {}", e),
                )
            }
        };

        // Page images live in `workdir` and are dropped with the run.
        let mut state = State::Start;
        loop {
            match self.step(state, document, workdir.path()) {
                State::Done(result) => {
                    log::info!(
                        "{}: {} after {} attempt(s)",
                        document.source().display(),
                        result.status,
                        result.attempts.len()
                    );
                    return result;
                }
                next => state = next,
            }
        }
    }

    /// The single forced transition function.
    fn step(&self, state: State, document: &Document, workdir: &Path) -> State {
        match state {
            State::Start => self.attempt_direct(document),
            State::Render { attempts } => self.attempt_render(document, workdir, attempts),
            State::Recognize {
                attempts,
                pages,
                next_engine,
                last_text,
            } => self.attempt_recognition(document, attempts, pages, next_engine, last_text),
            done @ State::Done(_) => done,
        }
    }

    fn attempt_direct(&self, document: &Document) -> State {
        let extracted = self
            .retry
            .run("direct-text", || self.engines.text_layer.extract(document));

        let mut attempts = Vec::new();
        match extracted {
            Ok(text) => match QualityGate::evaluate(&text, &self.options.thresholds) {
                GateDecision::Accept => {
                    attempts.push(StrategyAttempt {
                        strategy: Strategy::DirectText,
                        outcome: AttemptOutcome::Accepted,
                    });
                    return State::Done(ExtractionResult::success(
                        attempts,
                        text.clone(),
                        self.probe_regions(&text),
                    ));
                }
                GateDecision::Reject(reason) => {
                    log::debug!(
                        "{}: direct text rejected: {}",
                        document.source().display(),
                        reason
                    );
                    attempts.push(StrategyAttempt {
                        strategy: Strategy::DirectText,
                        outcome: AttemptOutcome::Rejected {
                            reason: reason.to_string(),
                        },
                    });
                }
            },
            Err(err) => {
                log::warn!(
                    "{}: direct extraction failed, escalating: {}",
                    document.source().display(),
                    err
                );
                attempts.push(StrategyAttempt {
                    strategy: Strategy::DirectText,
                    outcome: AttemptOutcome::Errored {
                        cause: err.to_string(),
                    },
                });
            }
        }
        State::Render { attempts }
    }

    fn attempt_render(
        &self,
        document: &Document,
        workdir: &Path,
        attempts: Vec<StrategyAttempt>,
    ) -> State {
        // Transient I/O is retried; structurally invalid documents
        // (corrupt, password-protected, zero pages) are terminal here.
        let rendered = self.retry.run("render", || {
            let pages = self
                .engines
                .renderer
                .render(document, self.options.render_dpi, workdir)?;
            if pages.is_empty() {
                return Err(Error::ZeroPages);
            }
            Ok(pages)
        });

        match rendered {
            Ok(pages) => {
                document.record_page_count(pages.len() as u32);
                let pages = self.enhance_pages(pages);
                State::Recognize {
                    attempts,
                    pages,
                    next_engine: 0,
                    last_text: None,
                }
            }
            Err(err) => {
                if err.is_structural() {
                    // Expected defect of the document itself.
                    log::info!("{}: unreadable: {}", document.source().display(), err);
                } else {
                    log::error!(
                        "{}: rendering failed: {}",
                        document.source().display(),
                        err
                    );
                }
                State::Done(ExtractionResult::failed(attempts, err.to_string()))
            }
        }
    }

    fn enhance_pages(&self, pages: Vec<PageImage>) -> Vec<PageImage> {
        pages
            .into_iter()
            .map(|page| {
                match self
                    .engines
                    .enhancer
                    .enhance(&page, self.options.enhancement)
                {
                    Ok(enhanced) => enhanced,
                    Err(e) => {
                        // Recognition still gets the raw raster.
                        log::warn!("page {} enhancement failed: {}", page.page_number, e);
                        page
                    }
                }
            })
            .collect()
    }

    fn attempt_recognition(
        &self,
        document: &Document,
        mut attempts: Vec<StrategyAttempt>,
        pages: Vec<PageImage>,
        next_engine: usize,
        mut last_text: Option<String>,
    ) -> State {
        let Some(engine) = self.engines.recognizers.get(next_engine) else {
            // Ladder exhausted: best-effort output, not discarded.
            let text = last_text.unwrap_or_default();
            let regions = self.probe_regions(&text);
            return State::Done(ExtractionResult::degraded(attempts, text, regions));
        };

        let strategy = Strategy::Recognition(engine.name().to_string());
        match self.recognize_pages(engine.as_ref(), &pages) {
            Ok(text) => {
                match QualityGate::evaluate(&text, &self.options.thresholds) {
                    GateDecision::Accept => {
                        attempts.push(StrategyAttempt {
                            strategy,
                            outcome: AttemptOutcome::Accepted,
                        });
                        let regions = self.probe_regions(&text);
                        return State::Done(ExtractionResult::success(attempts, text, regions));
                    }
                    GateDecision::Reject(reason) => {
                        log::debug!(
                            "{}: {} rejected: {}",
                            document.source().display(),
                            engine.name(),
                            reason
                        );
                        attempts.push(StrategyAttempt {
                            strategy,
                            outcome: AttemptOutcome::Rejected {
                                reason: reason.to_string(),
                            },
                        });
                        last_text = Some(text);
                    }
                }
            }
            Err(err) => {
                // A recognition error is a rejection for this rung, not a
                // terminal failure; the ladder continues.
                log::warn!(
                    "{}: {} errored, continuing down the ladder: {}",
                    document.source().display(),
                    engine.name(),
                    err
                );
                attempts.push(StrategyAttempt {
                    strategy,
                    outcome: AttemptOutcome::Errored {
                        cause: err.to_string(),
                    },
                });
            }
        }

        State::Recognize {
            attempts,
            pages,
            next_engine: next_engine + 1,
            last_text,
        }
    }

    /// Run one engine over all pages, concatenating text in page order.
    fn recognize_pages(
        &self,
        engine: &dyn super::traits::RecognitionEngine,
        pages: &[PageImage],
    ) -> Result<String> {
        let mut parts = Vec::with_capacity(pages.len());
        for page in pages {
            let recognition = self
                .retry
                .run(engine.name(), || engine.recognize(page))?;
            if let Some(confidence) = recognition.confidence {
                log::debug!(
                    "{} page {}: confidence {:.2}",
                    engine.name(),
                    page.page_number,
                    confidence
                );
            }
            parts.push(recognition.text);
        }
        Ok(parts.join("\n"))
    }

    fn probe_regions(&self, text: &str) -> Vec<Region> {
        match &self.engines.probe {
            Some(probe) => drop_degenerate(probe.probe(text)),
            None => Vec::new(),
        }
    }
}
