//! Worker-pool fan-out over a set of documents.
//!
//! Workers pull paths from a shared channel and push outcomes back as
//! they finish, so aggregation happens in completion order and never
//! blocks on a slow sibling. Each worker owns its own collaborator set;
//! nothing mutable is shared between units of work.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossbeam_channel::{bounded, unbounded, RecvTimeoutError};

use crate::engine::EngineSet;
use crate::error::{Error, Result};
use crate::model::{BatchReport, DocumentOutcome};
use crate::pipeline::DocumentPipeline;

use super::output::OutputWriter;

/// Builds one collaborator set per worker.
pub type EngineFactory = dyn Fn() -> EngineSet + Send + Sync;

/// Fixed-size pool driving [`DocumentPipeline`] over many documents.
pub struct BatchScheduler {
    pipeline: Arc<DocumentPipeline>,
    writer: OutputWriter,
    workers: usize,
    chunk_size: usize,
    timeout: Option<Duration>,
}

impl BatchScheduler {
    pub fn new(pipeline: DocumentPipeline, writer: OutputWriter) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            writer,
            workers: default_workers(),
            chunk_size: 1,
            timeout: None,
        }
    }

    /// Override the worker count. Zero falls back to the default.
    pub fn with_workers(mut self, workers: usize) -> Self {
        if workers > 0 {
            self.workers = workers;
        }
        self
    }

    /// Documents handed to a worker per scheduling step, default one.
    /// Larger chunks cut channel traffic for big batches of small
    /// documents at the cost of coarser load balancing. Zero is
    /// treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        if chunk_size > 0 {
            self.chunk_size = chunk_size;
        }
        self
    }

    /// Cap wall-clock time per document.
    ///
    /// A unit that exceeds the limit is recorded as failed and its
    /// worker moves on, but the unit's own thread is not killed: it
    /// runs to completion in the background with its result discarded.
    /// Stragglers are therefore bounded by the number of timed-out
    /// documents, not by the worker count; external commands should
    /// carry their own time limits to keep that tail short.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Process every document and aggregate a report.
    ///
    /// One document's failure never aborts the batch: ingest errors,
    /// extraction failures, timeouts, and worker panics all land as
    /// failed outcomes in the report. Only infrastructure failures,
    /// where neither artifacts nor the report can be persisted, abort
    /// the whole run.
    pub fn run(&self, documents: Vec<PathBuf>, factory: &EngineFactory) -> Result<BatchReport> {
        let started_at = Utc::now();
        let start = Instant::now();
        let total = documents.len();

        if total == 0 {
            return Ok(BatchReport::from_outcomes(started_at, vec![], start.elapsed()));
        }
        self.writer.ensure_layout().map_err(|e| {
            Error::Batch(format!("cannot prepare output root: {}", e))
        })?;

        let workers = self.workers.min(total);
        log::info!("processing {} document(s) with {} worker(s)", total, workers);

        let (job_tx, job_rx) = unbounded::<Vec<PathBuf>>();
        let (result_tx, result_rx) = unbounded::<DocumentOutcome>();
        for chunk in documents.chunks(self.chunk_size) {
            job_tx.send(chunk.to_vec()).expect("job channel open");
        }
        drop(job_tx);

        let mut outcomes = Vec::with_capacity(total);
        thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let engines = Arc::new(factory());
                let pipeline = Arc::clone(&self.pipeline);
                let writer = self.writer.clone();
                let timeout = self.timeout;
                scope.spawn(move || {
                    'jobs: while let Ok(chunk) = job_rx.recv() {
                        for path in chunk {
                            let outcome = run_unit(&pipeline, &engines, &writer, path, timeout);
                            if result_tx.send(outcome).is_err() {
                                break 'jobs;
                            }
                        }
                    }
                });
            }
            drop(result_tx);

            // Aggregate in completion order.
            while let Ok(outcome) = result_rx.recv() {
                if outcome.is_failure() {
                    log::warn!(
                        "{}: failed: {}",
                        outcome.path.display(),
                        outcome.error.as_deref().unwrap_or("unknown cause")
                    );
                }
                outcomes.push(outcome);
            }
        });

        let report = BatchReport::from_outcomes(started_at, outcomes, start.elapsed());
        self.writer
            .write_report(&report)
            .map_err(|e| Error::Batch(format!("cannot write batch report: {}", e)))?;
        log::info!("{}", report.summary());
        Ok(report)
    }
}

/// Workers default to available parallelism minus one, at least one.
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1).max(1))
        .unwrap_or(1)
}

/// Process one document, guarding against panic and timeout.
fn run_unit(
    pipeline: &Arc<DocumentPipeline>,
    engines: &Arc<EngineSet>,
    writer: &OutputWriter,
    path: PathBuf,
    timeout: Option<Duration>,
) -> DocumentOutcome {
    let start = Instant::now();
    let processed = match timeout {
        Some(limit) => {
            let (tx, rx) = bounded(1);
            let pipeline = Arc::clone(pipeline);
            let engines = Arc::clone(engines);
            let unit_path = path.clone();
            // Detached on purpose: if the limit expires the unit keeps
            // running to completion but its result is discarded, and
            // this worker moves on.
            thread::spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(|| {
                    pipeline.process(&engines, &unit_path)
                }));
                let _ = tx.send(result);
            });
            match rx.recv_timeout(limit) {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => {
                    return DocumentOutcome::failed(
                        path,
                        Error::Timeout(limit).to_string(),
                        start.elapsed(),
                    );
                }
                Err(RecvTimeoutError::Disconnected) => {
                    // Sender dropped without a value: the unit panicked
                    // hard enough to poison its own channel send.
                    return DocumentOutcome::failed(
                        path,
                        "worker thread terminated unexpectedly",
                        start.elapsed(),
                    );
                }
            }
        }
        None => catch_unwind(AssertUnwindSafe(|| pipeline.process(engines, &path))),
    };

    let processed = match processed {
        Ok(inner) => inner,
        Err(panic) => {
            return DocumentOutcome::failed(path, panic_message(panic), start.elapsed());
        }
    };

    match processed {
        Ok(doc) if doc.result.is_usable() => match writer.write_document(&doc) {
            Ok(output) => {
                DocumentOutcome::succeeded(path, doc.result.status, output, start.elapsed())
            }
            Err(e) => DocumentOutcome::failed(path, e.to_string(), start.elapsed()),
        },
        Ok(doc) => {
            let cause = doc
                .result
                .failure
                .clone()
                .unwrap_or_else(|| "extraction failed".to_string());
            DocumentOutcome::failed(path, cause, start.elapsed())
        }
        Err(e) => DocumentOutcome::failed(path, e.to_string(), start.elapsed()),
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("worker panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("worker panicked: {}", s)
    } else {
        "worker panicked".to_string()
    }
}
