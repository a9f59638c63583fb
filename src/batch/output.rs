//! Artifact persistence for processed documents.
//!
//! Layout under the output root is deterministic given a document's
//! base name:
//!
//! ```text
//! out/
//!   txt/{base}.txt
//!   csv/{base}_table{n}.csv
//!   quality/{base}_qc.txt
//!   report.json
//!   report.txt
//! ```

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;

use crate::error::Result;
use crate::model::{BatchReport, TableRecord};
use crate::pipeline::ProcessedDocument;

const SAMPLE_CHARS: usize = 500;

/// Writes per-document and batch-level artifacts under one root.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the output directory tree. Call once before workers start.
    pub fn ensure_layout(&self) -> Result<()> {
        for sub in ["txt", "csv", "quality"] {
            fs::create_dir_all(self.root.join(sub))?;
        }
        Ok(())
    }

    /// Persist one document's artifacts, returning the text artifact path.
    pub fn write_document(&self, processed: &ProcessedDocument) -> Result<PathBuf> {
        let base = processed.base_name();

        let text_path = self.root.join("txt").join(format!("{}.txt", base));
        fs::write(&text_path, &processed.text)?;

        for (index, table) in processed.tables.iter().enumerate() {
            let csv_path = self
                .root
                .join("csv")
                .join(format!("{}_table{}.csv", base, index + 1));
            fs::write(&csv_path, render_csv(table))?;
        }

        let qc_path = self.root.join("quality").join(format!("{}_qc.txt", base));
        fs::write(&qc_path, self.render_quality(processed))?;

        log::debug!(
            "{}: wrote artifacts ({} table(s))",
            processed.source.display(),
            processed.tables.len()
        );
        Ok(text_path)
    }

    /// Persist the batch report as JSON alongside a plain-text rendering.
    pub fn write_report(&self, report: &BatchReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| crate::error::Error::Other(e.to_string()))?;
        fs::write(self.root.join("report.json"), json)?;

        let mut out = fs::File::create(self.root.join("report.txt"))?;
        writeln!(out, "{}", report.summary())?;
        writeln!(out)?;
        for line in report.detail_lines() {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    fn render_quality(&self, processed: &ProcessedDocument) -> String {
        let m = &processed.metrics;
        let sample: String = processed.text.chars().take(SAMPLE_CHARS).collect();
        format!(
            "source: {}\nstatus: {}\nstrategies: {}\n\
             chars: {}\nwords: {}\nlines: {}\nsentences: {}\n\
             avg word length: {:.2}\navg words/line: {:.2}\n\
             whitespace ratio: {:.3}\nbullet points: {}\n\n\
             --- sample ---\n{}\n",
            processed.source.display(),
            processed.result.status,
            processed
                .result
                .strategy_path()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(" -> "),
            m.char_count,
            m.word_count,
            m.line_count,
            m.sentence_count,
            m.avg_word_length,
            m.avg_words_per_line,
            m.whitespace_ratio,
            m.bullet_point_count,
            sample
        )
    }
}

/// RFC 4180 style: quote cells containing the delimiter, quotes, or
/// newlines. Rows are padded to the widest row of the table.
fn render_csv(table: &TableRecord) -> String {
    let mut out = String::new();
    for row in table.padded_rows() {
        let line: Vec<String> = row.iter().map(|cell| escape_cell(cell)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
