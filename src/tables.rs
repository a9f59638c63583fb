//! Heuristic table detection over extracted text.
//!
//! Candidate blocks are separated by runs of two or more blank lines.
//! A block qualifies as a table when a delimiter character appears at
//! least twice per line on average across its sampled lines, or when
//! every sampled line splits into the same multi-token count on
//! whitespace.

use serde::Deserialize;

use crate::model::TableRecord;

/// Delimiters checked in priority order.
const DELIMITERS: [char; 3] = ['|', '\t', ','];

/// Tuning for the block classifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableDetectorConfig {
    /// Blocks shorter than this are never tables.
    pub min_block_lines: usize,
    /// How many leading lines of a block the classifier samples.
    pub sample_lines: usize,
    /// Minimum average delimiter occurrences per sampled line.
    pub per_line_factor: usize,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_block_lines: 3,
            sample_lines: 5,
            per_line_factor: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitRule {
    Delimiter(char),
    Whitespace,
}

#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    pub fn new(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Find tabular blocks and convert them to row/column records.
    pub fn detect(&self, text: &str) -> Vec<TableRecord> {
        split_blocks(text)
            .into_iter()
            .filter_map(|block| self.classify(&block).map(|rule| build_record(&block, rule)))
            .filter(|record| !record.is_empty())
            .collect()
    }

    /// Decide whether a block is a table and how to split its lines.
    fn classify(&self, lines: &[&str]) -> Option<SplitRule> {
        if lines.len() < self.config.min_block_lines {
            return None;
        }
        let sample = &lines[..lines.len().min(self.config.sample_lines)];
        let threshold = self.config.per_line_factor * sample.len();

        for delim in DELIMITERS {
            let total: usize = sample
                .iter()
                .map(|line| line.matches(delim).count())
                .sum();
            if total >= threshold {
                return Some(SplitRule::Delimiter(delim));
            }
        }

        // Uniform column counts on whitespace also read as tabular, but
        // single-token lines are just a narrow paragraph.
        let mut counts = sample.iter().map(|line| line.split_whitespace().count());
        let first = counts.next()?;
        if first >= 2 && counts.all(|c| c == first) {
            return Some(SplitRule::Whitespace);
        }
        None
    }
}

/// Split text into blocks on runs of two or more blank lines.
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut blank_run = 0usize;

    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run >= 2 && !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            blank_run = 0;
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn build_record(lines: &[&str], rule: SplitRule) -> TableRecord {
    let rows = lines
        .iter()
        .map(|line| split_row(line, rule))
        .filter(|row| !row.is_empty())
        .collect();
    TableRecord::from_rows(rows)
}

/// Split one line into cells, collapsing consecutive delimiter runs.
fn split_row(line: &str, rule: SplitRule) -> Vec<String> {
    match rule {
        SplitRule::Delimiter(delim) => line
            .split(delim)
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .map(String::from)
            .collect(),
        SplitRule::Whitespace => line.split_whitespace().map(String::from).collect(),
    }
}
