//! Tabular records extracted from document text.

use serde::{Deserialize, Serialize};

/// An ordered sequence of rows, each an ordered sequence of column cells.
///
/// Rows may have unequal column counts; padding to a rectangle happens
/// only at output serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecord {
    pub rows: Vec<Vec<String>>,
}

impl TableRecord {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row determines the column count.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows padded with empty cells to a uniform width, for serialization.
    pub fn padded_rows(&self) -> Vec<Vec<String>> {
        let width = self.column_count();
        self.rows
            .iter()
            .map(|row| {
                let mut padded = row.clone();
                padded.resize(width, String::new());
                padded
            })
            .collect()
    }
}

impl Default for TableRecord {
    fn default() -> Self {
        Self::new()
    }
}
