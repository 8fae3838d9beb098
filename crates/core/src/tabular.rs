//! Untyped rows as they come out of the tabular (CSV) parser.
//!
//! Column names are normalized on the way in so that `category_id`,
//! `categoryId` and `Category ID` all address the same cell.

use std::collections::HashMap;

/// One parsed input row, keyed by normalized column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularRow {
    /// 1-based position of the row in the upload (header excluded).
    pub line: usize,
    cells: HashMap<String, String>,
}

impl TabularRow {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            cells: HashMap::new(),
        }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<K, V>(line: usize, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut row = Self::new(line);
        for (k, v) in pairs {
            row.insert(k.as_ref(), v);
        }
        row
    }

    pub fn insert(&mut self, column: &str, value: impl Into<String>) {
        self.cells.insert(normalize_column(column), value.into());
    }

    /// Trimmed cell value; empty cells read as absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .get(&normalize_column(column))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// First present value among several column aliases.
    pub fn get_any(&self, columns: &[&str]) -> Option<&str> {
        columns.iter().find_map(|c| self.get(c))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(|v| v.trim().is_empty())
    }
}

/// Lowercase and drop separators: `Low Stock_Threshold` -> `lowstockthreshold`.
pub fn normalize_column(column: &str) -> String {
    column
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}
