//! Tabular view of report sections.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Numeric value, always finite.
    Number(f64),
    /// Free text.
    Text(String),
    /// No value; empty in CSV and `null` in JSON.
    Missing,
}

impl Cell {
    /// Numeric cell, `Missing` for `None` or a non-finite value.
    pub fn number(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Self::Number(v),
            _ => Self::Missing,
        }
    }

    /// Text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Numeric content, if any.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether the cell is empty.
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
            Self::Missing => Ok(()),
        }
    }
}

/// A labeled row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row label.
    pub label: String,
    /// One cell per table column.
    pub cells: Vec<Cell>,
}

impl TableRow {
    /// Create a row.
    pub fn new(label: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            label: label.into(),
            cells,
        }
    }
}

/// One report section laid out as a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    /// Section label.
    pub label: String,
    /// Header of the row-label column.
    pub index_header: String,
    /// Value column headers.
    pub columns: Vec<String>,
    /// Rows in output order.
    pub rows: Vec<TableRow>,
}

impl ReportTable {
    /// Create an empty table.
    pub fn new(label: &str, index_header: &str, columns: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            index_header: index_header.to_string(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row.
    pub fn push(&mut self, label: impl Into<String>, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len(), self.columns.len());
        self.rows.push(TableRow::new(label, cells));
    }

    /// Look up a row by label.
    pub fn row(&self, label: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Look up a cell by row label and column header.
    pub fn cell(&self, row: &str, column: &str) -> Option<&Cell> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.row(row)?.cells.get(col)
    }

    /// Header record: the index header followed by the column headers.
    pub fn header_record(&self) -> Vec<&str> {
        std::iter::once(self.index_header.as_str())
            .chain(self.columns.iter().map(String::as_str))
            .collect()
    }
}
