//! Tabular data model.
//!
//! A [`Table`] owns an ordered column list and a set of [`Row`]s whose cells
//! are aligned with those columns. Every row remembers its original position
//! in the source file, which survives row drops.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single scalar cell value.
///
/// Serializes as the bare JSON value, so `Null` becomes `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing or absent value.
    Null,
    /// Whole number.
    Integer(i64),
    /// Finite floating-point number.
    Float(f64),
    /// Free text, kept verbatim.
    Text(String),
}

impl CellValue {
    /// Returns true if the cell holds no value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text content if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the cell as a string, or `None` for nulls.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Integer(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }

    /// Convert into a JSON value. Non-finite floats map to `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One input record.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 0-based position of the record in the source file.
    pub position: usize,
    /// Cells aligned with the owning table's columns.
    pub cells: Vec<CellValue>,
}

impl Row {
    /// Create a row at the given source position.
    pub fn new(position: usize, cells: Vec<CellValue>) -> Self {
        Self { position, cells }
    }
}

/// An ordered set of columns and the rows that populate them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create a table. Rows shorter than the column list are padded with nulls,
    /// longer rows are truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.cells.resize(width, CellValue::Null);
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.columns, self.rows)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Look up a cell by row and column name.
    pub fn cell<'a>(&self, row: &'a Row, column: &str) -> Option<&'a CellValue> {
        self.column_index(column).and_then(|idx| row.cells.get(idx))
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain_rows<F>(&mut self, keep: F)
    where
        F: FnMut(&Row) -> bool,
    {
        self.rows.retain(keep);
    }

    /// Remove every column whose name matches `drop`, returning the removed names.
    pub fn drop_columns<F>(&mut self, mut drop: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let keep: Vec<bool> = self.columns.iter().map(|c| !drop(c)).collect();
        if keep.iter().all(|k| *k) {
            return Vec::new();
        }

        let mut removed = Vec::new();
        let mut kept_columns = Vec::with_capacity(self.columns.len());
        for (column, keep_it) in self.columns.drain(..).zip(&keep) {
            if *keep_it {
                kept_columns.push(column);
            } else {
                removed.push(column);
            }
        }
        self.columns = kept_columns;

        for row in &mut self.rows {
            let cells = std::mem::take(&mut row.cells);
            row.cells = cells
                .into_iter()
                .zip(&keep)
                .filter_map(|(cell, keep_it)| keep_it.then_some(cell))
                .collect();
        }

        removed
    }
}
