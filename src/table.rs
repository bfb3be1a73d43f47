//! Column-typed in-memory tables.
//!
//! A [`Table`] is an ordered set of named columns over rows of [`Value`]
//! cells. Cells come out of the loader as `Text` only; the cleaning step
//! converts declared columns with explicit total conversions, so `Missing`
//! is a first-class cell value rather than a library sentinel.
//!
//! Rows keep the zero-based index they were loaded with as an immutable
//! identity. Every filter returns a sub-table that preserves identity and
//! relative order, which is what makes the downstream grouping operations
//! reproducible byte-for-byte.

use chrono::NaiveDateTime;

use crate::error::{Error, Result};

/// A single cell: tagged union over the column types the pipeline uses.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of the cell. `Int` widens to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical grouping label for a defined cell, `None` for `Missing`.
    ///
    /// Labels are what `value_counts` keys on and what chart payloads
    /// carry, so the rendering is fixed here: integers without a fraction
    /// part, timestamps as `YYYY-MM-DD HH:MM:SS`.
    pub fn label(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Int(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Timestamp(ts) => Some(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            Value::Missing => None,
        }
    }
}

/// One table row: the original load index plus one cell per column.
#[derive(Debug, Clone)]
pub struct Row {
    id: usize,
    cells: Vec<Value>,
}

impl Row {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn cell(&self, index: usize) -> &Value {
        &self.cells[index]
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Table {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, assigning the next load index as its identity.
    pub fn push_row(&mut self, cells: Vec<Value>) {
        debug_assert_eq!(cells.len(), self.columns.len());
        let id = self.rows.len();
        self.rows.push(Row { id, cells });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Cells of one column in row order.
    pub fn cells<'a>(&'a self, name: &str) -> Result<impl Iterator<Item = &'a Value>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row.cells[idx]))
    }

    /// Replaces every cell of a column through a fallible transform.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&Value) -> Result<Value>,
    {
        let idx = self.column_index(name)?;
        for row in &mut self.rows {
            row.cells[idx] = f(&row.cells[idx])?;
        }
        Ok(())
    }

    /// Appends a derived column. `values` must hold one cell per row, in
    /// row order.
    pub fn append_column(&mut self, name: impl Into<String>, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.push(name.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.cells.push(value);
        }
    }

    fn filtered<F>(&self, idx: usize, pred: F) -> Table
    where
        F: Fn(&Value) -> bool,
    {
        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| pred(&row.cells[idx]))
                .cloned()
                .collect(),
        }
    }

    /// Rows whose cell label equals `value`. `Missing` never matches.
    pub fn filter_eq(&self, name: &str, value: &str) -> Result<Table> {
        let idx = self.column_index(name)?;
        Ok(self.filtered(idx, |cell| cell.label().as_deref() == Some(value)))
    }

    /// Rows whose cell label is in `values`.
    pub fn filter_isin(&self, name: &str, values: &[&str]) -> Result<Table> {
        let idx = self.column_index(name)?;
        Ok(self.filtered(idx, |cell| {
            cell.label().is_some_and(|l| values.contains(&l.as_str()))
        }))
    }

    /// Rows whose cell label is not a member of `values`, the complement
    /// of [`Table::filter_isin`]. A `Missing` cell has no label, so it is
    /// never a member and the row survives.
    pub fn filter_not_isin(&self, name: &str, values: &[&str]) -> Result<Table> {
        let idx = self.column_index(name)?;
        Ok(self.filtered(idx, |cell| {
            !cell.label().is_some_and(|l| values.contains(&l.as_str()))
        }))
    }

    /// Rows whose timestamp cell is at or after `bound`.
    pub fn filter_since(&self, name: &str, bound: NaiveDateTime) -> Result<Table> {
        let idx = self.column_index(name)?;
        Ok(self.filtered(idx, |cell| {
            cell.as_timestamp().is_some_and(|ts| ts >= bound)
        }))
    }

    /// Rows whose numeric cell lies strictly between `lo` and `hi`.
    pub fn filter_numeric_range(&self, name: &str, lo: f64, hi: f64) -> Result<Table> {
        let idx = self.column_index(name)?;
        Ok(self.filtered(idx, |cell| {
            cell.as_f64().is_some_and(|v| v > lo && v < hi)
        }))
    }

    /// Rows whose cell in `name` is defined (not `Missing`).
    pub fn filter_defined(&self, name: &str) -> Result<Table> {
        let idx = self.column_index(name)?;
        Ok(self.filtered(idx, |cell| !cell.is_missing()))
    }
}
