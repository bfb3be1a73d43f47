//! Grouped counts, calendar-month buckets, and descriptive statistics.
//!
//! Grouping here is stable by construction: group keys are collected in
//! first-appearance row order and sorts are stable, so equal counts keep
//! their source order and the same input always produces the same output,
//! byte for byte.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::table::{Table, Value};

/// One category of a frequency distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountEntry {
    pub label: String,
    pub count: u64,
}

/// A closed categorical vocabulary with an explicit bucket for values
/// outside it. Members are reported in declared order, zero counts
/// included; out-of-set values fold into the bucket instead of being
/// dropped, so totals stay conserved.
#[derive(Debug, Clone, Copy)]
pub struct CategorySet {
    pub expected: &'static [&'static str],
    pub other_label: &'static str,
}

/// One calendar-month bucket of a time series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCount {
    pub month: NaiveDate,
    pub count: u64,
}

/// One `(month, category)` cell of a two-key time series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCategoryCount {
    pub month: NaiveDate,
    pub category: String,
    pub count: u64,
}

/// Descriptive statistics over the defined numeric cells of a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: u64,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// Box-plot shape: quartiles, 1.5·IQR whiskers, and the values beyond
/// them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// Frequency distribution of a column, descending by count, ties broken
/// by first appearance in row order. `Missing` cells are excluded, so the
/// counts sum to the number of defined cells.
pub fn value_counts(table: &Table, column: &str) -> Result<Vec<CountEntry>> {
    let labels = table.cells(column)?.filter_map(Value::label);
    Ok(count_labels(labels))
}

/// Frequency distribution keyed on the space-joined labels of several
/// columns (e.g. manufacturer + model). Rows with any part missing are
/// excluded.
pub fn value_counts_concat(table: &Table, columns: &[&str]) -> Result<Vec<CountEntry>> {
    let indexes = columns
        .iter()
        .map(|c| table.column_index(c))
        .collect::<Result<Vec<usize>>>()?;

    let labels = table.rows().iter().filter_map(|row| {
        let mut parts = Vec::with_capacity(indexes.len());
        for &idx in &indexes {
            parts.push(row.cell(idx).label()?);
        }
        Some(parts.join(" "))
    });
    Ok(count_labels(labels))
}

/// Frequency distribution over a closed vocabulary: declared members in
/// declared order (zeros included), then the unknown bucket when any
/// out-of-set value was seen.
pub fn value_counts_categorical(
    table: &Table,
    column: &str,
    set: &CategorySet,
) -> Result<Vec<CountEntry>> {
    let mut member_counts = vec![0u64; set.expected.len()];
    let mut other = 0u64;

    for cell in table.cells(column)? {
        let Some(label) = cell.label() else { continue };
        match set.expected.iter().position(|m| *m == label) {
            Some(i) => member_counts[i] += 1,
            None => other += 1,
        }
    }

    let mut entries: Vec<CountEntry> = set
        .expected
        .iter()
        .zip(member_counts)
        .map(|(label, count)| CountEntry {
            label: (*label).to_string(),
            count,
        })
        .collect();
    if other > 0 {
        entries.push(CountEntry {
            label: set.other_label.to_string(),
            count: other,
        });
    }
    Ok(entries)
}

fn count_labels(labels: impl Iterator<Item = String>) -> Vec<CountEntry> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u64> = HashMap::new();

    for label in labels {
        if !counts.contains_key(&label) {
            order.push(label.clone());
        }
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut entries: Vec<CountEntry> = order
        .into_iter()
        .map(|label| {
            let count = counts.get(&label).copied().unwrap_or(0);
            CountEntry { label, count }
        })
        .collect();
    // stable: equal counts keep first-appearance order
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

/// Keeps the first `n` entries of an ordered distribution; all of them
/// when `n` exceeds the number of distinct categories.
pub fn top_n(mut counts: Vec<CountEntry>, n: usize) -> Vec<CountEntry> {
    counts.truncate(n);
    counts
}

/// Per-calendar-month counts over a timestamp column, one entry for every
/// month between the minimum and maximum observed timestamp inclusive.
/// Months with no rows appear with an explicit zero count. No defined
/// timestamps means an empty series.
pub fn monthly_counts(table: &Table, column: &str) -> Result<Vec<MonthCount>> {
    let stamps: Vec<NaiveDateTime> = table
        .cells(column)?
        .filter_map(Value::as_timestamp)
        .collect();

    let Some(range) = month_range(&stamps) else {
        return Ok(Vec::new());
    };

    let mut counts: HashMap<NaiveDate, u64> = HashMap::new();
    for ts in &stamps {
        *counts.entry(month_start(*ts)).or_insert(0) += 1;
    }

    Ok(iter_months(range)
        .map(|month| MonthCount {
            month,
            count: counts.get(&month).copied().unwrap_or(0),
        })
        .collect())
}

/// Two-key variant of [`monthly_counts`]: `(month, category, count)` over
/// the full month range of the timestamp column crossed with every
/// category observed in the secondary column (first-appearance order),
/// zero cells explicit, month-major.
pub fn monthly_counts_by(
    table: &Table,
    time_column: &str,
    category_column: &str,
) -> Result<Vec<MonthCategoryCount>> {
    let stamps: Vec<NaiveDateTime> = table
        .cells(time_column)?
        .filter_map(Value::as_timestamp)
        .collect();

    let Some(range) = month_range(&stamps) else {
        return Ok(Vec::new());
    };

    let mut categories: Vec<String> = Vec::new();
    for cell in table.cells(category_column)? {
        if let Some(label) = cell.label() {
            if !categories.contains(&label) {
                categories.push(label);
            }
        }
    }

    let mut counts: HashMap<(NaiveDate, String), u64> = HashMap::new();
    let pairs = table
        .cells(time_column)?
        .zip(table.cells(category_column)?);
    for (time_cell, category_cell) in pairs {
        let (Some(ts), Some(label)) = (time_cell.as_timestamp(), category_cell.label()) else {
            continue;
        };
        *counts.entry((month_start(ts), label)).or_insert(0) += 1;
    }

    let mut entries = Vec::new();
    for month in iter_months(range) {
        for category in &categories {
            let count = counts
                .get(&(month, category.clone()))
                .copied()
                .unwrap_or(0);
            entries.push(MonthCategoryCount {
                month,
                category: category.clone(),
                count,
            });
        }
    }
    Ok(entries)
}

/// Count, mean, population standard deviation, min, quartiles (linear
/// interpolation between order statistics), and max over the defined
/// numeric cells of a column.
///
/// # Errors
///
/// Returns [`Error::EmptyColumn`] when the column has no defined values.
pub fn describe(table: &Table, column: &str) -> Result<Summary> {
    let values = sorted_numeric(table, column)?;
    let mean = mean(&values);
    Ok(Summary {
        count: values.len() as u64,
        mean,
        std: stddev(&values, mean),
        min: values[0],
        p25: percentile(&values, 0.25),
        p50: percentile(&values, 0.50),
        p75: percentile(&values, 0.75),
        max: values[values.len() - 1],
    })
}

/// Box-plot statistics: quartiles, whiskers at the outermost values
/// within 1.5·IQR of the quartiles, and the outliers beyond them
/// (ascending).
pub fn box_stats(table: &Table, column: &str) -> Result<BoxStats> {
    let values = sorted_numeric(table, column)?;
    let q1 = percentile(&values, 0.25);
    let median = percentile(&values, 0.50);
    let q3 = percentile(&values, 0.75);
    let iqr = q3 - q1;
    let fence_low = q1 - 1.5 * iqr;
    let fence_high = q3 + 1.5 * iqr;

    let whisker_low = values
        .iter()
        .copied()
        .find(|v| *v >= fence_low)
        .unwrap_or(values[0]);
    let whisker_high = values
        .iter()
        .rev()
        .copied()
        .find(|v| *v <= fence_high)
        .unwrap_or(values[values.len() - 1]);
    let outliers = values
        .iter()
        .copied()
        .filter(|v| *v < fence_low || *v > fence_high)
        .collect();

    Ok(BoxStats {
        q1,
        median,
        q3,
        whisker_low,
        whisker_high,
        outliers,
    })
}

fn sorted_numeric(table: &Table, column: &str) -> Result<Vec<f64>> {
    let mut values: Vec<f64> = table.cells(column)?.filter_map(Value::as_f64).collect();
    if values.is_empty() {
        return Err(Error::EmptyColumn(column.to_string()));
    }
    values.sort_by(f64::total_cmp);
    Ok(values)
}

/// Arithmetic mean. Returns 0.0 for empty input.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation given a pre-computed mean. Returns 0.0
/// for empty input.
fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Percentile by linear interpolation between order statistics. `sorted`
/// must be non-empty and ascending.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    }
}

fn month_start(ts: NaiveDateTime) -> NaiveDate {
    let d = ts.date();
    d.with_day(1).unwrap_or(d)
}

fn next_month(month: NaiveDate) -> NaiveDate {
    let (y, m) = (month.year(), month.month());
    let start = if m == 12 {
        NaiveDate::from_ymd_opt(y + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(y, m + 1, 1)
    };
    start.unwrap_or(month)
}

fn month_range(stamps: &[NaiveDateTime]) -> Option<(NaiveDate, NaiveDate)> {
    let first = stamps.iter().min()?;
    let last = stamps.iter().max()?;
    Some((month_start(*first), month_start(*last)))
}

fn iter_months((first, last): (NaiveDate, NaiveDate)) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(first), move |m| {
        if *m < last { Some(next_month(*m)) } else { None }
    })
}
