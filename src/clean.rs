//! Cleaning transforms applied between loading and aggregation.
//!
//! Every transform is total: well-formed-but-unusual input becomes a
//! defined value (`Missing` where the reports expect absence), never a
//! panic. The one hard failure is a date cell that does not match the
//! published layout, which is treated as a source format change and
//! stops the run.

use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::source;
use crate::table::{Table, Value};

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const MIDNIGHT: &str = "00:00:00";

/// Decimal convention for locale-formatted numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalStyle {
    /// `.` groups thousands, `,` separates decimals (the authority's locale).
    CommaDecimal,
    /// `,` groups thousands, `.` separates decimals.
    PointDecimal,
}

/// Merges a `dd/mm/yyyy` date cell and an optional `hh:mm:ss` time cell
/// into a single timestamp. A missing, empty, or non-text time means
/// midnight.
///
/// # Errors
///
/// Returns [`Error::DateParse`] when the date cell is absent or does not
/// match the layout.
pub fn merge_timestamp(date: &Value, time: &Value) -> Result<Value> {
    let date = match date.as_text() {
        Some(s) if !s.trim().is_empty() => s.trim(),
        _ => {
            return Err(Error::DateParse {
                value: date.label().unwrap_or_default(),
            });
        }
    };

    let time = match time.as_text() {
        Some(s) if !s.trim().is_empty() => s.trim(),
        _ => MIDNIGHT,
    };

    let joined = format!("{date} {time}");
    let ts = NaiveDateTime::parse_from_str(&joined, TIMESTAMP_FORMAT)
        .map_err(|_| Error::DateParse { value: joined })?;
    Ok(Value::Timestamp(ts))
}

/// Parses a locale-formatted decimal cell into a float.
///
/// Cells that are already numeric pass through unchanged. Text parses
/// under the given [`DecimalStyle`]; anything unparsable or non-finite
/// (literal `NaN`/`inf` text) becomes `Missing`, never an error.
pub fn parse_locale_float(value: &Value, style: DecimalStyle) -> Value {
    match value {
        Value::Int(_) | Value::Float(_) => value.clone(),
        Value::Text(s) => {
            let normalized = match style {
                DecimalStyle::CommaDecimal => s.trim().replace('.', "").replace(',', "."),
                DecimalStyle::PointDecimal => s.trim().replace(',', ""),
            };
            match normalized.parse::<f64>() {
                Ok(v) if v.is_finite() => Value::Float(v),
                _ => Value::Missing,
            }
        }
        _ => Value::Missing,
    }
}

/// Returns the category prefix of a pipe-delimited label: the substring
/// before the first `|`, trimmed. Falls back to the trimmed original when
/// there is no pipe or the prefix trims to nothing, so the result is
/// non-empty whenever the input is.
pub fn extract_category_prefix(raw: &str) -> String {
    let prefix = raw.split('|').next().unwrap_or(raw).trim();
    if prefix.is_empty() {
        raw.trim().to_string()
    } else {
        prefix.to_string()
    }
}

/// Parses a cell the schema declares integral. Blank or unparsable text
/// becomes `Missing`.
pub fn parse_int(value: &Value) -> Value {
    match value {
        Value::Int(_) => value.clone(),
        Value::Text(s) => match s.trim().parse::<i64>() {
            Ok(v) => Value::Int(v),
            Err(_) => Value::Missing,
        },
        _ => Value::Missing,
    }
}

/// Trims a text cell, turning blank text into `Missing`. The loader keeps
/// empty CSV fields as empty strings; the reports want them as absent.
fn normalize_blank(value: &Value) -> Value {
    match value.as_text() {
        Some(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Missing
            } else {
                Value::Text(trimmed.to_string())
            }
        }
        None => value.clone(),
    }
}

fn normalize_columns(table: &mut Table, columns: &[&str]) -> Result<()> {
    for col in columns {
        table.map_column(col, |cell| Ok(normalize_blank(cell)))?;
    }
    Ok(())
}

fn int_columns(table: &mut Table, columns: &[&str]) -> Result<()> {
    for col in columns {
        table.map_column(col, |cell| Ok(parse_int(cell)))?;
    }
    Ok(())
}

/// Cleans the occurrence table: derives the `ocorrencia_data` timestamp
/// from the raw day and hour columns, parses the coordinate pair under the
/// comma-decimal convention, and types the aircraft-involved count.
pub fn clean_occurrences(mut table: Table) -> Result<Table> {
    let stamps = {
        let days = table.cells(source::COL_OCCURRENCE_DAY)?;
        let hours = table.cells(source::COL_OCCURRENCE_TIME)?;
        days.zip(hours)
            .map(|(day, hour)| merge_timestamp(day, hour))
            .collect::<Result<Vec<Value>>>()?
    };
    table.append_column(source::COL_OCCURRENCE_DATE, stamps);

    for col in [source::COL_LATITUDE, source::COL_LONGITUDE] {
        table.map_column(col, |cell| {
            Ok(parse_locale_float(cell, DecimalStyle::CommaDecimal))
        })?;
    }

    int_columns(&mut table, &[source::COL_TOTAL_AIRCRAFT])?;
    normalize_columns(
        &mut table,
        &[
            source::COL_CLASSIFICATION,
            source::COL_INVESTIGATION_STATUS,
            source::COL_CITY,
        ],
    )?;
    Ok(table)
}

/// Cleans the occurrence-type table: reduces the pipe-delimited category
/// to its prefix.
pub fn clean_occurrence_types(mut table: Table) -> Result<Table> {
    normalize_columns(
        &mut table,
        &[source::COL_TYPE, source::COL_TYPE_CATEGORY],
    )?;
    table.map_column(source::COL_TYPE_CATEGORY, |cell| {
        Ok(match cell.as_text() {
            Some(s) => Value::Text(extract_category_prefix(s)),
            None => Value::Missing,
        })
    })?;
    Ok(table)
}

/// Cleans the aircraft table: types the declared integer columns and
/// normalizes the categorical ones.
pub fn clean_aircraft(mut table: Table) -> Result<Table> {
    int_columns(
        &mut table,
        &[
            source::COL_SEATS,
            source::COL_FABRICATION_YEAR,
            source::COL_FATALITIES,
        ],
    )?;
    normalize_columns(
        &mut table,
        &[
            source::COL_VEHICLE_TYPE,
            source::COL_OPERATOR_CATEGORY,
            source::COL_MANUFACTURER,
            source::COL_MODEL,
            source::COL_ENGINE_COUNT,
            source::COL_ORIGIN,
            source::COL_DESTINATION,
            source::COL_OPERATION_PHASE,
            source::COL_OPERATION_TYPE,
            source::COL_DAMAGE_LEVEL,
        ],
    )?;
    Ok(table)
}

/// Cleans the contributing-factor table.
pub fn clean_factors(mut table: Table) -> Result<Table> {
    normalize_columns(
        &mut table,
        &[
            source::COL_FACTOR_AREA,
            source::COL_FACTOR_CONDITIONING,
            source::COL_FACTOR_NAME,
        ],
    )?;
    Ok(table)
}
