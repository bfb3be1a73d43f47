//! Error types for the cleaning and aggregation pipeline.
//!
//! Terminal variants (`SourceUnavailable`, `MalformedSource`, `DateParse`,
//! `ColumnNotFound`) abort the whole run. `EmptyColumn` is recoverable at
//! the report that hit it; the remaining reports still run.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The transport failed or returned a non-success status.
    #[error("source '{name}' unavailable: {reason}")]
    SourceUnavailable { name: String, reason: String },

    /// The resource was retrieved but is not a consistent delimited table.
    #[error("source '{name}' malformed: {reason}")]
    MalformedSource { name: String, reason: String },

    /// A date cell did not match the dd/mm/yyyy [hh:mm:ss] layout. A single
    /// bad date signals an upstream format change, so this is not skipped
    /// per row.
    #[error("cannot parse date '{value}' as dd/mm/yyyy [hh:mm:ss]")]
    DateParse { value: String },

    /// A column the pipeline relies on is missing from the loaded table.
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    /// A statistic was requested over a column with no defined values.
    #[error("column '{0}' has no defined values")]
    EmptyColumn(String),

    /// A report name outside the catalog was requested.
    #[error("unknown report '{0}'")]
    UnknownReport(String),
}

impl Error {
    /// Returns `true` when the run may continue after skipping the single
    /// aggregate that produced this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::EmptyColumn(_))
    }
}
