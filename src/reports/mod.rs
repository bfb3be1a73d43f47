//! The report catalog.
//!
//! Each report is a named pure function from one cleaned table to one
//! chart payload. Reports are grouped by the dataset they read; the CLI
//! runs a whole group or a single report picked by name.

pub mod aircraft;
pub mod factor;
pub mod occurrence;
pub mod occurrence_type;

use chrono::NaiveDateTime;
use tracing::warn;

use crate::chart::ChartData;
use crate::error::{Error, Result};
use crate::table::Table;

/// Caller-supplied report parameters. `since` is the lower timestamp
/// bound of the accident map; every other report ignores it.
#[derive(Debug, Clone, Copy)]
pub struct Params {
    pub since: NaiveDateTime,
}

type ReportFn = fn(&Table, &Params) -> Result<ChartData>;

/// A named report over one dataset.
pub struct Report {
    pub name: &'static str,
    pub description: &'static str,
    run: ReportFn,
}

impl Report {
    pub fn produce(&self, table: &Table, params: &Params) -> Result<ChartData> {
        (self.run)(table, params)
    }
}

/// The report groups in dataset order, keyed by the group name the CLI
/// and `list-reports` use.
pub fn groups() -> [(&'static str, &'static [Report]); 4] {
    [
        ("occurrence", &occurrence::REPORTS[..]),
        ("types", &occurrence_type::REPORTS[..]),
        ("aircraft", &aircraft::REPORTS[..]),
        ("factors", &factor::REPORTS[..]),
    ]
}

/// Looks a report up by name within a group.
pub fn find<'a>(reports: &'a [Report], name: &str) -> Result<&'a Report> {
    reports
        .iter()
        .find(|r| r.name == name)
        .ok_or_else(|| Error::UnknownReport(name.to_string()))
}

/// Runs every report in a group, pairing each chart with its report
/// name. A report whose source column has no defined values is logged
/// and skipped; any other failure aborts the whole group.
pub fn run_group(
    reports: &[Report],
    table: &Table,
    params: &Params,
) -> Result<Vec<(&'static str, ChartData)>> {
    let mut charts = Vec::with_capacity(reports.len());
    for report in reports {
        match report.produce(table, params) {
            Ok(chart) => charts.push((report.name, chart)),
            Err(e) if e.is_recoverable() => {
                warn!(report = report.name, error = %e, "Report skipped");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(charts)
}
