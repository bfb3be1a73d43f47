//! Reports over the occurrence dataset.

use crate::aggregate;
use crate::chart::{ChartData, MapPoint};
use crate::error::Result;
use crate::source;
use crate::table::Table;

use super::{Params, Report};

pub static REPORTS: [Report; 6] = [
    Report {
        name: "monthly",
        description: "occurrences per calendar month",
        run: monthly,
    },
    Report {
        name: "classification",
        description: "occurrences by classification",
        run: classification,
    },
    Report {
        name: "monthly-by-classification",
        description: "occurrences per month, one series per classification",
        run: monthly_by_classification,
    },
    Report {
        name: "investigation-status",
        description: "share of occurrences by investigation status",
        run: investigation_status,
    },
    Report {
        name: "aircraft-involved",
        description: "occurrences by number of aircraft involved",
        run: aircraft_involved,
    },
    Report {
        name: "accident-map",
        description: "located accidents since the lower bound, labelled by city",
        run: accident_map,
    },
];

fn monthly(table: &Table, _params: &Params) -> Result<ChartData> {
    let months = aggregate::monthly_counts(table, source::COL_OCCURRENCE_DATE)?;
    Ok(ChartData::line("occurrences per month", months))
}

fn classification(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_CLASSIFICATION)?;
    Ok(ChartData::bar("occurrences by classification", counts))
}

fn monthly_by_classification(table: &Table, _params: &Params) -> Result<ChartData> {
    let cells = aggregate::monthly_counts_by(
        table,
        source::COL_OCCURRENCE_DATE,
        source::COL_CLASSIFICATION,
    )?;
    Ok(ChartData::multi_line(
        "occurrences per month by classification",
        cells,
    ))
}

fn investigation_status(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_INVESTIGATION_STATUS)?;
    Ok(ChartData::pie("investigation status", counts))
}

fn aircraft_involved(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_TOTAL_AIRCRAFT)?;
    Ok(ChartData::bar("aircraft involved per occurrence", counts))
}

/// Accidents at or after the bound with both coordinates defined. Rows
/// missing either coordinate are simply not on the map; that is the only
/// effect of an absent coordinate.
fn accident_map(table: &Table, params: &Params) -> Result<ChartData> {
    let located = table
        .filter_eq(source::COL_CLASSIFICATION, source::CLASS_ACCIDENT)?
        .filter_since(source::COL_OCCURRENCE_DATE, params.since)?
        .filter_defined(source::COL_LATITUDE)?
        .filter_defined(source::COL_LONGITUDE)?;

    let lat = located.column_index(source::COL_LATITUDE)?;
    let lon = located.column_index(source::COL_LONGITUDE)?;
    let city = located.column_index(source::COL_CITY)?;

    let points = located
        .rows()
        .iter()
        .filter_map(|row| {
            Some(MapPoint {
                lat: row.cell(lat).as_f64()?,
                lon: row.cell(lon).as_f64()?,
                label: row.cell(city).label(),
            })
        })
        .collect();

    Ok(ChartData::map("accident locations", points))
}
