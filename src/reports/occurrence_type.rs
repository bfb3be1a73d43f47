//! Reports over the occurrence-type dataset.

use crate::aggregate;
use crate::chart::ChartData;
use crate::error::Result;
use crate::source;
use crate::table::Table;

use super::{Params, Report};

const TOP: usize = 10;

pub static REPORTS: [Report; 2] = [
    Report {
        name: "top-types",
        description: "most frequent occurrence types",
        run: top_types,
    },
    Report {
        name: "top-categories",
        description: "most frequent occurrence type categories",
        run: top_categories,
    },
];

fn top_types(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_TYPE)?;
    Ok(ChartData::bar(
        "most frequent occurrence types",
        aggregate::top_n(counts, TOP),
    ))
}

fn top_categories(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_TYPE_CATEGORY)?;
    Ok(ChartData::bar(
        "most frequent occurrence type categories",
        aggregate::top_n(counts, TOP),
    ))
}
