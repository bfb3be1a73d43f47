//! Reports over the contributing-factor dataset.
//!
//! The dataset is one row per attributed factor, so every narrowing is
//! a row filter on the area or conditioning column followed by a count
//! of the remaining rows.

use crate::aggregate;
use crate::chart::ChartData;
use crate::error::Result;
use crate::source;
use crate::table::Table;

use super::{Params, Report};

const TOP: usize = 10;

pub static REPORTS: [Report; 6] = [
    Report {
        name: "areas",
        description: "contributing factors by area",
        run: areas,
    },
    Report {
        name: "operational-conditioning",
        description: "conditioning factors within the operational area",
        run: operational_conditioning,
    },
    Report {
        name: "operational-top-names",
        description: "most frequent factors conditioned on aircraft operation",
        run: operational_top_names,
    },
    Report {
        name: "human-conditioning",
        description: "conditioning factors within the human area",
        run: human_conditioning,
    },
    Report {
        name: "human-individual-names",
        description: "factors conditioned on the individual",
        run: human_individual_names,
    },
    Report {
        name: "human-organisational-names",
        description: "factors conditioned on the organisation",
        run: human_organisational_names,
    },
];

fn areas(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_FACTOR_AREA)?;
    Ok(ChartData::bar("contributing factors by area", counts))
}

fn operational_conditioning(table: &Table, _params: &Params) -> Result<ChartData> {
    let operational = table.filter_eq(source::COL_FACTOR_AREA, source::AREA_OPERATIONAL)?;
    let counts = aggregate::value_counts(&operational, source::COL_FACTOR_CONDITIONING)?;
    Ok(ChartData::bar("operational factor conditioning", counts))
}

fn operational_top_names(table: &Table, _params: &Params) -> Result<ChartData> {
    let conditioned = table.filter_eq(
        source::COL_FACTOR_CONDITIONING,
        source::CONDITIONING_AIRCRAFT_OPERATION,
    )?;
    let counts = aggregate::value_counts(&conditioned, source::COL_FACTOR_NAME)?;
    Ok(ChartData::bar(
        "most frequent aircraft operation factors",
        aggregate::top_n(counts, TOP),
    ))
}

fn human_conditioning(table: &Table, _params: &Params) -> Result<ChartData> {
    let human = table.filter_eq(source::COL_FACTOR_AREA, source::AREA_HUMAN)?;
    let counts = aggregate::value_counts(&human, source::COL_FACTOR_CONDITIONING)?;
    Ok(ChartData::bar("human factor conditioning", counts))
}

fn human_individual_names(table: &Table, _params: &Params) -> Result<ChartData> {
    let individual =
        table.filter_eq(source::COL_FACTOR_CONDITIONING, source::CONDITIONING_INDIVIDUAL)?;
    let counts = aggregate::value_counts(&individual, source::COL_FACTOR_NAME)?;
    Ok(ChartData::bar("individual factors", counts))
}

fn human_organisational_names(table: &Table, _params: &Params) -> Result<ChartData> {
    let organisational = table.filter_eq(
        source::COL_FACTOR_CONDITIONING,
        source::CONDITIONING_ORGANISATIONAL,
    )?;
    let counts = aggregate::value_counts(&organisational, source::COL_FACTOR_NAME)?;
    Ok(ChartData::bar("organisational factors", counts))
}
