//! Reports over the aircraft dataset.
//!
//! The fatality reports narrow by damage level before counting: damage
//! filters run on the table so the surviving rows keep their original
//! identity, then the fatality column is aggregated. A blank damage
//! level is not a member of any exclusion set, so those aircraft stay in
//! the damaged and substantial series.

use crate::aggregate;
use crate::chart::ChartData;
use crate::error::Result;
use crate::source;
use crate::table::Table;

use super::{Params, Report};

const TOP: usize = 10;
const TOP_AIRFIELDS: usize = 12;

// fabrication years outside this exclusive range are data entry noise
const YEAR_MIN: f64 = 0.0;
const YEAR_MAX: f64 = 2100.0;

pub static REPORTS: [Report; 22] = [
    Report {
        name: "vehicle-types",
        description: "aircraft by vehicle type",
        run: vehicle_types,
    },
    Report {
        name: "operator-categories",
        description: "aircraft by operator category",
        run: operator_categories,
    },
    Report {
        name: "top-manufacturers",
        description: "most frequent manufacturers",
        run: top_manufacturers,
    },
    Report {
        name: "top-models",
        description: "most frequent manufacturer + model pairs",
        run: top_models,
    },
    Report {
        name: "engine-counts",
        description: "aircraft by engine count",
        run: engine_counts,
    },
    Report {
        name: "seats",
        description: "seat count summary statistics",
        run: seats,
    },
    Report {
        name: "seats-box",
        description: "seat count box plot",
        run: seats_box,
    },
    Report {
        name: "fabrication-years",
        description: "fabrication year summary statistics",
        run: fabrication_years,
    },
    Report {
        name: "fabrication-years-box",
        description: "fabrication year box plot",
        run: fabrication_years_box,
    },
    Report {
        name: "top-origin-airfields",
        description: "most frequent flight origins",
        run: top_origin_airfields,
    },
    Report {
        name: "top-destination-airfields",
        description: "most frequent flight destinations",
        run: top_destination_airfields,
    },
    Report {
        name: "operation-phases",
        description: "most frequent operation phases",
        run: operation_phases,
    },
    Report {
        name: "operation-types",
        description: "aircraft by operation type",
        run: operation_types,
    },
    Report {
        name: "damage-levels",
        description: "aircraft by damage level, unknown values bucketed",
        run: damage_levels,
    },
    Report {
        name: "fatalities",
        description: "aircraft by total fatalities",
        run: fatalities,
    },
    Report {
        name: "fatalities-damaged",
        description: "fatalities among aircraft with any damage",
        run: fatalities_damaged,
    },
    Report {
        name: "fatalities-substantial",
        description: "fatalities among substantially damaged or destroyed aircraft",
        run: fatalities_substantial,
    },
    Report {
        name: "fatalities-substantial-summary",
        description: "fatality summary statistics, substantially damaged or destroyed aircraft",
        run: fatalities_substantial_summary,
    },
    Report {
        name: "fatalities-substantial-box",
        description: "fatality box plot, substantially damaged or destroyed aircraft",
        run: fatalities_substantial_box,
    },
    Report {
        name: "fatalities-destroyed",
        description: "fatalities among destroyed aircraft",
        run: fatalities_destroyed,
    },
    Report {
        name: "fatalities-destroyed-summary",
        description: "fatality summary statistics, destroyed aircraft",
        run: fatalities_destroyed_summary,
    },
    Report {
        name: "fatalities-destroyed-box",
        description: "fatality box plot, destroyed aircraft",
        run: fatalities_destroyed_box,
    },
];

fn vehicle_types(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_VEHICLE_TYPE)?;
    Ok(ChartData::bar("aircraft by vehicle type", counts))
}

fn operator_categories(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_OPERATOR_CATEGORY)?;
    Ok(ChartData::bar("aircraft by operator category", counts))
}

fn top_manufacturers(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_MANUFACTURER)?;
    Ok(ChartData::bar(
        "most frequent manufacturers",
        aggregate::top_n(counts, TOP),
    ))
}

fn top_models(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts =
        aggregate::value_counts_concat(table, &[source::COL_MANUFACTURER, source::COL_MODEL])?;
    Ok(ChartData::bar(
        "most frequent models",
        aggregate::top_n(counts, TOP),
    ))
}

fn engine_counts(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_ENGINE_COUNT)?;
    Ok(ChartData::bar("aircraft by engine count", counts))
}

fn seats(table: &Table, _params: &Params) -> Result<ChartData> {
    let stats = aggregate::describe(table, source::COL_SEATS)?;
    Ok(ChartData::summary("seat counts", stats))
}

fn seats_box(table: &Table, _params: &Params) -> Result<ChartData> {
    let stats = aggregate::box_stats(table, source::COL_SEATS)?;
    Ok(ChartData::box_plot("seat counts", stats))
}

fn fabrication_years(table: &Table, _params: &Params) -> Result<ChartData> {
    let plausible = table.filter_numeric_range(source::COL_FABRICATION_YEAR, YEAR_MIN, YEAR_MAX)?;
    let stats = aggregate::describe(&plausible, source::COL_FABRICATION_YEAR)?;
    Ok(ChartData::summary("fabrication years", stats))
}

fn fabrication_years_box(table: &Table, _params: &Params) -> Result<ChartData> {
    let plausible = table.filter_numeric_range(source::COL_FABRICATION_YEAR, YEAR_MIN, YEAR_MAX)?;
    let stats = aggregate::box_stats(&plausible, source::COL_FABRICATION_YEAR)?;
    Ok(ChartData::box_plot("fabrication years", stats))
}

fn top_origin_airfields(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_ORIGIN)?;
    Ok(ChartData::bar(
        "most frequent flight origins",
        aggregate::top_n(counts, TOP_AIRFIELDS),
    ))
}

fn top_destination_airfields(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_DESTINATION)?;
    Ok(ChartData::bar(
        "most frequent flight destinations",
        aggregate::top_n(counts, TOP_AIRFIELDS),
    ))
}

fn operation_phases(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_OPERATION_PHASE)?;
    Ok(ChartData::bar(
        "most frequent operation phases",
        aggregate::top_n(counts, TOP),
    ))
}

fn operation_types(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_OPERATION_TYPE)?;
    Ok(ChartData::bar("aircraft by operation type", counts))
}

fn damage_levels(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts_categorical(
        table,
        source::COL_DAMAGE_LEVEL,
        &source::DAMAGE_LEVELS,
    )?;
    Ok(ChartData::bar("aircraft by damage level", counts))
}

fn fatalities(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(table, source::COL_FATALITIES)?;
    Ok(ChartData::bar("fatalities per aircraft", counts))
}

fn fatalities_damaged(table: &Table, _params: &Params) -> Result<ChartData> {
    let damaged = table.filter_not_isin(source::COL_DAMAGE_LEVEL, &[source::DAMAGE_NONE])?;
    let counts = aggregate::value_counts(&damaged, source::COL_FATALITIES)?;
    Ok(ChartData::bar("fatalities per damaged aircraft", counts))
}

fn substantial(table: &Table) -> Result<Table> {
    table.filter_not_isin(
        source::COL_DAMAGE_LEVEL,
        &[source::DAMAGE_NONE, source::DAMAGE_LIGHT],
    )
}

fn fatalities_substantial(table: &Table, _params: &Params) -> Result<ChartData> {
    let counts = aggregate::value_counts(&substantial(table)?, source::COL_FATALITIES)?;
    Ok(ChartData::bar(
        "fatalities per substantially damaged aircraft",
        counts,
    ))
}

fn fatalities_substantial_summary(table: &Table, _params: &Params) -> Result<ChartData> {
    let stats = aggregate::describe(&substantial(table)?, source::COL_FATALITIES)?;
    Ok(ChartData::summary(
        "fatalities per substantially damaged aircraft",
        stats,
    ))
}

fn fatalities_substantial_box(table: &Table, _params: &Params) -> Result<ChartData> {
    let stats = aggregate::box_stats(&substantial(table)?, source::COL_FATALITIES)?;
    Ok(ChartData::box_plot(
        "fatalities per substantially damaged aircraft",
        stats,
    ))
}

fn fatalities_destroyed(table: &Table, _params: &Params) -> Result<ChartData> {
    let destroyed = table.filter_eq(source::COL_DAMAGE_LEVEL, source::DAMAGE_DESTROYED)?;
    let counts = aggregate::value_counts(&destroyed, source::COL_FATALITIES)?;
    Ok(ChartData::bar("fatalities per destroyed aircraft", counts))
}

fn fatalities_destroyed_summary(table: &Table, _params: &Params) -> Result<ChartData> {
    let destroyed = table.filter_eq(source::COL_DAMAGE_LEVEL, source::DAMAGE_DESTROYED)?;
    let stats = aggregate::describe(&destroyed, source::COL_FATALITIES)?;
    Ok(ChartData::summary("fatalities per destroyed aircraft", stats))
}

fn fatalities_destroyed_box(table: &Table, _params: &Params) -> Result<ChartData> {
    let destroyed = table.filter_eq(source::COL_DAMAGE_LEVEL, source::DAMAGE_DESTROYED)?;
    let stats = aggregate::box_stats(&destroyed, source::COL_FATALITIES)?;
    Ok(ChartData::box_plot("fatalities per destroyed aircraft", stats))
}

#[cfg(test)]
mod tests {
    use super::super::tests::params;
    use super::*;
    use crate::table::Value;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn fixture() -> Table {
        let mut t = Table::new(
            "aircraft",
            vec![
                source::COL_MANUFACTURER.to_string(),
                source::COL_MODEL.to_string(),
                source::COL_SEATS.to_string(),
                source::COL_FABRICATION_YEAR.to_string(),
                source::COL_DAMAGE_LEVEL.to_string(),
                source::COL_FATALITIES.to_string(),
            ],
        );
        let rows = [
            ("CESSNA", "172", 4, 1978, "SUBSTANCIAL", 0),
            ("CESSNA", "172", 4, 1982, "DESTRUÍDA", 2),
            ("PIPER", "PA-34", 6, 0, "LEVE", 0),
            ("EMBRAER", "EMB-110", 19, 1990, "NENHUM", 0),
            ("CESSNA", "210", 6, 2201, "DESTRUÍDA", 4),
        ];
        for (maker, model, seats, year, damage, deaths) in rows {
            t.push_row(vec![
                text(maker),
                text(model),
                Value::Int(seats),
                Value::Int(year),
                text(damage),
                Value::Int(deaths),
            ]);
        }
        t
    }

    #[test]
    fn test_top_models_joins_make_and_model() {
        let chart = top_models(&fixture(), &params()).unwrap();
        let ChartData::Bar { entries, .. } = chart else {
            panic!("expected bar");
        };
        assert_eq!(entries[0].label, "CESSNA 172");
        assert_eq!(entries[0].value, 2);
    }

    #[test]
    fn test_fabrication_years_drops_implausible_values() {
        let chart = fabrication_years(&fixture(), &params()).unwrap();
        let ChartData::Summary { stats, .. } = chart else {
            panic!("expected summary");
        };
        // year 0 and year 2201 are outside the plausible range
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 1978.0);
        assert_eq!(stats.max, 1990.0);
    }

    #[test]
    fn test_damage_levels_reports_declared_order_with_zeros() {
        let chart = damage_levels(&fixture(), &params()).unwrap();
        let ChartData::Bar { entries, .. } = chart else {
            panic!("expected bar");
        };
        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["NENHUM", "LEVE", "SUBSTANCIAL", "DESTRUÍDA"]);
        let total: u64 = entries.iter().map(|e| e.value).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_fatalities_substantial_excludes_none_and_light() {
        let chart = fatalities_substantial(&fixture(), &params()).unwrap();
        let ChartData::Bar { entries, .. } = chart else {
            panic!("expected bar");
        };
        // three aircraft survive the damage filter: 0, 2 and 4 deaths
        let total: u64 = entries.iter().map(|e| e.value).sum();
        assert_eq!(total, 3);
        assert!(entries.iter().any(|e| e.label == "4"));
    }

    #[test]
    fn test_fatalities_substantial_counts_blank_damage_aircraft() {
        let mut t = Table::new(
            "aircraft",
            vec![
                source::COL_DAMAGE_LEVEL.to_string(),
                source::COL_FATALITIES.to_string(),
            ],
        );
        t.push_row(vec![text("SUBSTANCIAL"), Value::Int(1)]);
        t.push_row(vec![Value::Missing, Value::Int(5)]);
        t.push_row(vec![text("NENHUM"), Value::Int(0)]);

        let chart = fatalities_substantial(&t, &params()).unwrap();
        let ChartData::Bar { entries, .. } = chart else {
            panic!("expected bar");
        };
        // the blank-damage aircraft is neither NENHUM nor LEVE: its five
        // deaths stay in the series
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.label == "5" && e.value == 1));
    }

    #[test]
    fn test_fatalities_substantial_summary() {
        let chart = fatalities_substantial_summary(&fixture(), &params()).unwrap();
        let ChartData::Summary { stats, .. } = chart else {
            panic!("expected summary");
        };
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn test_fatalities_destroyed_summary() {
        let chart = fatalities_destroyed_summary(&fixture(), &params()).unwrap();
        let ChartData::Summary { stats, .. } = chart else {
            panic!("expected summary");
        };
        // two destroyed aircraft with 2 and 4 deaths
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.std, 1.0);
    }

    #[test]
    fn test_fatalities_destroyed_box_uses_destroyed_rows_only() {
        let chart = fatalities_destroyed_box(&fixture(), &params()).unwrap();
        let ChartData::Box { stats, .. } = chart else {
            panic!("expected box");
        };
        // two destroyed aircraft with 2 and 4 deaths
        assert_eq!(stats.median, 3.0);
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_seats_summary() {
        let chart = seats(&fixture(), &params()).unwrap();
        let ChartData::Summary { stats, .. } = chart else {
            panic!("expected summary");
        };
        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, 4.0);
        assert_eq!(stats.max, 19.0);
    }
}
