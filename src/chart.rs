//! Chart-shaped payloads for rendering layers.
//!
//! This module only reshapes aggregation results. Anything that counts,
//! sorts or buckets belongs in [`crate::aggregate`]; a renderer consuming
//! these payloads should never have to compute.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::{BoxStats, CountEntry, MonthCategoryCount, MonthCount, Summary};

/// One labelled value of a bar or pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelValue {
    pub label: String,
    pub value: u64,
}

/// One point of a time series. `series` distinguishes lines when several
/// share an axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: NaiveDate,
    pub y: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
}

/// One plotted location with an optional popup label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A renderable chart. Serialized with a `kind` tag so a consumer can
/// dispatch on shape without guessing from field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Bar {
        title: String,
        entries: Vec<LabelValue>,
    },
    Pie {
        title: String,
        entries: Vec<LabelValue>,
    },
    Line {
        title: String,
        points: Vec<SeriesPoint>,
    },
    Box {
        title: String,
        stats: BoxStats,
    },
    Summary {
        title: String,
        stats: Summary,
    },
    Map {
        title: String,
        points: Vec<MapPoint>,
    },
}

impl ChartData {
    pub fn bar(title: &str, counts: Vec<CountEntry>) -> Self {
        ChartData::Bar {
            title: title.to_string(),
            entries: entries(counts),
        }
    }

    pub fn pie(title: &str, counts: Vec<CountEntry>) -> Self {
        ChartData::Pie {
            title: title.to_string(),
            entries: entries(counts),
        }
    }

    pub fn line(title: &str, months: Vec<MonthCount>) -> Self {
        ChartData::Line {
            title: title.to_string(),
            points: months
                .into_iter()
                .map(|m| SeriesPoint {
                    x: m.month,
                    y: m.count,
                    series: None,
                })
                .collect(),
        }
    }

    pub fn multi_line(title: &str, cells: Vec<MonthCategoryCount>) -> Self {
        ChartData::Line {
            title: title.to_string(),
            points: cells
                .into_iter()
                .map(|c| SeriesPoint {
                    x: c.month,
                    y: c.count,
                    series: Some(c.category),
                })
                .collect(),
        }
    }

    pub fn box_plot(title: &str, stats: BoxStats) -> Self {
        ChartData::Box {
            title: title.to_string(),
            stats,
        }
    }

    pub fn summary(title: &str, stats: Summary) -> Self {
        ChartData::Summary {
            title: title.to_string(),
            stats,
        }
    }

    pub fn map(title: &str, points: Vec<MapPoint>) -> Self {
        ChartData::Map {
            title: title.to_string(),
            points,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ChartData::Bar { title, .. }
            | ChartData::Pie { title, .. }
            | ChartData::Line { title, .. }
            | ChartData::Box { title, .. }
            | ChartData::Summary { title, .. }
            | ChartData::Map { title, .. } => title,
        }
    }
}

fn entries(counts: Vec<CountEntry>) -> Vec<LabelValue> {
    counts
        .into_iter()
        .map(|c| LabelValue {
            label: c.label,
            value: c.count,
        })
        .collect()
}
