//! End-to-end tests: the CSV fixtures through load, clean and report.

use std::fs;

use chrono::NaiveDate;

use cenipa_stats::aggregate;
use cenipa_stats::chart::ChartData;
use cenipa_stats::clean;
use cenipa_stats::error::Error;
use cenipa_stats::fetch::BasicClient;
use cenipa_stats::reports::{self, Params};
use cenipa_stats::source;
use cenipa_stats::table::{Table, Value};

fn stage_fixtures() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in [
        ("ocorrencia.csv", include_str!("fixtures/ocorrencia.csv")),
        (
            "ocorrencia_tipo.csv",
            include_str!("fixtures/ocorrencia_tipo.csv"),
        ),
        ("aeronave.csv", include_str!("fixtures/aeronave.csv")),
        (
            "fator_contribuinte.csv",
            include_str!("fixtures/fator_contribuinte.csv"),
        ),
    ] {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

fn params() -> Params {
    Params {
        since: NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    }
}

async fn load_clean_fixture(
    dir: &tempfile::TempDir,
    dataset: &source::Dataset,
    cleaner: fn(Table) -> cenipa_stats::error::Result<Table>,
) -> Table {
    let client = BasicClient::new();
    let raw = source::load_dataset(&client, dir.path().to_str().unwrap(), dataset)
        .await
        .unwrap();
    cleaner(raw).unwrap()
}

fn produce(group: &[reports::Report], name: &str, table: &Table) -> ChartData {
    reports::find(group, name)
        .unwrap()
        .produce(table, &params())
        .unwrap()
}

#[tokio::test]
async fn test_load_all_returns_raw_text_tables() {
    let dir = stage_fixtures();
    let tables = source::load_all(dir.path().to_str().unwrap()).await.unwrap();

    assert_eq!(tables.occurrences.len(), 8);
    assert_eq!(tables.occurrence_types.len(), 8);
    assert_eq!(tables.aircraft.len(), 9);
    assert_eq!(tables.factors.len(), 8);

    // the loader never types cells
    let mut cells = tables
        .occurrences
        .cells("total_aeronaves_envolvidas")
        .unwrap();
    assert!(cells.all(|v| matches!(v, Value::Text(_))));
}

#[tokio::test]
async fn test_missing_resource_is_source_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let client = BasicClient::new();
    let err = source::load_dataset(&client, dir.path().to_str().unwrap(), &source::OCCURRENCE)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::SourceUnavailable { name, .. } if name == "occurrence"));
}

#[tokio::test]
async fn test_occurrence_monthly_fills_gap_months() {
    let dir = stage_fixtures();
    let table = load_clean_fixture(&dir, &source::OCCURRENCE, clean::clean_occurrences).await;

    let chart = produce(&reports::occurrence::REPORTS, "monthly", &table);
    let ChartData::Line { points, .. } = chart else {
        panic!("expected line");
    };

    // Dec 2019 through May 2020, Feb and Apr with no occurrences
    let counts: Vec<u64> = points.iter().map(|p| p.y).collect();
    assert_eq!(counts, [1, 2, 0, 2, 0, 3]);
    assert_eq!(points[0].x, NaiveDate::from_ymd_opt(2019, 12, 1).unwrap());
}

#[tokio::test]
async fn test_occurrence_map_excludes_redacted_blank_and_old_rows() {
    let dir = stage_fixtures();
    let table = load_clean_fixture(&dir, &source::OCCURRENCE, clean::clean_occurrences).await;

    let chart = produce(&reports::occurrence::REPORTS, "accident-map", &table);
    let ChartData::Map { points, .. } = chart else {
        panic!("expected map");
    };

    // of the five accidents: one has redacted coordinates, one blank
    // coordinates and one predates the bound
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].label.as_deref(), Some("BRASÍLIA"));
    assert!((points[0].lat - -15.24).abs() < 1e-9);
    assert_eq!(points[1].label.as_deref(), Some("CURITIBA"));
}

#[tokio::test]
async fn test_occurrence_investigation_status_pie() {
    let dir = stage_fixtures();
    let table = load_clean_fixture(&dir, &source::OCCURRENCE, clean::clean_occurrences).await;

    let chart = produce(&reports::occurrence::REPORTS, "investigation-status", &table);
    let ChartData::Pie { entries, .. } = chart else {
        panic!("expected pie");
    };
    assert_eq!(entries[0].label, "FINALIZADA");
    assert_eq!(entries[0].value, 5);
    assert_eq!(entries[1].label, "ATIVA");
    assert_eq!(entries[1].value, 3);
}

#[tokio::test]
async fn test_type_categories_cleaned_to_pipe_prefix() {
    let dir = stage_fixtures();
    let table =
        load_clean_fixture(&dir, &source::OCCURRENCE_TYPE, clean::clean_occurrence_types).await;

    let chart = produce(&reports::occurrence_type::REPORTS, "top-categories", &table);
    let ChartData::Bar { entries, .. } = chart else {
        panic!("expected bar");
    };

    assert!(entries.iter().all(|e| !e.label.contains('|')));
    assert_eq!(entries[0].label, "FALHA DO MOTOR");
    assert_eq!(entries[0].value, 3);
    assert_eq!(entries[1].label, "COM TREM DE POUSO");
    // singleton ties keep row order
    assert_eq!(entries[2].label, "PERDA DE CONTROLE EM VOO");
    assert_eq!(entries[3].label, "COLISÃO");
}

#[tokio::test]
async fn test_aircraft_damage_levels_bucket_conserves_total() {
    let dir = stage_fixtures();
    let table = load_clean_fixture(&dir, &source::AIRCRAFT, clean::clean_aircraft).await;

    let chart = produce(&reports::aircraft::REPORTS, "damage-levels", &table);
    let ChartData::Bar { entries, .. } = chart else {
        panic!("expected bar");
    };

    let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(
        labels,
        ["NENHUM", "LEVE", "SUBSTANCIAL", "DESTRUÍDA", "(desconhecido)"]
    );
    let values: Vec<u64> = entries.iter().map(|e| e.value).collect();
    assert_eq!(values, [2, 1, 2, 3, 1]);
    assert_eq!(values.iter().sum::<u64>(), table.len() as u64);
}

#[tokio::test]
async fn test_aircraft_fabrication_years_drop_year_zero() {
    let dir = stage_fixtures();
    let table = load_clean_fixture(&dir, &source::AIRCRAFT, clean::clean_aircraft).await;

    let chart = produce(&reports::aircraft::REPORTS, "fabrication-years", &table);
    let ChartData::Summary { stats, .. } = chart else {
        panic!("expected summary");
    };
    assert_eq!(stats.count, 8);
    assert_eq!(stats.min, 1975.0);
    assert_eq!(stats.max, 2018.0);
}

#[tokio::test]
async fn test_aircraft_group_runs_every_report() {
    let dir = stage_fixtures();
    let table = load_clean_fixture(&dir, &source::AIRCRAFT, clean::clean_aircraft).await;

    let charts = reports::run_group(&reports::aircraft::REPORTS, &table, &params()).unwrap();
    assert_eq!(charts.len(), reports::aircraft::REPORTS.len());
}

#[tokio::test]
async fn test_aircraft_fatality_reports_narrow_by_damage() {
    let dir = stage_fixtures();
    let table = load_clean_fixture(&dir, &source::AIRCRAFT, clean::clean_aircraft).await;

    let all = produce(&reports::aircraft::REPORTS, "fatalities", &table);
    let ChartData::Bar { entries, .. } = all else {
        panic!("expected bar");
    };
    assert_eq!(entries.iter().map(|e| e.value).sum::<u64>(), 9);

    let substantial = produce(&reports::aircraft::REPORTS, "fatalities-substantial", &table);
    let ChartData::Bar { entries, .. } = substantial else {
        panic!("expected bar");
    };
    assert_eq!(entries.iter().map(|e| e.value).sum::<u64>(), 6);

    let destroyed = produce(&reports::aircraft::REPORTS, "fatalities-destroyed-box", &table);
    let ChartData::Box { stats, .. } = destroyed else {
        panic!("expected box");
    };
    // destroyed aircraft carried 1, 2 and 3 fatalities
    assert_eq!(stats.median, 2.0);
}

#[tokio::test]
async fn test_damage_exclusion_ids_rejoin_to_source_rows() {
    let dir = stage_fixtures();
    let table = load_clean_fixture(&dir, &source::AIRCRAFT, clean::clean_aircraft).await;

    let excluded = [source::DAMAGE_NONE, source::DAMAGE_LIGHT];
    let narrowed = table
        .filter_not_isin(source::COL_DAMAGE_LEVEL, &excluded)
        .unwrap();
    let damage = table.column_index(source::COL_DAMAGE_LEVEL).unwrap();
    for row in narrowed.rows() {
        let original = table.rows().iter().find(|r| r.id() == row.id()).unwrap();
        let label = original.cell(damage).label();
        assert!(!label.is_some_and(|l| excluded.contains(&l.as_str())));
    }

    // the narrowed counts cover exactly the surviving rows
    let counts = aggregate::value_counts(&narrowed, source::COL_FATALITIES).unwrap();
    assert_eq!(
        counts.iter().map(|c| c.count).sum::<u64>(),
        narrowed.len() as u64
    );
}

#[tokio::test]
async fn test_factor_reports_narrow_by_area_and_conditioning() {
    let dir = stage_fixtures();
    let table =
        load_clean_fixture(&dir, &source::CONTRIBUTING_FACTOR, clean::clean_factors).await;

    let areas = produce(&reports::factor::REPORTS, "areas", &table);
    let ChartData::Bar { entries, .. } = areas else {
        panic!("expected bar");
    };
    assert_eq!(entries[0].label, "FATOR OPERACIONAL");
    assert_eq!(entries[0].value, 5);
    assert_eq!(entries[1].value, 3);

    let names = produce(&reports::factor::REPORTS, "operational-top-names", &table);
    let ChartData::Bar { entries, .. } = names else {
        panic!("expected bar");
    };
    assert_eq!(entries[0].label, "JULGAMENTO DE PILOTAGEM");
    assert_eq!(entries[0].value, 2);

    let individual = produce(&reports::factor::REPORTS, "human-individual-names", &table);
    let ChartData::Bar { entries, .. } = individual else {
        panic!("expected bar");
    };
    assert_eq!(
        entries,
        vec![cenipa_stats::chart::LabelValue {
            label: "ATITUDE".to_string(),
            value: 2,
        }]
    );
}
