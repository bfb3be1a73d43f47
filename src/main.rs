//! CLI entry point for the CENIPA occurrence statistics tool.
//!
//! Provides subcommands for the four report groups plus utilities for
//! downloading the raw resources, inspecting the datasets, and listing
//! the report catalog.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use cenipa_stats::clean;
use cenipa_stats::fetch::BasicClient;
use cenipa_stats::output;
use cenipa_stats::reports::{self, Params, Report};
use cenipa_stats::source::{self, Dataset};
use cenipa_stats::table::{Table, Value};

#[derive(Parser)]
#[command(name = "cenipa_stats")]
#[command(about = "Aggregate statistics over CENIPA aviation occurrence data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ReportArgs {
    /// Base URL or directory holding the CSV resources
    /// (CENIPA_BASE_URL overrides the built-in default)
    #[arg(long)]
    base: Option<String>,

    /// Run a single report by name instead of the whole group
    #[arg(short, long)]
    report: Option<String>,

    /// Write each report as <name>.json under this directory instead of stdout
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reports over the occurrence dataset
    Occurrence {
        #[command(flatten)]
        args: ReportArgs,

        /// Lower date bound of the accident map (yyyy-mm-dd)
        #[arg(long, default_value = "2020-01-01", value_parser = parse_date)]
        since: NaiveDate,
    },
    /// Reports over the occurrence-type dataset
    Types {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Reports over the aircraft dataset
    Aircraft {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Reports over the contributing-factor dataset
    Factors {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Load all four datasets and log their shape and fill level
    Info {
        /// Base URL or directory holding the CSV resources
        #[arg(long)]
        base: Option<String>,
    },
    /// Download the four raw resources for offline reruns
    Download {
        /// Base URL or directory holding the CSV resources
        #[arg(long)]
        base: Option<String>,

        /// Directory to save the CSV files
        #[arg(short, long, default_value = "data")]
        out_dir: PathBuf,
    },
    /// List every report group and report name
    ListReports,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/cenipa_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("cenipa_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Occurrence { args, since } => {
            let params = Params {
                since: since.and_time(NaiveTime::MIN),
            };
            let table = load_clean(&args, &source::OCCURRENCE, clean::clean_occurrences).await?;
            emit_reports(&reports::occurrence::REPORTS, &table, &params, &args)?;
        }
        Commands::Types { args } => {
            let table = load_clean(
                &args,
                &source::OCCURRENCE_TYPE,
                clean::clean_occurrence_types,
            )
            .await?;
            emit_reports(
                &reports::occurrence_type::REPORTS,
                &table,
                &unbounded(),
                &args,
            )?;
        }
        Commands::Aircraft { args } => {
            let table = load_clean(&args, &source::AIRCRAFT, clean::clean_aircraft).await?;
            emit_reports(&reports::aircraft::REPORTS, &table, &unbounded(), &args)?;
        }
        Commands::Factors { args } => {
            let table =
                load_clean(&args, &source::CONTRIBUTING_FACTOR, clean::clean_factors).await?;
            emit_reports(&reports::factor::REPORTS, &table, &unbounded(), &args)?;
        }
        Commands::Info { base } => {
            info_datasets(&resolve_base(base)).await?;
        }
        Commands::Download { base, out_dir } => {
            download(&resolve_base(base), &out_dir).await?;
        }
        Commands::ListReports => {
            for (group, group_reports) in reports::groups() {
                for report in group_reports {
                    println!("{group:<12} {:<28} {}", report.name, report.description);
                }
            }
        }
    }

    Ok(())
}

/// CLI flag wins over CENIPA_BASE_URL, which wins over the default.
fn resolve_base(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("CENIPA_BASE_URL").ok())
        .unwrap_or_else(|| source::DEFAULT_BASE_URL.to_string())
}

fn parse_date(s: &str) -> chrono::format::ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
}

/// Parameters for groups whose reports ignore the map bound.
fn unbounded() -> Params {
    Params {
        since: NaiveDateTime::MIN,
    }
}

/// Fetches one dataset and runs its cleaning pass.
async fn load_clean(
    args: &ReportArgs,
    dataset: &Dataset,
    cleaner: fn(Table) -> cenipa_stats::error::Result<Table>,
) -> Result<Table> {
    let base = resolve_base(args.base.clone());
    let client = BasicClient::new();
    let table = source::load_dataset(&client, &base, dataset).await?;
    info!(
        dataset = dataset.name,
        rows = table.len(),
        "Dataset loaded, cleaning"
    );
    Ok(cleaner(table)?)
}

/// Runs one named report or the whole group and emits the payloads.
fn emit_reports(
    group: &[Report],
    table: &Table,
    params: &Params,
    args: &ReportArgs,
) -> Result<()> {
    let out_dir = args.out_dir.as_deref();
    match &args.report {
        Some(name) => {
            let report = reports::find(group, name)?;
            let chart = report.produce(table, params)?;
            output::emit(out_dir, report.name, &chart)?;
        }
        None => {
            for (name, chart) in reports::run_group(group, table, params)? {
                output::emit(out_dir, name, &chart)?;
            }
        }
    }
    Ok(())
}

/// Loads all four datasets concurrently and logs per-column fill levels,
/// counting blank text as undefined the way the cleaners will.
#[tracing::instrument]
async fn info_datasets(base: &str) -> Result<()> {
    let tables = source::load_all(base).await?;
    for table in [
        &tables.occurrences,
        &tables.occurrence_types,
        &tables.aircraft,
        &tables.factors,
    ] {
        info!(
            dataset = table.name(),
            rows = table.len(),
            columns = table.columns().len(),
            "Dataset loaded"
        );
        for column in table.columns() {
            let defined = table
                .cells(column)
                .map(|cells| cells.filter(|v| is_filled(v)).count())
                .unwrap_or(0);
            info!(
                dataset = table.name(),
                column = %column,
                defined,
                rows = table.len(),
                "Column"
            );
        }
    }
    Ok(())
}

fn is_filled(value: &Value) -> bool {
    match value {
        Value::Text(s) => !s.trim().is_empty(),
        other => !other.is_missing(),
    }
}

/// Fetches the four raw resources, validates that each parses, and saves
/// them unmodified so `--base <dir>` can replay them offline.
#[tracing::instrument(skip(out_dir), fields(dir = %out_dir.display()))]
async fn download(base: &str, out_dir: &Path) -> Result<()> {
    let client = BasicClient::new();
    for dataset in source::ALL_DATASETS {
        let bytes = source::read_source(&client, base, &dataset).await?;
        source::parse_table(&dataset, &bytes)?;
        output::save_raw(out_dir, dataset.resource, &bytes)?;
    }
    info!(dir = %out_dir.display(), "All resources saved");
    Ok(())
}
