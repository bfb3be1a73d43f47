//! Report output: pretty JSON to stdout or per-report files.

use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::chart::ChartData;

/// Prints one chart payload as pretty JSON on stdout.
pub fn print_chart(chart: &ChartData) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(chart)?);
    Ok(())
}

/// Writes one chart payload to `<dir>/<name>.json`, creating the
/// directory first.
pub fn write_chart(dir: &Path, name: &str, chart: &ChartData) -> Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}.json"));
    fs::write(&path, serde_json::to_string_pretty(chart)?)?;
    info!(path = %path.display(), title = chart.title(), "Report written");
    Ok(())
}

/// Emits one named chart to a file under `out_dir` when given, stdout
/// otherwise.
pub fn emit(out_dir: Option<&Path>, name: &str, chart: &ChartData) -> Result<()> {
    match out_dir {
        Some(dir) => write_chart(dir, name, chart),
        None => print_chart(chart),
    }
}

/// Saves one raw downloaded resource under `dir`.
pub fn save_raw(dir: &Path, resource: &str, bytes: &[u8]) -> Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(resource);
    fs::write(&path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Resource saved");
    Ok(())
}
