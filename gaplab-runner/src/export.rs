//! Reporting and export: JSON and CSV artifact generation.
//!
//! - **JSON**: full round-trip serialization of a `RunReport` with schema versioning
//! - **CSV**: selection table for spreadsheets and order-entry tools
//!
//! Persisted reports carry a `schema_version`. Newer versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use gaplab_core::{Selection, SizingError};

use crate::pipeline::{Rejection, RunReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `RunReport` to pretty JSON.
pub fn export_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize RunReport to JSON")
}

/// Deserialize a `RunReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunReport> {
    let report: RunReport =
        serde_json::from_str(json).context("failed to deserialize RunReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export selections as CSV.
///
/// Columns: ticker, entry_price, stop_loss_price, take_profit_price, shares, profit
pub fn export_selections_csv(selections: &[Selection]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "ticker",
        "entry_price",
        "stop_loss_price",
        "take_profit_price",
        "shares",
        "profit",
    ])?;

    for s in selections {
        let p = &s.position;
        let row: [&str; 6] = [
            &s.ticker,
            &format!("{:.2}", p.entry_price),
            &format!("{:.2}", p.stop_loss_price),
            &format!("{:.2}", p.take_profit_price),
            &p.shares.to_string(),
            &format!("{:.2}", p.profit),
        ];
        wtr.write_record(row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export sizing rejections as CSV with ticker, line, kind, and reason columns.
pub fn export_rejections_csv(rejections: &[Rejection]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["ticker", "line", "kind", "reason"])?;
    for r in rejections {
        let (kind, reason) = match &r.error {
            SizingError::InvalidInput { reason } => ("invalid_input", reason),
            SizingError::DegenerateInput { reason } => ("degenerate_input", reason),
        };
        let row: [&str; 4] = [&r.ticker, &r.line.to_string(), kind, reason];
        wtr.write_record(row)?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a run.
///
/// Creates a directory named `{input_stem}_{timestamp}/` under `output_dir`
/// containing:
/// - `report.json`: the full `RunReport`
/// - `selections.csv`: sized positions
/// - `rejections.csv`: candidates that could not be sized (only if any)
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &RunReport, input: &Path, output_dir: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "run".to_string());
    let dirname = format!("{}_{}", stem, chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(report)?;
    std::fs::write(run_dir.join("report.json"), &json)?;

    let selections_csv = export_selections_csv(&report.selections)?;
    std::fs::write(run_dir.join("selections.csv"), &selections_csv)?;

    if !report.rejections.is_empty() {
        let rejections_csv = export_rejections_csv(&report.rejections)?;
        std::fs::write(run_dir.join("rejections.csv"), &rejections_csv)?;
    }

    tracing::info!(dir = %run_dir.display(), "saved artifacts");
    Ok(run_dir)
}
