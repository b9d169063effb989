//! Report export — JSON reports plus CSV trade tape and equity curve.
//!
//! Every persisted report is wrapped in a manifest carrying a
//! `schema_version`, the config fingerprint and the dataset hash. Unknown
//! (newer) schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use equilab_core::domain::{BacktestTrade, EquityPoint};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::batch::{AnalysisRun, BacktestRun};

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// A persisted run: the run itself plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest<T> {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config_fingerprint: String,
    #[serde(flatten)]
    pub run: T,
}

impl<T> Manifest<T> {
    pub fn new(run: T, config_fingerprint: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            config_fingerprint: config_fingerprint.to_string(),
            run,
        }
    }
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json<T: Serialize>(manifest: &Manifest<T>) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("failed to serialize report to JSON")
}

/// Deserialize a manifest, rejecting schema versions newer than this build.
pub fn import_json<T: DeserializeOwned>(json: &str) -> Result<Manifest<T>> {
    let manifest: Manifest<T> =
        serde_json::from_str(json).context("failed to deserialize report from JSON")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Trade tape, one closed round trip per row.
pub fn export_trades_csv(trades: &[BacktestTrade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "entry_bar",
        "entry_time",
        "entry_price",
        "exit_bar",
        "exit_time",
        "exit_price",
        "shares",
        "pnl",
        "return_pct",
        "bars_held",
    ])?;
    for t in trades {
        wtr.write_record([
            &t.symbol,
            &t.entry_bar.to_string(),
            &t.entry_time.to_rfc3339(),
            &format!("{:.6}", t.entry_price),
            &t.exit_bar.to_string(),
            &t.exit_time.to_rfc3339(),
            &format!("{:.6}", t.exit_price),
            &format!("{:.6}", t.shares),
            &format!("{:.2}", t.pnl),
            &format!("{:.4}", t.return_pct()),
            &t.bars_held().to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn export_equity_csv(curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "equity"])?;
    for point in curve {
        wtr.write_record([&point.timestamp.to_rfc3339(), &format!("{:.2}", point.equity)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundles ───────────────────────────────────────────────

/// Write `{SYMBOL}_analysis.json` under `output_dir`. Returns the file path.
pub fn save_analysis(run: &AnalysisRun, fingerprint: &str, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;
    let path = output_dir.join(format!("{}_analysis.json", run.report.symbol));
    let json = export_json(&Manifest::new(run, fingerprint))?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Save a backtest as a directory `{SYMBOL}_{strategy}/` under `output_dir`
/// containing:
/// - `report.json`: the full manifest
/// - `trades.csv`: closed trades
/// - `equity.csv`: per-bar equity
///
/// Returns the path to the created directory.
pub fn save_backtest(run: &BacktestRun, fingerprint: &str, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(format!("{}_{}", run.report.symbol, run.report.strategy));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(&Manifest::new(run, fingerprint))?;
    std::fs::write(run_dir.join("report.json"), json)
        .with_context(|| format!("failed to write report in {}", run_dir.display()))?;

    let trades = export_trades_csv(&run.report.trades)?;
    std::fs::write(run_dir.join("trades.csv"), trades)
        .with_context(|| format!("failed to write trades in {}", run_dir.display()))?;

    let equity = export_equity_csv(&run.report.equity_curve)?;
    std::fs::write(run_dir.join("equity.csv"), equity)
        .with_context(|| format!("failed to write equity in {}", run_dir.display()))?;

    Ok(run_dir)
}
