//! File-driven runs, single and batched.
//!
//! A batch fans out across symbols with rayon. Each symbol gets its own
//! `Result`; one unreadable file or degenerate series never aborts the rest.
//! Output order matches input order.

use std::path::{Path, PathBuf};

use equilab_core::analysis::{AnalysisError, AnalysisReport, AnalysisRequest, Analyzer};
use equilab_core::backtest::{BacktestError, BacktestReport};
use equilab_core::strategies::StrategyKind;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::RunnerConfig;
use crate::data_loader::{dataset_hash, load_candles, LoadError};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),
}

/// One analysis cycle plus the hash of the candles it ran on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub dataset_hash: String,
    pub report: AnalysisReport,
}

/// One backtest plus the hash of the candles it ran on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRun {
    pub dataset_hash: String,
    pub report: BacktestReport,
}

/// Per-input outcome of a batch.
#[derive(Debug)]
pub struct BatchEntry<T> {
    pub path: PathBuf,
    pub outcome: Result<T, RunError>,
}

impl<T> BatchEntry<T> {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Load one file and run the analysis cycle on it.
pub fn analyze_file(
    analyzer: &Analyzer,
    config: &RunnerConfig,
    path: &Path,
    sentiment: f64,
) -> Result<AnalysisRun, RunError> {
    let candles = load_candles(path)?;
    let hash = dataset_hash(&candles);
    let request = AnalysisRequest {
        symbol: candles[0].symbol.clone(),
        candles,
        sentiment,
        account: config.account,
    };
    let report = analyzer.analyze(&request)?;
    Ok(AnalysisRun {
        dataset_hash: hash,
        report,
    })
}

/// Analyze every file in parallel with one shared sentiment score.
pub fn analyze_many(
    paths: &[PathBuf],
    sentiment: f64,
    config: &RunnerConfig,
) -> Vec<BatchEntry<AnalysisRun>> {
    let analyzer = config.analyzer();
    let entries: Vec<_> = paths
        .par_iter()
        .map(|path| {
            let outcome = analyze_file(&analyzer, config, path, sentiment);
            if let Err(err) = &outcome {
                warn!(path = %path.display(), %err, "analysis failed");
            }
            BatchEntry {
                path: path.clone(),
                outcome,
            }
        })
        .collect();
    let succeeded = entries.iter().filter(|e| e.is_ok()).count();
    info!(succeeded, failed = entries.len() - succeeded, "batch analysis complete");
    entries
}

/// Load one file and backtest one strategy over it.
pub fn backtest_file(
    config: &RunnerConfig,
    path: &Path,
    kind: StrategyKind,
) -> Result<BacktestRun, RunError> {
    let candles = load_candles(path)?;
    let strategy = config.strategy(kind);
    let report = config.backtester().run(&candles, strategy.as_ref())?;
    Ok(BacktestRun {
        dataset_hash: dataset_hash(&candles),
        report,
    })
}

/// Backtest every (file, strategy) pair in parallel.
///
/// Entries are ordered file-major: all strategies for the first file, then
/// the next file.
pub fn backtest_many(
    paths: &[PathBuf],
    kinds: &[StrategyKind],
    config: &RunnerConfig,
) -> Vec<BatchEntry<BacktestRun>> {
    let jobs: Vec<(&PathBuf, StrategyKind)> = paths
        .iter()
        .flat_map(|path| kinds.iter().map(move |&kind| (path, kind)))
        .collect();
    let entries: Vec<_> = jobs
        .into_par_iter()
        .map(|(path, kind)| {
            let outcome = backtest_file(config, path, kind);
            if let Err(err) = &outcome {
                warn!(path = %path.display(), strategy = %kind, %err, "backtest failed");
            }
            BatchEntry {
                path: path.clone(),
                outcome,
            }
        })
        .collect();
    let succeeded = entries.iter().filter(|e| e.is_ok()).count();
    info!(succeeded, failed = entries.len() - succeeded, "batch backtest complete");
    entries
}
