//! EquiLab Runner — file-driven orchestration around `equilab-core`.
//!
//! This crate provides:
//! - TOML configuration with per-section defaults and a content fingerprint
//! - CSV candle loading with validation and dataset hashing
//! - Parallel multi-symbol analysis and backtest batches (rayon)
//! - JSON report manifests and CSV trade/equity export

pub mod batch;
pub mod config;
pub mod data_loader;
pub mod export;

pub use batch::{
    analyze_file, analyze_many, backtest_file, backtest_many, AnalysisRun, BacktestRun,
    BatchEntry, RunError,
};
pub use config::{ConfigError, ConfigFingerprint, RunnerConfig};
pub use data_loader::{dataset_hash, load_candles, load_candles_as, parse_timestamp, LoadError};
pub use export::{
    export_equity_csv, export_json, export_trades_csv, import_json, save_analysis,
    save_backtest, Manifest, SCHEMA_VERSION,
};
