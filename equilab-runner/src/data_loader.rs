//! Candle loading from CSV files.
//!
//! Expected header: `timestamp,open,high,low,close,volume[,adj_close]`.
//! Timestamps are RFC 3339 (`2024-01-02T00:00:00Z`), `YYYY-MM-DD HH:MM:SS`
//! (taken as UTC) or a plain `YYYY-MM-DD` date (midnight UTC).
//!
//! The symbol is taken from the file stem (`data/AAPL.csv` -> `AAPL`) unless
//! the caller supplies one. Loaded series are validated with the same rules
//! the engine applies, so a file that loads is a file the engine accepts.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use equilab_core::domain::{validate_series, Candle, InvalidCandle};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: malformed CSV row: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: row {row}: unsupported timestamp '{value}'")]
    Timestamp {
        path: String,
        row: usize,
        value: String,
    },

    #[error("{path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: InvalidCandle,
    },

    #[error("{path}: no candles")]
    Empty { path: String },

    #[error("cannot derive a symbol from {path}")]
    NoSymbol { path: String },
}

#[derive(Debug, Deserialize)]
struct CandleRecord {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    #[serde(default)]
    adj_close: Option<f64>,
}

/// Symbol implied by a file path: the upper-cased file stem.
pub fn symbol_from_path(path: &Path) -> Result<String, LoadError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_uppercase())
        .ok_or_else(|| LoadError::NoSymbol {
            path: path.display().to_string(),
        })
}

/// Load and validate a candle series, naming it after the file.
pub fn load_candles(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let symbol = symbol_from_path(path)?;
    load_candles_as(path, &symbol)
}

/// Load and validate a candle series under an explicit symbol.
pub fn load_candles_as(path: &Path, symbol: &str) -> Result<Vec<Candle>, LoadError> {
    let path_str = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path_str.clone(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut candles = Vec::new();
    for (row, record) in reader.deserialize::<CandleRecord>().enumerate() {
        let record = record.map_err(|source| LoadError::Csv {
            path: path_str.clone(),
            source,
        })?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| LoadError::Timestamp {
            path: path_str.clone(),
            row: row + 1,
            value: record.timestamp.clone(),
        })?;
        let mut candle = Candle::new(
            symbol,
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        );
        candle.adj_close = record.adj_close;
        candles.push(candle);
    }

    if candles.is_empty() {
        return Err(LoadError::Empty { path: path_str });
    }
    validate_series(&candles).map_err(|source| LoadError::Invalid {
        path: path_str.clone(),
        source,
    })?;

    debug!(path = %path_str, symbol, bars = candles.len(), "candles loaded");
    Ok(candles)
}

/// Parse the accepted timestamp formats into UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Deterministic BLAKE3 hash over a candle series.
///
/// Covers symbol, timestamps and every OHLCV value, so two reports tagged with
/// the same hash were computed from identical input.
pub fn dataset_hash(candles: &[Candle]) -> String {
    let mut hasher = blake3::Hasher::new();
    for candle in candles {
        hasher.update(candle.symbol.as_bytes());
        hasher.update(&candle.timestamp.timestamp().to_le_bytes());
        hasher.update(&candle.open.to_le_bytes());
        hasher.update(&candle.high.to_le_bytes());
        hasher.update(&candle.low.to_le_bytes());
        hasher.update(&candle.close.to_le_bytes());
        hasher.update(&candle.volume.to_le_bytes());
        hasher.update(&candle.adj_close.unwrap_or(f64::NAN).to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
