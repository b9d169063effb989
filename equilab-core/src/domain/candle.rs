//! Candle — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV candle for a single symbol over one time bar.
///
/// Series of candles are ordered ascending by `timestamp`. Every calculation in
/// the engine uses the raw OHLC fields; `adj_close` is carried for collaborators
/// that want it but is never read by the indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub adj_close: Option<f64>,
}

/// A violated candle invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandleError {
    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },

    #[error("high {high} is below open, close or low")]
    HighBelowRange { high: f64 },

    #[error("low {low} is above open or close")]
    LowAboveRange { low: f64 },

    #[error("volume {0} is negative")]
    NegativeVolume(f64),

    #[error("timestamp {current} does not follow {previous}")]
    NotAscending {
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
}

/// A candle error located within a series.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("candle {index}: {source}")]
pub struct InvalidCandle {
    pub index: usize,
    #[source]
    pub source: CandleError,
}

impl Candle {
    pub fn new(
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            adj_close: None,
        }
    }

    /// Check `high >= {open, close, low} >= low`, `volume >= 0`, and finiteness.
    pub fn validate(&self) -> Result<(), CandleError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(CandleError::NonFinite { field });
            }
        }
        if self.high < self.open || self.high < self.close || self.high < self.low {
            return Err(CandleError::HighBelowRange { high: self.high });
        }
        if self.low > self.open || self.low > self.close {
            return Err(CandleError::LowAboveRange { low: self.low });
        }
        if self.volume < 0.0 {
            return Err(CandleError::NegativeVolume(self.volume));
        }
        Ok(())
    }

    /// Green candle: closed above its open.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Typical price used by VWAP: (high + low + close) / 3.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Validate every candle and the strict ascending timestamp order of a series.
pub fn validate_series(candles: &[Candle]) -> Result<(), InvalidCandle> {
    for (index, candle) in candles.iter().enumerate() {
        candle
            .validate()
            .map_err(|source| InvalidCandle { index, source })?;
        if index > 0 {
            let previous = candles[index - 1].timestamp;
            if candle.timestamp <= previous {
                return Err(InvalidCandle {
                    index,
                    source: CandleError::NotAscending {
                        previous,
                        current: candle.timestamp,
                    },
                });
            }
        }
    }
    Ok(())
}
