//! Simple Moving Average (SMA).
//!
//! Rolling mean over a lookback window, of closes or of volume.
//! Lookback: period - 1 (first valid value at index period-1).

use super::{rolling_mean, Indicator};
use crate::domain::Candle;

/// Which candle field the average is taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmaSource {
    Close,
    Volume,
}

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    source: SmaSource,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            source: SmaSource::Close,
            name: format!("sma_{period}"),
        }
    }

    /// Average volume over `period` bars, including the current one.
    pub fn volume(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            source: SmaSource::Volume,
            name: format!("volume_sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let values: Vec<f64> = match self.source {
            SmaSource::Close => candles.iter().map(|c| c.close).collect(),
            SmaSource::Volume => candles.iter().map(|c| c.volume).collect(),
        };
        rolling_mean(&values, self.period)
    }
}
