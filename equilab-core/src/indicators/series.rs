//! Precomputed indicator series and per-bar snapshots.

use super::macd::macd_series;
use super::{Atr, Bollinger, Ema, Indicator, Rsi, Sma, Vwap};
use crate::domain::Candle;
use serde::{Deserialize, Serialize};

/// Every default indicator, computed once over the full candle series.
///
/// All vectors are index-aligned with the candles and hold `NaN` during warmup.
/// Because every indicator is causal, reading index `i` is identical to
/// recomputing on `candles[..=i]`.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSeries {
    pub rsi14: Vec<f64>,
    pub sma20: Vec<f64>,
    pub sma50: Vec<f64>,
    pub sma200: Vec<f64>,
    pub ema9: Vec<f64>,
    pub ema20: Vec<f64>,
    pub atr14: Vec<f64>,
    pub vwap: Vec<f64>,
    pub bb_upper: Vec<f64>,
    pub bb_middle: Vec<f64>,
    pub bb_lower: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_histogram: Vec<f64>,
    pub volume_sma20: Vec<f64>,
}

/// Indicator values at one bar. `None` until the window's warmup is complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi14: Option<f64>,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub ema9: Option<f64>,
    pub ema20: Option<f64>,
    pub atr14: Option<f64>,
    pub vwap: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub volume_sma20: Option<f64>,
}

fn at(values: &[f64], index: usize) -> Option<f64> {
    values.get(index).copied().filter(|v| v.is_finite())
}

impl IndicatorSeries {
    pub fn compute(candles: &[Candle]) -> Self {
        let (macd, macd_signal, macd_histogram) = macd_series(candles, 12, 26, 9);
        Self {
            rsi14: Rsi::new(14).compute(candles),
            sma20: Sma::new(20).compute(candles),
            sma50: Sma::new(50).compute(candles),
            sma200: Sma::new(200).compute(candles),
            ema9: Ema::new(9).compute(candles),
            ema20: Ema::new(20).compute(candles),
            atr14: Atr::new(14).compute(candles),
            vwap: Vwap::new().compute(candles),
            bb_upper: Bollinger::upper(20, 2.0).compute(candles),
            bb_middle: Bollinger::middle(20, 2.0).compute(candles),
            bb_lower: Bollinger::lower(20, 2.0).compute(candles),
            macd,
            macd_signal,
            macd_histogram,
            volume_sma20: Sma::volume(20).compute(candles),
        }
    }

    /// Number of bars covered.
    pub fn len(&self) -> usize {
        self.rsi14.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi14.is_empty()
    }

    pub fn rsi14(&self, index: usize) -> Option<f64> {
        at(&self.rsi14, index)
    }

    pub fn sma20(&self, index: usize) -> Option<f64> {
        at(&self.sma20, index)
    }

    pub fn sma50(&self, index: usize) -> Option<f64> {
        at(&self.sma50, index)
    }

    pub fn sma200(&self, index: usize) -> Option<f64> {
        at(&self.sma200, index)
    }

    pub fn atr14(&self, index: usize) -> Option<f64> {
        at(&self.atr14, index)
    }

    pub fn bb_lower(&self, index: usize) -> Option<f64> {
        at(&self.bb_lower, index)
    }

    pub fn macd_histogram(&self, index: usize) -> Option<f64> {
        at(&self.macd_histogram, index)
    }

    pub fn volume_sma20(&self, index: usize) -> Option<f64> {
        at(&self.volume_sma20, index)
    }

    /// Project bar `index` into a snapshot. Out-of-range indices yield all `None`.
    pub fn snapshot(&self, index: usize) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi14: at(&self.rsi14, index),
            sma20: at(&self.sma20, index),
            sma50: at(&self.sma50, index),
            sma200: at(&self.sma200, index),
            ema9: at(&self.ema9, index),
            ema20: at(&self.ema20, index),
            atr14: at(&self.atr14, index),
            vwap: at(&self.vwap, index),
            bb_upper: at(&self.bb_upper, index),
            bb_middle: at(&self.bb_middle, index),
            bb_lower: at(&self.bb_lower, index),
            macd: at(&self.macd, index),
            macd_signal: at(&self.macd_signal, index),
            macd_histogram: at(&self.macd_histogram, index),
            volume_sma20: at(&self.volume_sma20, index),
        }
    }

    /// Snapshot of the final bar, or all `None` when empty.
    pub fn latest(&self) -> IndicatorSnapshot {
        match self.len() {
            0 => IndicatorSnapshot::default(),
            n => self.snapshot(n - 1),
        }
    }

    /// All named series, for export and look-ahead checks.
    pub fn named(&self) -> Vec<(&'static str, &[f64])> {
        vec![
            ("rsi14", self.rsi14.as_slice()),
            ("sma20", self.sma20.as_slice()),
            ("sma50", self.sma50.as_slice()),
            ("sma200", self.sma200.as_slice()),
            ("ema9", self.ema9.as_slice()),
            ("ema20", self.ema20.as_slice()),
            ("atr14", self.atr14.as_slice()),
            ("vwap", self.vwap.as_slice()),
            ("bb_upper", self.bb_upper.as_slice()),
            ("bb_middle", self.bb_middle.as_slice()),
            ("bb_lower", self.bb_lower.as_slice()),
            ("macd", self.macd.as_slice()),
            ("macd_signal", self.macd_signal.as_slice()),
            ("macd_histogram", self.macd_histogram.as_slice()),
            ("volume_sma20", self.volume_sma20.as_slice()),
        ]
    }
}
