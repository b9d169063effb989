//! Indicator library.
//!
//! Indicators are pure functions: candle history in, numeric series out. Every
//! series has the same length as its input and is `NaN` during warmup. They are
//! precomputed once per cycle into an [`IndicatorSeries`] and read by bar index;
//! nothing is recomputed per bar.
//!
//! Multi-series indicators (Bollinger, MACD) are exposed as separate instances
//! per band, keeping the single-series `Indicator` trait unchanged.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod series;
pub mod sma;
pub mod vwap;

pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerBand};
pub use ema::Ema;
pub use macd::{Macd, MacdLine};
pub use rsi::Rsi;
pub use series::{IndicatorSeries, IndicatorSnapshot};
pub use sma::{Sma, SmaSource};
pub use vwap::Vwap;

use crate::domain::Candle;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of leading `NaN` values before the first valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire candle series.
    fn compute(&self, candles: &[Candle]) -> Vec<f64>;
}

/// Rolling simple mean of `values` over `period`. `NaN` until the window is full
/// and wherever the window contains a `NaN`.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window.iter().sum::<f64>() / period as f64;
    }
    result
}

/// EMA of an arbitrary series, seeded with the SMA of the first `period`
/// defined values. Leading `NaN`s are skipped so the helper can smooth a
/// derived series such as the MACD line.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }
    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };
    let seed_end = start + period - 1;
    if seed_end >= n {
        return result;
    }
    let seed_window = &values[start..=seed_end];
    if seed_window.iter().any(|v| v.is_nan()) {
        return result;
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = seed_window.iter().sum::<f64>() / period as f64;
    result[seed_end] = prev;
    for i in (seed_end + 1)..n {
        if values[i].is_nan() {
            // taint everything after a gap
            break;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }
    result
}

/// Create synthetic candles from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle::new(
                "TEST",
                base + chrono::Duration::days(i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000.0,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
