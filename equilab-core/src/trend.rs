//! Trend classification from moving-average alignment.
//!
//! Evaluated fresh each cycle, no hysteresis.

use crate::domain::Candle;
use crate::indicators::IndicatorSeries;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bars needed before SMA200 exists.
pub const MIN_TREND_BARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Choppy,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
            Trend::Choppy => write!(f, "choppy"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendReport {
    pub trend: Trend,
    pub detail: String,
}

/// Classify the trend at bar `index` using precomputed indicators.
///
/// - fewer than 200 bars up to `index` → choppy
/// - price > SMA50 > SMA200 → up
/// - price < SMA50 < SMA200 → down
/// - anything else → choppy
pub fn classify_at(candles: &[Candle], series: &IndicatorSeries, index: usize) -> TrendReport {
    if candles.is_empty() || index >= candles.len() {
        return TrendReport {
            trend: Trend::Choppy,
            detail: "No data".into(),
        };
    }
    let bars = index + 1;
    if bars < MIN_TREND_BARS {
        return TrendReport {
            trend: Trend::Choppy,
            detail: format!("Insufficient data: {bars} bars (need {MIN_TREND_BARS})"),
        };
    }

    let price = candles[index].close;
    let trend = match (series.sma50(index), series.sma200(index)) {
        (Some(sma50), Some(sma200)) if price > sma50 && sma50 > sma200 => Trend::Up,
        (Some(sma50), Some(sma200)) if price < sma50 && sma50 < sma200 => Trend::Down,
        _ => Trend::Choppy,
    };
    TrendReport {
        trend,
        detail: format!("Detected {trend} trend based on SMA alignment"),
    }
}

/// Classify the trend at the last candle.
pub fn detect_trend(candles: &[Candle]) -> TrendReport {
    let series = IndicatorSeries::compute(candles);
    classify_at(candles, &series, candles.len().saturating_sub(1))
}
