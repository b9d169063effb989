//! Analysis cycle — one call from candles and sentiment to a decision.
//!
//! Validates the series, precomputes indicators once, then derives the latest
//! snapshot, trend, levels, volume spike, market stats, strategy candidates and
//! the arbiter's decision. Nothing is persisted between calls.

use crate::arbiter::{AccountState, ArbiterOutcome, DecisionArbiter};
use crate::domain::{validate_series, Candle, InvalidCandle, SignalCandidate};
use crate::indicators::{IndicatorSeries, IndicatorSnapshot};
use crate::levels::{LevelDetector, LevelReport};
use crate::strategies::StrategySet;
use crate::trend::{classify_at, TrendReport};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("no candles supplied")]
    EmptySeries,

    #[error(transparent)]
    InvalidCandle(#[from] InvalidCandle),
}

/// Current volume against its 20-bar average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeSpike {
    pub is_spike: bool,
    pub current_volume: f64,
    pub average_volume: f64,
    pub multiplier: f64,
}

impl VolumeSpike {
    /// Spike when current / average ≥ `threshold`, read at the last bar.
    /// Fewer than 20 bars is never a spike.
    pub fn detect(candles: &[Candle], indicators: &IndicatorSeries, threshold: f64) -> Self {
        let current_volume = candles.last().map_or(0.0, |c| c.volume);
        let Some(average_volume) = candles
            .len()
            .checked_sub(1)
            .and_then(|last| indicators.volume_sma20(last))
        else {
            return Self {
                is_spike: false,
                current_volume,
                average_volume: 0.0,
                multiplier: 0.0,
            };
        };
        let multiplier = if average_volume > 0.0 {
            current_volume / average_volume
        } else {
            0.0
        };
        Self {
            is_spike: multiplier >= threshold,
            current_volume,
            average_volume,
            multiplier,
        }
    }
}

/// Summary price statistics for the latest bar and the whole period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    pub current_price: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub day_open: f64,
    pub prev_close: f64,
    /// Zero with fewer than 20 bars.
    pub volume_avg_20: f64,
    pub period_high: f64,
    pub period_low: f64,
}

impl MarketStats {
    pub fn from_candles(candles: &[Candle], indicators: &IndicatorSeries) -> Option<Self> {
        let index = candles.len().checked_sub(1)?;
        let last = &candles[index];
        let prev_close = index.checked_sub(1).map_or(last.close, |i| candles[i].close);
        let volume_avg_20 = indicators.volume_sma20(index).unwrap_or(0.0);
        Some(Self {
            current_price: last.close,
            day_high: last.high,
            day_low: last.low,
            day_open: last.open,
            prev_close,
            volume_avg_20,
            period_high: candles.iter().map(|c| c.high).fold(f64::MIN, f64::max),
            period_low: candles.iter().map(|c| c.low).fold(f64::MAX, f64::min),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub candles: Vec<Candle>,
    /// In [-1, 1]; out-of-range values are clamped, non-finite treated as 0.
    pub sentiment: f64,
    pub account: AccountState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub bars: usize,
    pub snapshot: IndicatorSnapshot,
    pub trend: TrendReport,
    pub levels: LevelReport,
    pub volume_spike: VolumeSpike,
    pub market: MarketStats,
    pub candidates: Vec<SignalCandidate>,
    pub outcome: ArbiterOutcome,
}

/// Runs the full cycle with one configuration.
#[derive(Debug)]
pub struct Analyzer {
    pub strategies: StrategySet,
    pub levels: LevelDetector,
    pub arbiter: DecisionArbiter,
    pub spike_threshold: f64,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            strategies: StrategySet::default(),
            levels: LevelDetector::default(),
            arbiter: DecisionArbiter::default(),
            spike_threshold: 2.0,
        }
    }
}

impl Analyzer {
    pub fn new(strategies: StrategySet, levels: LevelDetector, arbiter: DecisionArbiter) -> Self {
        Self {
            strategies,
            levels,
            arbiter,
            ..Self::default()
        }
    }

    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        let candles = &request.candles;
        let Some(last) = candles.len().checked_sub(1) else {
            return Err(AnalysisError::EmptySeries);
        };
        validate_series(candles)?;

        let indicators = IndicatorSeries::compute(candles);
        let market =
            MarketStats::from_candles(candles, &indicators).ok_or(AnalysisError::EmptySeries)?;

        let snapshot = indicators.snapshot(last);
        let trend = classify_at(candles, &indicators, last);
        let levels = self.levels.report(candles);
        let volume_spike = VolumeSpike::detect(candles, &indicators, self.spike_threshold);
        let candidates = self.strategies.evaluate_at(candles, last, &indicators);
        let outcome = self.arbiter.decide(
            &candidates,
            request.sentiment,
            request.account,
            candles,
            indicators.atr14(last),
        );

        info!(
            symbol = %request.symbol,
            bars = candles.len(),
            trend = %trend.trend,
            candidates = candidates.len(),
            action = %outcome.decision.action,
            "analysis complete"
        );

        Ok(AnalysisReport {
            symbol: request.symbol.clone(),
            bars: candles.len(),
            snapshot,
            trend,
            levels,
            volume_spike,
            market,
            candidates,
            outcome,
        })
    }
}
