//! MACD crossover: the histogram changing sign.
//!
//! Fires BUY when the histogram flips from negative to positive and SELL when
//! it flips from positive to negative. Bars where either histogram value is
//! still in warmup produce no signal.

use super::{candidate, check_window, Strategy, StrategyError};
use crate::domain::{Candle, Direction, SignalCandidate};
use crate::indicators::IndicatorSeries;

const CONFIDENCE: f64 = 0.75;

#[derive(Debug, Clone, Copy, Default)]
pub struct MacdCrossover;

impl Strategy for MacdCrossover {
    fn id(&self) -> &str {
        "macd_crossover"
    }

    fn min_bars(&self) -> usize {
        30
    }

    fn evaluate(
        &self,
        candles: &[Candle],
        index: usize,
        indicators: &IndicatorSeries,
    ) -> Result<Option<SignalCandidate>, StrategyError> {
        check_window(candles, index, self.min_bars())?;

        let (Some(prev), Some(curr)) = (
            indicators.macd_histogram(index - 1),
            indicators.macd_histogram(index),
        ) else {
            return Ok(None);
        };

        let current = &candles[index];
        let entry = current.close;
        let signal = if prev < 0.0 && curr > 0.0 {
            Some(candidate(
                current,
                Direction::Buy,
                entry * 0.97,
                entry * 1.06,
                CONFIDENCE,
                "MACD Bullish Crossover".into(),
                self.id(),
            ))
        } else if prev > 0.0 && curr < 0.0 {
            Some(candidate(
                current,
                Direction::Sell,
                entry * 1.03,
                entry * 0.94,
                CONFIDENCE,
                "MACD Bearish Crossover".into(),
                self.id(),
            ))
        } else {
            None
        };
        Ok(signal)
    }
}
