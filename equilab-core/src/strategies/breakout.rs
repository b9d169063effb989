//! Breakout — close through the nearest resistance on a volume surge.
//!
//! Levels are detected on `candles[..=index]`. The resistance is the nearest
//! level strictly above the previous close; the strategy fires BUY when the
//! current close is above it and volume exceeds 1.5× its 20-bar average
//! (the average includes the current bar).

use super::{candidate, check_window, Strategy, StrategyError};
use crate::domain::{Candle, Direction, SignalCandidate};
use crate::indicators::IndicatorSeries;
use crate::levels::{nearest_levels, LevelDetector};

const CONFIDENCE: f64 = 0.8;
const VOLUME_MULTIPLIER: f64 = 1.5;
const STOP_BELOW_LEVEL: f64 = 0.98;

#[derive(Debug, Clone, Default)]
pub struct Breakout {
    pub detector: LevelDetector,
}

impl Breakout {
    pub fn new(detector: LevelDetector) -> Self {
        Self { detector }
    }
}

impl Strategy for Breakout {
    fn id(&self) -> &str {
        "breakout"
    }

    fn min_bars(&self) -> usize {
        50
    }

    fn evaluate(
        &self,
        candles: &[Candle],
        index: usize,
        indicators: &IndicatorSeries,
    ) -> Result<Option<SignalCandidate>, StrategyError> {
        check_window(candles, index, self.min_bars())?;

        let current = &candles[index];
        let prev_close = candles[index - 1].close;

        let levels = self.detector.detect(&candles[..=index]);
        let Some(resistance) = nearest_levels(prev_close, &levels).resistance else {
            return Ok(None);
        };
        if current.close <= resistance {
            return Ok(None);
        }

        let Some(avg_volume) = indicators.volume_sma20(index) else {
            return Ok(None);
        };
        if current.volume <= VOLUME_MULTIPLIER * avg_volume {
            return Ok(None);
        }

        let entry = current.close;
        Ok(Some(candidate(
            current,
            Direction::Buy,
            resistance * STOP_BELOW_LEVEL,
            entry + 2.0 * (entry - resistance),
            CONFIDENCE,
            format!("Breakout above resistance {resistance:.2} with volume surge"),
            self.id(),
        )))
    }
}
