//! Mean reversion: oversold RSI below the lower Bollinger band.

use super::{candidate, check_window, Strategy, StrategyError};
use crate::domain::{Candle, Direction, SignalCandidate};
use crate::indicators::IndicatorSeries;

const CONFIDENCE: f64 = 0.7;
const OVERSOLD: f64 = 30.0;

/// BUY when RSI14 < 30 and the close is below the lower band.
/// Stop 5% under entry, target SMA20 (or +5% when SMA20 is undefined).
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanReversion;

impl Strategy for MeanReversion {
    fn id(&self) -> &str {
        "mean_reversion"
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
        let (Some(rsi), Some(lower)) = (indicators.rsi14(index), indicators.bb_lower(index)) else {
            return Ok(None);
        };
        if rsi >= OVERSOLD || current.close >= lower {
            return Ok(None);
        }

        let entry = current.close;
        let target = indicators.sma20(index).unwrap_or(entry * 1.05);
        Ok(Some(candidate(
            current,
            Direction::Buy,
            entry * 0.95,
            target,
            CONFIDENCE,
            format!("Oversold: RSI {rsi:.2} and Price below Lower BB"),
            self.id(),
        )))
    }
}
