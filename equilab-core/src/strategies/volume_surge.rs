//! Volume above 3× its 20-bar average, direction from the candle body.

use super::{candidate, check_window, Strategy, StrategyError};
use crate::domain::{Candle, Direction, SignalCandidate};
use crate::indicators::IndicatorSeries;

const CONFIDENCE: f64 = 0.6;
const SURGE_MULTIPLIER: f64 = 3.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeSurge;

impl Strategy for VolumeSurge {
    fn id(&self) -> &str {
        "volume_surge"
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
        let Some(avg_volume) = indicators.volume_sma20(index) else {
            return Ok(None);
        };
        if current.volume <= SURGE_MULTIPLIER * avg_volume {
            return Ok(None);
        }

        let entry = current.close;
        let (direction, stop, target, reason) = if current.is_bullish() {
            (Direction::Buy, entry * 0.98, entry * 1.05, "Massive buying volume")
        } else {
            (Direction::Sell, entry * 1.02, entry * 0.95, "Massive selling volume")
        };
        Ok(Some(candidate(
            current,
            direction,
            stop,
            target,
            CONFIDENCE,
            format!("{reason}: {:.0} vs Avg {avg_volume:.0}", current.volume),
            self.id(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{ascending_series, breakout_series};

    #[test]
    fn bullish_surge_buys() {
        let mut candles = ascending_series();
        candles[49].volume = 10_000.0;
        let indicators = IndicatorSeries::compute(&candles);
        let signal = VolumeSurge
            .evaluate(&candles, 49, &indicators)
            .unwrap()
            .expect("surge should fire");
        // avg = (19 * 1000 + 10000) / 20 = 1450
        assert_eq!(signal.direction, Direction::Buy);
        assert_eq!(signal.rationale, "Massive buying volume: 10000 vs Avg 1450");
        assert!((signal.stop_loss - signal.entry * 0.98).abs() < 1e-9);
        assert!((signal.target - signal.entry * 1.05).abs() < 1e-9);
    }

    #[test]
    fn bearish_surge_sells() {
        let mut candles = ascending_series();
        let last = &mut candles[49];
        last.volume = 10_000.0;
        last.close = last.open - 1.0;
        let indicators = IndicatorSeries::compute(&candles);
        let signal = VolumeSurge
            .evaluate(&candles, 49, &indicators)
            .unwrap()
            .expect("surge should fire");
        assert_eq!(signal.direction, Direction::Sell);
        assert!(signal.stop_loss > signal.entry);
        assert!(signal.target < signal.entry);
    }

    #[test]
    fn moderate_volume_is_not_a_surge() {
        // 2500 vs an average of 1075 is below 3×
        let candles = breakout_series();
        let indicators = IndicatorSeries::compute(&candles);
        assert_eq!(VolumeSurge.evaluate(&candles, 49, &indicators), Ok(None));
    }
}
