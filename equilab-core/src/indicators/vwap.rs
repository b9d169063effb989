//! Volume-Weighted Average Price (VWAP), cumulative from the first candle.
//!
//! VWAP[t] = Σ(typical × volume) / Σ volume, typical = (high + low + close) / 3.
//! `NaN` while cumulative volume is zero.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone, Default)]
pub struct Vwap;

impl Vwap {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Vwap {
    fn name(&self) -> &str {
        "vwap"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let mut pv = 0.0;
        let mut volume = 0.0;
        candles
            .iter()
            .map(|c| {
                pv += c.typical_price() * c.volume;
                volume += c.volume;
                if volume > 0.0 {
                    pv / volume
                } else {
                    f64::NAN
                }
            })
            .collect()
    }
}
