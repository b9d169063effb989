//! Relative Strength Index (RSI).
//!
//! Rolling simple means of gains and losses over `period` close-to-close changes.
//! The first bar has no prior close; its change counts as zero.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period - 1.
//! Edge cases: avg_loss == 0 → RSI = 100; avg_gain == 0 → RSI = 0.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let n = candles.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        // changes[i] is the move into candle i
        let changes: Vec<f64> = std::iter::once(0.0)
            .chain(candles.windows(2).map(|w| w[1].close - w[0].close))
            .collect();

        for i in (self.period - 1)..n {
            let window = &changes[(i + 1 - self.period)..=i];
            if window.iter().any(|c| c.is_nan()) {
                continue;
            }
            let mut gain = 0.0;
            let mut loss = 0.0;
            for &ch in window {
                if ch > 0.0 {
                    gain += ch;
                } else {
                    loss -= ch;
                }
            }
            let period = self.period as f64;
            result[i] = compute_rsi(gain / period, loss / period);
        }

        result
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}
