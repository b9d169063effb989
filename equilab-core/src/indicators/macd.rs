//! Moving Average Convergence/Divergence (MACD).
//!
//! Three series (separate Indicator instances):
//! - Line: EMA(fast) - EMA(slow)
//! - Signal: EMA(signal) of the line, seeded once the line is defined
//! - Histogram: line - signal
//!
//! Lookback: slow - 1 for the line, slow + signal - 2 for signal and histogram.

use super::{ema_of_series, Indicator};
use crate::domain::Candle;

/// Which MACD series to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Line,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(slow > fast, "MACD slow period must exceed fast period");
        let label = match line {
            MacdLine::Line => "line",
            MacdLine::Signal => "signal",
            MacdLine::Histogram => "histogram",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }

    /// The conventional 12/26/9 configuration.
    pub fn standard(line: MacdLine) -> Self {
        Self::new(12, 26, 9, line)
    }
}

/// Compute line, signal, and histogram together.
pub fn macd_series(
    candles: &[Candle],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let fast_ema = ema_of_series(&closes, fast);
    let slow_ema = ema_of_series(&closes, slow);

    // NaN - x stays NaN, so the line is undefined until the slow EMA is
    let line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_of_series(&line, signal);
    let histogram = line
        .iter()
        .zip(&signal_line)
        .map(|(l, s)| l - s)
        .collect();

    (line, signal_line, histogram)
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            MacdLine::Line => self.slow - 1,
            MacdLine::Signal | MacdLine::Histogram => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let (line, signal, histogram) = macd_series(candles, self.fast, self.slow, self.signal);
        match self.line {
            MacdLine::Line => line,
            MacdLine::Signal => signal,
            MacdLine::Histogram => histogram,
        }
    }
}
