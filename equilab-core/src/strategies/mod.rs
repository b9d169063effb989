//! Strategy set — each strategy maps an indicator-augmented window to at most
//! one candidate signal.
//!
//! Strategies are portfolio-agnostic: they receive candle history and the
//! precomputed indicator series, never account or position state.

pub mod breakout;
pub mod macd_crossover;
pub mod mean_reversion;
pub mod volume_surge;

pub use breakout::Breakout;
pub use macd_crossover::MacdCrossover;
pub use mean_reversion::MeanReversion;
pub use volume_surge::VolumeSurge;

use crate::domain::{Candle, Direction, SignalCandidate};
use crate::indicators::IndicatorSeries;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a strategy could not evaluate a bar.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("insufficient data: {available} bars (need {required})")]
    InsufficientData { required: usize, available: usize },

    #[error("non-finite {field} at bar {index}")]
    NonFinite { field: &'static str, index: usize },

    #[error("bar index {index} out of range for {len} candles")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Trait for strategies.
///
/// # Architecture invariant
/// `evaluate` must only read `candles[0..=index]` and indicator values at
/// indices `<= index`.
pub trait Strategy: Send + Sync {
    /// Stable identifier (e.g., "breakout").
    fn id(&self) -> &str;

    /// Number of bars (`index + 1`) needed before this strategy can evaluate.
    fn min_bars(&self) -> usize;

    /// Evaluate the strategy at `index`.
    ///
    /// `Ok(None)` means the strategy had enough data and did not fire.
    fn evaluate(
        &self,
        candles: &[Candle],
        index: usize,
        indicators: &IndicatorSeries,
    ) -> Result<Option<SignalCandidate>, StrategyError>;
}

/// Common precondition: index in range, enough bars, finite price/volume at
/// the current and previous bar.
pub(crate) fn check_window(
    candles: &[Candle],
    index: usize,
    min_bars: usize,
) -> Result<(), StrategyError> {
    if index >= candles.len() {
        return Err(StrategyError::IndexOutOfRange {
            index,
            len: candles.len(),
        });
    }
    let available = index + 1;
    if available < min_bars.max(2) {
        return Err(StrategyError::InsufficientData {
            required: min_bars.max(2),
            available,
        });
    }
    for i in [index - 1, index] {
        let c = &candles[i];
        if !c.close.is_finite() {
            return Err(StrategyError::NonFinite {
                field: "close",
                index: i,
            });
        }
        if !c.volume.is_finite() {
            return Err(StrategyError::NonFinite {
                field: "volume",
                index: i,
            });
        }
    }
    Ok(())
}

/// Build a candidate anchored at `candle`'s close.
pub(crate) fn candidate(
    candle: &Candle,
    direction: Direction,
    stop_loss: f64,
    target: f64,
    confidence: f64,
    rationale: String,
    strategy: &str,
) -> SignalCandidate {
    SignalCandidate {
        symbol: candle.symbol.clone(),
        direction,
        entry: candle.close,
        stop_loss,
        target,
        confidence,
        rationale,
        strategy: strategy.to_string(),
        timestamp: candle.timestamp,
    }
}

/// Names of the built-in strategies, for configuration and CLI selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Breakout,
    MeanReversion,
    VolumeSurge,
    MacdCrossover,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Breakout,
        StrategyKind::MeanReversion,
        StrategyKind::VolumeSurge,
        StrategyKind::MacdCrossover,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Breakout => "breakout",
            StrategyKind::MeanReversion => "mean_reversion",
            StrategyKind::VolumeSurge => "volume_surge",
            StrategyKind::MacdCrossover => "macd_crossover",
        }
    }

    /// Instantiate with default parameters.
    pub fn build(&self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Breakout => Box::new(Breakout::default()),
            StrategyKind::MeanReversion => Box::new(MeanReversion),
            StrategyKind::VolumeSurge => Box::new(VolumeSurge),
            StrategyKind::MacdCrossover => Box::new(MacdCrossover),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "unknown strategy '{0}' (expected breakout, mean_reversion, volume_surge or macd_crossover)"
)]
pub struct UnknownStrategy(pub String);

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// An explicit ordered list of strategies.
pub struct StrategySet {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Default for StrategySet {
    /// Breakout, MeanReversion, VolumeSurge, MacdCrossover.
    fn default() -> Self {
        Self::from_kinds(&StrategyKind::ALL)
    }
}

impl fmt::Debug for StrategySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|s| s.id()))
            .finish()
    }
}

impl StrategySet {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    pub fn from_kinds(kinds: &[StrategyKind]) -> Self {
        Self::new(kinds.iter().map(StrategyKind::build).collect())
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.id()).collect()
    }

    /// Run every strategy at `index`, in order.
    ///
    /// A failing strategy contributes no signal: insufficient data is logged at
    /// debug level, any other error as a warning.
    pub fn evaluate_at(
        &self,
        candles: &[Candle],
        index: usize,
        indicators: &IndicatorSeries,
    ) -> Vec<SignalCandidate> {
        let mut candidates = Vec::new();
        for strategy in &self.strategies {
            match strategy.evaluate(candles, index, indicators) {
                Ok(Some(signal)) => {
                    debug!(
                        strategy = strategy.id(),
                        direction = %signal.direction,
                        entry = signal.entry,
                        "strategy fired"
                    );
                    candidates.push(signal);
                }
                Ok(None) => {}
                Err(err @ StrategyError::InsufficientData { .. }) => {
                    debug!(strategy = strategy.id(), %err, "strategy skipped");
                }
                Err(err) => {
                    warn!(strategy = strategy.id(), %err, "strategy failed, treating as no signal");
                }
            }
        }
        candidates
    }

    /// Run every strategy at the last candle.
    pub fn evaluate_latest(
        &self,
        candles: &[Candle],
        indicators: &IndicatorSeries,
    ) -> Vec<SignalCandidate> {
        match candles.len() {
            0 => Vec::new(),
            n => self.evaluate_at(candles, n - 1, indicators),
        }
    }
}
