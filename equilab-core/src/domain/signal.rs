//! What strategies propose and what the risk sizer returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// A candidate trade proposed by one strategy at one bar.
///
/// Confidence is a fixed constant per strategy; it is informational and never
/// consulted by the sentiment gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalCandidate {
    pub symbol: String,
    pub direction: Direction,
    pub entry: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub confidence: f64,
    pub rationale: String,
    pub strategy: String,
    pub timestamp: DateTime<Utc>,
}

/// A candidate after risk sizing: the stop may have been widened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedSignal {
    #[serde(flatten)]
    pub signal: SignalCandidate,
    pub position_size: f64,
    pub position_value: f64,
}
