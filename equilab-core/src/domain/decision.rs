//! Decision types, the terminal output of an analysis cycle.

use super::signal::{Direction, SizedSignal};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal action for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl From<Direction> for Action {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Buy => Action::Buy,
            Direction::Sell => Action::Sell,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

/// Volatility regime bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bucket an annualized volatility: < 20% low, < 40% medium, else high.
    pub fn from_volatility(annualized: f64) -> Self {
        if annualized < 0.20 {
            RiskLevel::Low
        } else if annualized < 0.40 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

/// Outcome of the risk checks for the candidate that reached the sizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDecision {
    pub approved: bool,
    pub signal: Option<SizedSignal>,
    pub reason: String,
    pub risk_level: RiskLevel,
    pub volatility: f64,
}

impl RiskDecision {
    pub fn rejected(reason: impl Into<String>, risk_level: RiskLevel, volatility: f64) -> Self {
        Self {
            approved: false,
            signal: None,
            reason: reason.into(),
            risk_level,
            volatility,
        }
    }
}

/// The final call for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    /// Present only for `buy`/`sell`.
    pub signal: Option<SizedSignal>,
}

impl Decision {
    pub fn hold() -> Self {
        Self {
            action: Action::Hold,
            signal: None,
        }
    }

    pub fn trade(signal: SizedSignal) -> Self {
        Self {
            action: signal.signal.direction.into(),
            signal: Some(signal),
        }
    }

    pub fn is_hold(&self) -> bool {
        self.action == Action::Hold
    }
}
