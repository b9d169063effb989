//! Backtest records: realized trades, equity points, and the position left open.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A closed long round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestTrade {
    pub symbol: String,
    pub entry_bar: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_bar: usize,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub shares: f64,
    /// `exit_value − entry_cost`.
    pub pnl: f64,
}

impl BacktestTrade {
    pub fn entry_cost(&self) -> f64 {
        self.shares * self.entry_price
    }

    /// Return on the trade as a fraction of entry cost.
    pub fn return_pct(&self) -> f64 {
        let cost = self.entry_cost();
        if cost == 0.0 {
            return 0.0;
        }
        self.pnl / cost
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_bar.saturating_sub(self.entry_bar)
    }
}

/// Portfolio value after one visited bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

/// A long position still held when the walk ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub entry_bar: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub shares: f64,
    /// Marked at the final close.
    pub unrealized_pnl: f64,
}
