//! Backtester — point-in-time walk of one strategy over one symbol.
//!
//! Indicators are precomputed once over the full series. Every indicator is
//! causal, so reading bar `i` of the precomputed series is identical to
//! recomputing on `candles[..=i]`; the strategy itself is handed the full slice
//! but only reads `[0..=i]`.
//!
//! Long-only, all-in: a BUY while flat deploys `deploy_fraction` of cash at the
//! bar's close; a SELL while long closes the whole position at the close.

pub mod metrics;

use crate::domain::{
    validate_series, BacktestTrade, Candle, Direction, EquityPoint, InvalidCandle, OpenPosition,
};
use crate::indicators::IndicatorSeries;
use crate::strategies::{Strategy, StrategyError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// First bar index the strategy is evaluated on.
    pub warmup: usize,
    /// Fraction of cash deployed on entry.
    pub deploy_fraction: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            warmup: 50,
            deploy_fraction: 0.99,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BacktestError {
    #[error("no candles to backtest")]
    EmptySeries,

    #[error(transparent)]
    InvalidCandle(#[from] InvalidCandle),

    #[error("invalid backtest config: {0}")]
    InvalidConfig(String),
}

/// Outcome of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub strategy: String,
    pub symbol: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub initial_capital: f64,
    pub final_equity: f64,
    pub trades: Vec<BacktestTrade>,
    pub equity_curve: Vec<EquityPoint>,
    /// Closed round trips.
    pub total_trades: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub profit_factor: f64,
    pub sharpe_ratio: f64,
    /// Longest run of closed trades that did not make money.
    pub max_consecutive_losses: usize,
    pub open_position: Option<OpenPosition>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Backtester {
    pub config: BacktestConfig,
}

struct Holding {
    entry_bar: usize,
    entry_time: DateTime<Utc>,
    entry_price: f64,
    shares: f64,
}

impl Backtester {
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn run(
        &self,
        candles: &[Candle],
        strategy: &dyn Strategy,
    ) -> Result<BacktestReport, BacktestError> {
        let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
            return Err(BacktestError::EmptySeries);
        };
        validate_series(candles)?;
        let cfg = self.config;
        if !cfg.initial_capital.is_finite() || cfg.initial_capital <= 0.0 {
            return Err(BacktestError::InvalidConfig(format!(
                "initial_capital must be positive, got {}",
                cfg.initial_capital
            )));
        }
        if !(cfg.deploy_fraction > 0.0 && cfg.deploy_fraction <= 1.0) {
            return Err(BacktestError::InvalidConfig(format!(
                "deploy_fraction must be in (0, 1], got {}",
                cfg.deploy_fraction
            )));
        }

        let indicators = IndicatorSeries::compute(candles);
        let mut cash = cfg.initial_capital;
        let mut holding: Option<Holding> = None;
        let mut trades = Vec::new();
        let mut equity_curve = Vec::with_capacity(candles.len().saturating_sub(cfg.warmup));

        for (i, candle) in candles.iter().enumerate().skip(cfg.warmup) {
            let price = candle.close;
            let signal = match strategy.evaluate(candles, i, &indicators) {
                Ok(signal) => signal,
                Err(err @ StrategyError::InsufficientData { .. }) => {
                    debug!(strategy = strategy.id(), bar = i, %err, "strategy skipped");
                    None
                }
                Err(err) => {
                    warn!(
                        strategy = strategy.id(),
                        bar = i,
                        %err,
                        "strategy failed, treating as no signal"
                    );
                    None
                }
            };

            match (signal.map(|s| s.direction), holding.as_ref()) {
                (Some(Direction::Buy), None) => {
                    let shares = cash * cfg.deploy_fraction / price;
                    cash -= shares * price;
                    debug!(bar = i, price, shares, "open long");
                    holding = Some(Holding {
                        entry_bar: i,
                        entry_time: candle.timestamp,
                        entry_price: price,
                        shares,
                    });
                }
                (Some(Direction::Sell), Some(open)) => {
                    let exit_value = open.shares * price;
                    cash += exit_value;
                    let pnl = exit_value - open.shares * open.entry_price;
                    debug!(bar = i, price, pnl, "close long");
                    trades.push(BacktestTrade {
                        symbol: candle.symbol.clone(),
                        entry_bar: open.entry_bar,
                        entry_time: open.entry_time,
                        entry_price: open.entry_price,
                        exit_bar: i,
                        exit_time: candle.timestamp,
                        exit_price: price,
                        shares: open.shares,
                        pnl,
                    });
                    holding = None;
                }
                // BUY while long, SELL while flat, or no signal
                _ => {}
            }

            let shares = holding.as_ref().map_or(0.0, |h| h.shares);
            equity_curve.push(EquityPoint {
                timestamp: candle.timestamp,
                equity: cash + shares * price,
            });
        }

        let final_equity = equity_curve
            .last()
            .map_or(cfg.initial_capital, |p| p.equity);
        let equity_values: Vec<f64> = std::iter::once(cfg.initial_capital)
            .chain(equity_curve.iter().map(|p| p.equity))
            .collect();

        let open_position = holding.map(|h| OpenPosition {
            entry_bar: h.entry_bar,
            entry_time: h.entry_time,
            entry_price: h.entry_price,
            shares: h.shares,
            unrealized_pnl: h.shares * (last.close - h.entry_price),
        });

        let report = BacktestReport {
            strategy: strategy.id().to_string(),
            symbol: first.symbol.clone(),
            start: first.timestamp,
            end: last.timestamp,
            initial_capital: cfg.initial_capital,
            final_equity,
            total_trades: trades.len(),
            win_rate: metrics::win_rate(&trades),
            total_pnl: final_equity - cfg.initial_capital,
            total_return: metrics::total_return(cfg.initial_capital, final_equity),
            max_drawdown: metrics::max_drawdown(cfg.initial_capital, &equity_values[1..]),
            profit_factor: metrics::profit_factor(&trades),
            sharpe_ratio: metrics::sharpe_ratio(&equity_values),
            max_consecutive_losses: metrics::max_consecutive_losses(&trades),
            trades,
            equity_curve,
            open_position,
        };
        info!(
            strategy = %report.strategy,
            symbol = %report.symbol,
            trades = report.total_trades,
            total_return = report.total_return,
            "backtest complete"
        );
        Ok(report)
    }
}
