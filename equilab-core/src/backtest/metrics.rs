//! Performance metrics — pure functions that compute backtest statistics.
//!
//! Every metric is a pure function: equity values and/or trade list in, scalar out.

use crate::domain::BacktestTrade;

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(initial_capital: f64, final_equity: f64) -> f64 {
    if initial_capital <= 0.0 {
        return 0.0;
    }
    (final_equity - initial_capital) / initial_capital
}

/// Maximum drawdown as a non-positive fraction (e.g., -0.15 = 15% drawdown).
///
/// The running peak starts at `initial_capital`, so a first-bar loss counts.
pub fn max_drawdown(initial_capital: f64, equity_curve: &[f64]) -> f64 {
    let mut peak = initial_capital;
    let mut max_dd = 0.0_f64;

    for &eq in std::iter::once(&initial_capital).chain(equity_curve) {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Win rate: fraction of closed trades with positive pnl.
pub fn win_rate(trades: &[BacktestTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Profit factor: gross profits / gross losses.
///
/// Capped at 100.0 for edge cases (all winners, zero losses).
pub fn profit_factor(trades: &[BacktestTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl < 0.0)
        .map(|t| t.pnl.abs())
        .sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

/// Annualized Sharpe ratio from daily returns, zero risk-free rate.
///
/// Returns 0.0 if variance is zero or fewer than 2 returns.
pub fn sharpe_ratio(equity_curve: &[f64]) -> f64 {
    let returns = daily_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(&returns);
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * (252.0_f64).sqrt()
}

/// Longest run of consecutive losing trades.
pub fn max_consecutive_losses(trades: &[BacktestTrade]) -> usize {
    let mut max_streak = 0;
    let mut current = 0;
    for trade in trades {
        if trade.is_winner() {
            current = 0;
        } else {
            current += 1;
            max_streak = max_streak.max(current);
        }
    }
    max_streak
}

pub fn daily_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
