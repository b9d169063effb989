//! Risk sizing — position size, exposure limit, and the ATR stop guard.
//!
//! Rejections are values, never panics: [`RiskSizer::evaluate`] returns either a
//! [`SizedSignal`] or a [`RiskRejection`] whose message is the reason reported
//! to the caller.

pub mod volatility;

pub use volatility::{annualized_volatility, VolatilityProfile};

use crate::domain::{Direction, SignalCandidate, SizedSignal};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Reason text attached to an approved signal.
pub const APPROVED_REASON: &str = "Risk checks passed";

/// Risk parameters applied to every candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    /// Percent of the account put at risk per trade (1.0 = 1%).
    pub risk_pct: f64,
    /// Ceiling on total position value across the account.
    pub max_exposure: f64,
    /// Stops tighter than one ATR are widened to this many ATRs.
    pub atr_stop_multiplier: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            risk_pct: 1.0,
            max_exposure: 100_000.0,
            atr_stop_multiplier: 1.5,
        }
    }
}

/// Why the sizer refused a candidate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskRejection {
    #[error("Signal missing entry or stop loss")]
    InvalidRiskInput,

    #[error("Max exposure limit exceeded")]
    ExposureExceeded { current: f64, new_value: f64, max: f64 },

    #[error("Invalid stop loss or calculation error")]
    InvalidPositionSize,
}

/// `(account × risk_pct / 100) / |entry − stop|`; zero when entry equals stop.
pub fn position_size(account_size: f64, risk_pct: f64, entry: f64, stop: f64) -> f64 {
    let risk_per_share = (entry - stop).abs();
    if risk_per_share <= 0.0 {
        return 0.0;
    }
    account_size * (risk_pct / 100.0) / risk_per_share
}

/// Whether adding `new_value` keeps total exposure at or under `max`.
pub fn exposure_ok(current: f64, max: f64, new_value: f64) -> bool {
    current + new_value <= max
}

/// Widen a stop that sits closer than one ATR to `multiplier` ATRs from entry.
/// Returns the stop unchanged when ATR is unavailable or the stop is wide enough.
pub fn widen_stop(
    direction: Direction,
    entry: f64,
    stop: f64,
    atr: Option<f64>,
    multiplier: f64,
) -> f64 {
    let Some(atr) = atr.filter(|a| a.is_finite() && *a > 0.0) else {
        return stop;
    };
    if (entry - stop).abs() >= atr {
        return stop;
    }
    match direction {
        Direction::Buy => entry - multiplier * atr,
        Direction::Sell => entry + multiplier * atr,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskSizer {
    pub policy: RiskPolicy,
}

impl RiskSizer {
    pub fn new(policy: RiskPolicy) -> Self {
        Self { policy }
    }

    /// Size one candidate.
    ///
    /// Check order: missing input, ATR guard, size, exposure limit, non-positive size.
    pub fn evaluate(
        &self,
        candidate: &SignalCandidate,
        account_size: f64,
        current_exposure: f64,
        atr: Option<f64>,
    ) -> Result<SizedSignal, RiskRejection> {
        let entry = candidate.entry;
        let stop = candidate.stop_loss;
        if !entry.is_finite() || !stop.is_finite() || entry <= 0.0 || stop <= 0.0 {
            return Err(RiskRejection::InvalidRiskInput);
        }

        let stop = widen_stop(
            candidate.direction,
            entry,
            stop,
            atr,
            self.policy.atr_stop_multiplier,
        );
        if stop != candidate.stop_loss {
            debug!(
                symbol = %candidate.symbol,
                original = candidate.stop_loss,
                widened = stop,
                "stop tighter than one ATR, widened"
            );
        }

        let size = position_size(account_size, self.policy.risk_pct, entry, stop);
        let value = size * entry;

        if !exposure_ok(current_exposure, self.policy.max_exposure, value) {
            return Err(RiskRejection::ExposureExceeded {
                current: current_exposure,
                new_value: value,
                max: self.policy.max_exposure,
            });
        }
        if !size.is_finite() || size <= 0.0 {
            return Err(RiskRejection::InvalidPositionSize);
        }

        let mut signal = candidate.clone();
        signal.stop_loss = stop;
        Ok(SizedSignal {
            signal,
            position_size: size,
            position_value: value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candidate(direction: Direction, entry: f64, stop: f64) -> SignalCandidate {
        SignalCandidate {
            symbol: "NVDA".into(),
            direction,
            entry,
            stop_loss: stop,
            target: entry * 1.1,
            confidence: 0.8,
            rationale: "test".into(),
            strategy: "breakout".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn position_size_reference_values() {
        assert_eq!(position_size(10_000.0, 1.0, 150.0, 140.0), 10.0);
        assert_eq!(position_size(10_000.0, 1.0, 140.0, 150.0), 10.0);
        assert_eq!(position_size(10_000.0, 1.0, 150.0, 150.0), 0.0);
    }

    #[test]
    fn exposure_limit() {
        assert!(!exposure_ok(99_000.0, 100_000.0, 1_500.0));
        assert!(exposure_ok(98_500.0, 100_000.0, 1_500.0));
    }

    #[test]
    fn approves_and_sizes() {
        let sizer = RiskSizer::default();
        let sized = sizer
            .evaluate(&candidate(Direction::Buy, 150.0, 140.0), 10_000.0, 0.0, None)
            .unwrap();
        assert_eq!(sized.position_size, 10.0);
        assert_eq!(sized.position_value, 1_500.0);
        assert_eq!(sized.signal.stop_loss, 140.0);
    }

    #[test]
    fn rejects_when_exposure_exceeded() {
        let sizer = RiskSizer::default();
        let err = sizer
            .evaluate(
                &candidate(Direction::Buy, 150.0, 140.0),
                10_000.0,
                99_000.0,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, RiskRejection::ExposureExceeded { .. }));
        assert!(err.to_string().contains("exceeded"));
    }

    #[test]
    fn rejects_missing_input() {
        let sizer = RiskSizer::default();
        for (entry, stop) in [(0.0, 10.0), (10.0, 0.0), (f64::NAN, 5.0), (5.0, -1.0)] {
            let err = sizer
                .evaluate(&candidate(Direction::Buy, entry, stop), 10_000.0, 0.0, None)
                .unwrap_err();
            assert_eq!(err, RiskRejection::InvalidRiskInput);
            assert_eq!(err.to_string(), "Signal missing entry or stop loss");
        }
    }

    #[test]
    fn rejects_zero_size() {
        let err = RiskSizer::default()
            .evaluate(&candidate(Direction::Buy, 100.0, 100.0), 10_000.0, 0.0, None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid stop loss or calculation error");
    }

    #[test]
    fn widens_tight_stops_by_direction() {
        assert_eq!(widen_stop(Direction::Buy, 100.0, 99.0, Some(2.0), 1.5), 97.0);
        assert_eq!(widen_stop(Direction::Sell, 100.0, 101.0, Some(2.0), 1.5), 103.0);
        // already wider than one ATR
        assert_eq!(widen_stop(Direction::Buy, 100.0, 95.0, Some(2.0), 1.5), 95.0);
        assert_eq!(widen_stop(Direction::Buy, 100.0, 99.0, None, 1.5), 99.0);
        assert_eq!(widen_stop(Direction::Buy, 100.0, 99.0, Some(f64::NAN), 1.5), 99.0);
    }

    #[test]
    fn widened_stop_feeds_sizing() {
        let sized = RiskSizer::default()
            .evaluate(
                &candidate(Direction::Buy, 100.0, 99.0),
                10_000.0,
                0.0,
                Some(2.0),
            )
            .unwrap();
        assert_eq!(sized.signal.stop_loss, 97.0);
        // 100 / 3
        assert!((sized.position_size - 100.0 / 3.0).abs() < 1e-9);
    }
}
