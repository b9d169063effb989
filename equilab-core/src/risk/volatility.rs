//! Annualized close-to-close volatility and the risk level it maps to.

use crate::domain::{Candle, RiskLevel};
use serde::{Deserialize, Serialize};

const TRADING_DAYS: f64 = 252.0;

/// Sample standard deviation of percentage returns × √252.
///
/// `None` with fewer than two returns (three closes).
pub fn annualized_volatility(candles: &[Candle]) -> Option<f64> {
    let returns: Vec<f64> = candles
        .windows(2)
        .filter(|w| w[0].close != 0.0)
        .map(|w| w[1].close / w[0].close - 1.0)
        .filter(|r| r.is_finite())
        .collect();
    if returns.len() < 2 {
        return None;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt() * TRADING_DAYS.sqrt())
}

/// Volatility and its bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityProfile {
    pub volatility: f64,
    pub risk_level: RiskLevel,
}

impl VolatilityProfile {
    /// Too little history reports zero volatility at medium risk.
    pub fn from_candles(candles: &[Candle]) -> Self {
        match annualized_volatility(candles) {
            Some(volatility) => Self {
                volatility,
                risk_level: RiskLevel::from_volatility(volatility),
            },
            None => Self {
                volatility: 0.0,
                risk_level: RiskLevel::Medium,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    #[test]
    fn short_history_is_medium() {
        let profile = VolatilityProfile::from_candles(&make_candles(&[100.0, 101.0]));
        assert_eq!(profile.volatility, 0.0);
        assert_eq!(profile.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn flat_prices_are_low_risk() {
        let profile = VolatilityProfile::from_candles(&make_candles(&[50.0; 30]));
        assert_eq!(profile.volatility, 0.0);
        assert_eq!(profile.risk_level, RiskLevel::Low);
    }

    #[test]
    fn alternating_prices_are_high_risk() {
        // returns alternate +10% / -9.09%
        let closes: Vec<f64> = (0..30)
            .map(|i| if i % 2 == 0 { 100.0 } else { 110.0 })
            .collect();
        let profile = VolatilityProfile::from_candles(&make_candles(&closes));
        assert!(profile.volatility > 1.0);
        assert_eq!(profile.risk_level, RiskLevel::High);
    }

    #[test]
    fn matches_hand_computation() {
        // returns: +1%, -1%, +1%
        let closes = [100.0, 101.0, 99.99, 100.9899];
        let vol = annualized_volatility(&make_candles(&closes)).unwrap();
        let r = [0.01, 99.99 / 101.0 - 1.0, 100.9899 / 99.99 - 1.0];
        let mean = r.iter().sum::<f64>() / 3.0;
        let var = r.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 2.0;
        assert!((vol - var.sqrt() * 252f64.sqrt()).abs() < 1e-12);
    }
}
