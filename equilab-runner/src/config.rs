//! Serializable runner configuration.
//!
//! Every section carries defaults, so an empty TOML file is a valid config:
//!
//! ```toml
//! [account]
//! account_size = 100000.0
//! current_exposure = 0.0
//!
//! [risk]
//! risk_pct = 1.0
//! max_exposure = 100000.0
//! atr_stop_multiplier = 1.5
//!
//! [sentiment]
//! buy_veto_below = -0.2
//! sell_veto_above = 0.2
//!
//! [levels]
//! window = 5
//! threshold = 0.02
//!
//! [backtest]
//! initial_capital = 100000.0
//! warmup = 50
//! deploy_fraction = 0.99
//! ```

use std::path::Path;

use equilab_core::analysis::Analyzer;
use equilab_core::arbiter::{AccountState, DecisionArbiter, SentimentGate};
use equilab_core::backtest::{BacktestConfig, Backtester};
use equilab_core::levels::LevelDetector;
use equilab_core::risk::{RiskPolicy, RiskSizer};
use equilab_core::strategies::{Breakout, Strategy, StrategyKind, StrategySet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content hash of a config, used to tag exported reports.
pub type ConfigFingerprint = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub account: AccountState,
    pub risk: RiskPolicy,
    pub sentiment: SentimentGate,
    pub levels: LevelDetector,
    pub backtest: BacktestConfig,
}

impl RunnerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make sizing or level detection meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("account.account_size", self.account.account_size),
            ("risk.risk_pct", self.risk.risk_pct),
            ("backtest.initial_capital", self.backtest.initial_capital),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{field} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("account.current_exposure", self.account.current_exposure),
            ("risk.max_exposure", self.risk.max_exposure),
            ("risk.atr_stop_multiplier", self.risk.atr_stop_multiplier),
            ("levels.threshold", self.levels.threshold),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{field} must be non-negative, got {value}"
                )));
            }
        }
        if self.levels.window == 0 {
            return Err(ConfigError::Invalid("levels.window must be at least 1".into()));
        }
        let gate = self.sentiment;
        if !gate.buy_veto_below.is_finite() || !gate.sell_veto_above.is_finite() {
            return Err(ConfigError::Invalid("sentiment thresholds must be finite".into()));
        }
        if !(self.backtest.deploy_fraction > 0.0 && self.backtest.deploy_fraction <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "backtest.deploy_fraction must be in (0, 1], got {}",
                self.backtest.deploy_fraction
            )));
        }
        Ok(())
    }

    /// Deterministic BLAKE3 hash over the canonical JSON form.
    ///
    /// Two configs that deserialize to the same values share a fingerprint
    /// regardless of key order or comments in the source TOML.
    pub fn fingerprint(&self) -> ConfigFingerprint {
        // Serializing plain structs of numbers cannot fail; fall back to Debug
        // so the fingerprint stays total.
        let canonical = serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }

    /// Analyzer wired with this config's levels, gate and risk policy.
    pub fn analyzer(&self) -> Analyzer {
        let strategies = StrategySet::new(vec![
            Box::new(Breakout::new(self.levels)),
            StrategyKind::MeanReversion.build(),
            StrategyKind::VolumeSurge.build(),
            StrategyKind::MacdCrossover.build(),
        ]);
        Analyzer::new(
            strategies,
            self.levels,
            DecisionArbiter::new(self.sentiment, RiskSizer::new(self.risk)),
        )
    }

    pub fn backtester(&self) -> Backtester {
        Backtester::new(self.backtest)
    }

    /// Builds a strategy, threading configured level detection into breakout.
    pub fn strategy(&self, kind: StrategyKind) -> Box<dyn Strategy> {
        match kind {
            StrategyKind::Breakout => Box::new(Breakout::new(self.levels)),
            other => other.build(),
        }
    }
}
