//! Decision arbiter — sentiment gate, then the risk sizer, yielding one decision.

use crate::domain::{Candle, Decision, Direction, RiskDecision, SignalCandidate};
use crate::risk::{RiskSizer, VolatilityProfile, APPROVED_REASON};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Reason given when no candidate survives the gate.
pub const NO_SURVIVORS_REASON: &str = "All signals rejected by sentiment or no signals found";

/// Prefix on the reasoning when the last surviving candidate failed risk sizing.
pub const RISK_REJECTION_PREFIX: &str = "Trade Rejected by Risk: ";

/// Hard sentiment veto. Candidate confidence is never consulted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentGate {
    /// BUY candidates are rejected when sentiment is below this.
    pub buy_veto_below: f64,
    /// SELL candidates are rejected when sentiment is above this.
    pub sell_veto_above: f64,
}

impl Default for SentimentGate {
    fn default() -> Self {
        Self {
            buy_veto_below: -0.2,
            sell_veto_above: 0.2,
        }
    }
}

impl SentimentGate {
    /// Clamp to [-1, 1]; non-finite scores are treated as neutral.
    pub fn normalize(score: f64) -> f64 {
        if score.is_finite() {
            score.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn admits(&self, direction: Direction, sentiment: f64) -> bool {
        match direction {
            Direction::Buy => sentiment >= self.buy_veto_below,
            Direction::Sell => sentiment <= self.sell_veto_above,
        }
    }
}

/// Account figures the sizer works against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountState {
    pub account_size: f64,
    pub current_exposure: f64,
}

impl Default for AccountState {
    fn default() -> Self {
        Self {
            account_size: 100_000.0,
            current_exposure: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbiterOutcome {
    pub decision: Decision,
    pub risk: RiskDecision,
    pub reasoning: String,
    /// Candidates examined before the decision was reached.
    pub candidates_considered: usize,
    pub sentiment: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionArbiter {
    pub gate: SentimentGate,
    pub sizer: RiskSizer,
}

impl DecisionArbiter {
    pub fn new(gate: SentimentGate, sizer: RiskSizer) -> Self {
        Self { gate, sizer }
    }

    /// Walk `candidates` in order and return the first one that passes both the
    /// sentiment gate and the risk sizer, or `hold`.
    ///
    /// `candles` feed the volatility profile; `atr14` is the latest ATR for the
    /// stop guard (`None` during warmup).
    pub fn decide(
        &self,
        candidates: &[SignalCandidate],
        sentiment: f64,
        account: AccountState,
        candles: &[Candle],
        atr14: Option<f64>,
    ) -> ArbiterOutcome {
        let sentiment = SentimentGate::normalize(sentiment);
        let profile = VolatilityProfile::from_candles(candles);
        let atr = atr14.filter(|a| a.is_finite());

        let mut last_rejection: Option<String> = None;
        let mut considered = 0;

        for candidate in candidates {
            considered += 1;
            if !self.gate.admits(candidate.direction, sentiment) {
                info!(
                    symbol = %candidate.symbol,
                    strategy = %candidate.strategy,
                    direction = %candidate.direction,
                    sentiment,
                    "candidate vetoed by sentiment"
                );
                continue;
            }

            match self.sizer.evaluate(
                candidate,
                account.account_size,
                account.current_exposure,
                atr,
            ) {
                Ok(sized) => {
                    let reasoning = format!(
                        "Trade approved. {}. Sentiment: {sentiment:.2}",
                        candidate.rationale
                    );
                    info!(
                        symbol = %candidate.symbol,
                        strategy = %candidate.strategy,
                        direction = %candidate.direction,
                        size = sized.position_size,
                        "trade approved"
                    );
                    return ArbiterOutcome {
                        decision: Decision::trade(sized.clone()),
                        risk: RiskDecision {
                            approved: true,
                            signal: Some(sized),
                            reason: APPROVED_REASON.to_string(),
                            risk_level: profile.risk_level,
                            volatility: profile.volatility,
                        },
                        reasoning,
                        candidates_considered: considered,
                        sentiment,
                    };
                }
                Err(rejection) => {
                    debug!(
                        symbol = %candidate.symbol,
                        strategy = %candidate.strategy,
                        %rejection,
                        "candidate rejected by risk sizer"
                    );
                    last_rejection = Some(rejection.to_string());
                }
            }
        }

        let (reason, reasoning) = match last_rejection {
            Some(rejection) => (rejection.clone(), format!("{RISK_REJECTION_PREFIX}{rejection}")),
            None => (NO_SURVIVORS_REASON.to_string(), NO_SURVIVORS_REASON.to_string()),
        };
        info!(candidates = candidates.len(), %reason, "holding");
        ArbiterOutcome {
            decision: Decision::hold(),
            risk: RiskDecision::rejected(reason, profile.risk_level, profile.volatility),
            reasoning,
            candidates_considered: considered,
            sentiment,
        }
    }
}
