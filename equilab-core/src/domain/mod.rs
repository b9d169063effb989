//! Domain types for EquiLab

pub mod candle;
pub mod decision;
pub mod signal;
pub mod trade;

pub use candle::{validate_series, Candle, CandleError, InvalidCandle};
pub use decision::{Action, Decision, RiskDecision, RiskLevel};
pub use signal::{Direction, SignalCandidate, SizedSignal};
pub use trade::{BacktestTrade, EquityPoint, OpenPosition};
