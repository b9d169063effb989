//! EquiLab Core — candles in, signals, decisions and backtest metrics out.
//!
//! This crate is the deterministic quantitative engine:
//! - Domain types (candles, signal candidates, decisions, trades)
//! - Indicator library precomputed once per cycle
//! - Support/resistance detection and trend classification
//! - Four strategies behind one `Strategy` trait
//! - Risk sizing and the sentiment-gated decision arbiter
//! - Point-in-time backtester
//!
//! No I/O and no shared mutable state: every call recomputes from the candles
//! it is given.

pub mod analysis;
pub mod arbiter;
pub mod backtest;
pub mod domain;
pub mod indicators;
pub mod levels;
pub mod risk;
pub mod strategies;
pub mod trend;

pub use analysis::{AnalysisError, AnalysisReport, AnalysisRequest, Analyzer};
pub use arbiter::{AccountState, ArbiterOutcome, DecisionArbiter, SentimentGate};
pub use backtest::{BacktestConfig, BacktestError, BacktestReport, Backtester};
pub use domain::{Action, Candle, Decision, Direction, SignalCandidate};
pub use levels::LevelDetector;
pub use risk::{RiskPolicy, RiskSizer};
pub use strategies::{Strategy, StrategyKind, StrategySet};
pub use trend::Trend;
