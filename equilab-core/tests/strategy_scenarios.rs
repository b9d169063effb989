//! End-to-end strategy scenarios: hand-built candle series through the full
//! strategy set, the arbiter, and the analysis cycle.

use chrono::{Duration, TimeZone, Utc};
use equilab_core::domain::{Action, Candle, Direction};
use equilab_core::indicators::IndicatorSeries;
use equilab_core::strategies::{MeanReversion, Strategy, StrategySet};
use equilab_core::trend::Trend;
use equilab_core::{AccountState, AnalysisRequest, Analyzer, DecisionArbiter};

fn candles_from(rows: &[(f64, f64, f64, f64, f64)]) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    rows.iter()
        .enumerate()
        .map(|(i, &(o, h, l, c, v))| {
            Candle::new("ACME", base + Duration::days(i as i64), o, h, l, c, v)
        })
        .collect()
}

fn ascending_series() -> Vec<Candle> {
    let rows: Vec<_> = (0..50)
        .map(|i| {
            let b = 100.0 + i as f64;
            (b, b + 5.0, b - 5.0, b + 2.0, 1000.0)
        })
        .collect();
    candles_from(&rows)
}

fn breakout_series() -> Vec<Candle> {
    let mut rows: Vec<_> = (0..30)
        .map(|i| {
            let b = 100.0 + i as f64;
            (b, b + 5.0, b - 5.0, b + 2.0, 1000.0)
        })
        .collect();
    rows.extend((30..49).map(|i| {
        let b = 128.0 - (i - 30) as f64;
        (b, b + 5.0, b - 5.0, b + 2.0, 1000.0)
    }));
    rows.push((112.0, 140.0, 111.0, 138.0, 2500.0));
    candles_from(&rows)
}

#[test]
fn ascending_series_has_no_mean_reversion_signal() {
    let candles = ascending_series();
    let indicators = IndicatorSeries::compute(&candles);
    assert_eq!(MeanReversion.evaluate(&candles, 49, &indicators), Ok(None));
}

#[test]
fn breakout_series_yields_exactly_one_breakout_buy() {
    let candles = breakout_series();
    let indicators = IndicatorSeries::compute(&candles);
    let candidates = StrategySet::default().evaluate_at(&candles, 49, &indicators);

    let breakouts: Vec<_> = candidates
        .iter()
        .filter(|c| c.strategy == "breakout")
        .collect();
    assert_eq!(breakouts.len(), 1);
    let signal = breakouts[0];
    assert_eq!(signal.direction, Direction::Buy);
    assert_eq!(signal.symbol, "ACME");
    assert!(signal.stop_loss < 134.0, "stop must sit below the resistance");
    assert!(!candidates.iter().any(|c| c.strategy == "volume_surge"));
    assert!(!candidates.iter().any(|c| c.strategy == "mean_reversion"));
}

#[test]
fn breakout_is_silent_one_bar_earlier() {
    let mut candles = breakout_series();
    candles.pop();
    // extend by a quiet bar so the prefix still reaches fifty bars
    let last = candles[candles.len() - 1].clone();
    let mut quiet = last.clone();
    quiet.timestamp = last.timestamp + Duration::days(1);
    quiet.open = last.close;
    quiet.close = last.close - 1.0;
    quiet.high = quiet.open + 1.0;
    quiet.low = quiet.close - 1.0;
    candles.push(quiet);

    let indicators = IndicatorSeries::compute(&candles);
    let candidates = StrategySet::default().evaluate_at(&candles, 49, &indicators);
    assert!(!candidates.iter().any(|c| c.strategy == "breakout"));
}

#[test]
fn bearish_sentiment_vetoes_breakout_regardless_of_confidence() {
    let candles = breakout_series();
    let indicators = IndicatorSeries::compute(&candles);
    let buys: Vec<_> = StrategySet::default()
        .evaluate_at(&candles, 49, &indicators)
        .into_iter()
        .filter(|c| c.direction == Direction::Buy)
        .collect();
    assert!(!buys.is_empty());

    let outcome = DecisionArbiter::default().decide(
        &buys,
        -0.5,
        AccountState::default(),
        &candles,
        indicators.atr14(49),
    );
    assert_eq!(outcome.decision.action, Action::Hold);
    assert_eq!(
        outcome.reasoning,
        "All signals rejected by sentiment or no signals found"
    );
}

#[test]
fn full_cycle_on_long_uptrend() {
    let closes: Vec<f64> = (0..260).map(|i| 50.0 + 0.5 * i as f64).collect();
    let rows: Vec<_> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let o = if i == 0 { c } else { closes[i - 1] };
            (o, c + 1.0, o - 1.0, c, 10_000.0)
        })
        .collect();
    let request = AnalysisRequest {
        symbol: "ACME".into(),
        candles: candles_from(&rows),
        sentiment: 0.1,
        account: AccountState::default(),
    };

    let report = Analyzer::default().analyze(&request).unwrap();
    assert_eq!(report.trend.trend, Trend::Up);
    assert!(report.snapshot.sma200.is_some());
    assert!(report.snapshot.macd_histogram.is_some());
    assert_eq!(report.snapshot.rsi14, Some(100.0));
    assert!(!report.volume_spike.is_spike);
    assert!((report.market.current_price - 179.5).abs() < 1e-9);
    // a smooth ramp has no pivots
    assert!(report.levels.levels.is_empty());
}
