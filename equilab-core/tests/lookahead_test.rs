//! Look-ahead contamination tests.
//!
//! Invariant: no value at bar t may depend on price data from bar t+1 or later.
//!
//! Method: compute on a truncated series (bars 0..150) and the full series
//! (bars 0..300). Bars 0..150 must be identical between both runs. Any
//! difference means future data is leaking into past values.

use chrono::{Duration, TimeZone, Utc};
use equilab_core::domain::Candle;
use equilab_core::indicators::*;
use equilab_core::strategies::StrategyKind;

/// Generate N candles of synthetic OHLCV data with realistic variation.
fn make_test_candles(n: usize) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let mut candles = Vec::with_capacity(n);
    let mut price = 100.0;

    for i in 0..n {
        // Deterministic pseudo-random walk using a simple LCG
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
        let change = ((seed % 200) as f64 - 100.0) * 0.05; // -5.0 to +5.0
        price += change;
        price = price.max(10.0);

        let open = price - 0.5;
        let close = price + 0.3;
        let high = open.max(close) + 2.0;
        let low = open.min(close) - 2.0;
        let volume = 1000.0 + ((seed >> 7) % 5000) as f64;

        candles.push(Candle::new(
            "TEST",
            base + Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume,
        ));
    }

    candles
}

fn assert_series_match(name: &str, truncated: &[f64], full: &[f64]) {
    for (i, (&t, &f)) in truncated.iter().zip(full).enumerate() {
        if t.is_nan() && f.is_nan() {
            continue;
        }
        assert!(
            !t.is_nan() && !f.is_nan(),
            "{name}: NaN mismatch at bar {i} (truncated={t}, full={f})"
        );
        assert!(
            (t - f).abs() < 1e-10,
            "{name}: look-ahead at bar {i}: truncated={t}, full={f}"
        );
    }
}

/// Assert that the indicator produces identical values for bars 0..truncated_len
/// whether computed on a truncated or full series.
fn assert_no_lookahead(indicator: &dyn Indicator, full: &[Candle], truncated_len: usize) {
    let truncated_result = indicator.compute(&full[..truncated_len]);
    let full_result = indicator.compute(full);

    assert_eq!(truncated_result.len(), truncated_len, "{}", indicator.name());
    assert_eq!(full_result.len(), full.len(), "{}", indicator.name());
    assert_series_match(indicator.name(), &truncated_result, &full_result);
}

#[test]
fn every_indicator_is_causal() {
    let candles = make_test_candles(300);
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Sma::new(20)),
        Box::new(Sma::new(50)),
        Box::new(Sma::new(200)),
        Box::new(Sma::volume(20)),
        Box::new(Ema::new(9)),
        Box::new(Ema::new(20)),
        Box::new(Rsi::new(14)),
        Box::new(Atr::new(14)),
        Box::new(Vwap::new()),
        Box::new(Bollinger::upper(20, 2.0)),
        Box::new(Bollinger::middle(20, 2.0)),
        Box::new(Bollinger::lower(20, 2.0)),
        Box::new(Macd::standard(MacdLine::Line)),
        Box::new(Macd::standard(MacdLine::Signal)),
        Box::new(Macd::standard(MacdLine::Histogram)),
    ];
    for indicator in &indicators {
        assert_no_lookahead(indicator.as_ref(), &candles, 150);
    }
}

#[test]
fn warmup_length_matches_lookback() {
    let candles = make_test_candles(300);
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Sma::new(50)),
        Box::new(Ema::new(20)),
        Box::new(Rsi::new(14)),
        Box::new(Atr::new(14)),
        Box::new(Bollinger::lower(20, 2.0)),
        Box::new(Macd::standard(MacdLine::Histogram)),
    ];
    for indicator in &indicators {
        let out = indicator.compute(&candles);
        let lb = indicator.lookback();
        assert!(
            out[..lb].iter().all(|v| v.is_nan()),
            "{} defined before its lookback",
            indicator.name()
        );
        assert!(
            out[lb..].iter().all(|v| v.is_finite()),
            "{} undefined after its lookback",
            indicator.name()
        );
    }
}

#[test]
fn precomputed_series_equals_prefix_recomputation() {
    let candles = make_test_candles(260);
    let full = IndicatorSeries::compute(&candles);
    for end in [1, 20, 34, 120, 199, 200, 259] {
        let prefix = IndicatorSeries::compute(&candles[..end]);
        for ((name, p), (_, f)) in prefix.named().into_iter().zip(full.named()) {
            assert_series_match(name, p, &f[..end]);
        }
        assert_eq!(prefix.latest(), full.snapshot(end - 1));
    }
}

#[test]
fn strategies_ignore_future_bars() {
    let candles = make_test_candles(300);
    let full = IndicatorSeries::compute(&candles);
    for kind in StrategyKind::ALL {
        let strategy = kind.build();
        for i in (60..150).step_by(7) {
            let prefix = &candles[..=i];
            let prefix_series = IndicatorSeries::compute(prefix);
            assert_eq!(
                strategy.evaluate(prefix, i, &prefix_series),
                strategy.evaluate(&candles, i, &full),
                "{kind} at bar {i} depends on future data"
            );
        }
    }
}
