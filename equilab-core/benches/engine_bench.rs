//! Criterion benchmarks for EquiLab hot paths.
//!
//! Benchmarks:
//! 1. Indicator precompute (single indicator and the full series)
//! 2. Level detection (pivots + consolidation)
//! 3. Strategy set evaluation at the latest bar
//! 4. Backtest walk (one strategy over the whole series)
//! 5. Full analysis cycle

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use equilab_core::backtest::Backtester;
use equilab_core::domain::Candle;
use equilab_core::indicators::{Indicator, IndicatorSeries, Sma};
use equilab_core::levels::LevelDetector;
use equilab_core::strategies::{StrategyKind, StrategySet};
use equilab_core::{AccountState, AnalysisRequest, Analyzer};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_candles(n: usize) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            let open = close - 0.3;
            let volume = 1_000_000.0 + (i % 500) as f64 * 1_000.0;
            Candle::new(
                "BENCH",
                base + Duration::days(i as i64),
                open,
                close + 1.5,
                open - 1.5,
                close,
                volume,
            )
        })
        .collect()
}

// ── 1. Indicator Precompute ──────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_precompute");

    for &bar_count in &[252, 1260, 2520] {
        let candles = make_candles(bar_count);

        let sma = Sma::new(20);
        group.bench_with_input(BenchmarkId::new("sma_20", bar_count), &bar_count, |b, _| {
            b.iter(|| sma.compute(black_box(&candles)));
        });

        group.bench_with_input(
            BenchmarkId::new("full_series", bar_count),
            &bar_count,
            |b, _| {
                b.iter(|| IndicatorSeries::compute(black_box(&candles)));
            },
        );
    }

    group.finish();
}

// ── 2. Level Detection ───────────────────────────────────────────────

fn bench_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_detection");
    let detector = LevelDetector::default();

    for &bar_count in &[252, 1260] {
        let candles = make_candles(bar_count);
        group.bench_with_input(BenchmarkId::new("detect", bar_count), &bar_count, |b, _| {
            b.iter(|| detector.detect(black_box(&candles)));
        });
    }

    group.finish();
}

// ── 3. Strategy Set ──────────────────────────────────────────────────

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategy_set");
    let candles = make_candles(252);
    let indicators = IndicatorSeries::compute(&candles);
    let set = StrategySet::default();

    group.bench_function("evaluate_latest_252_bars", |b| {
        b.iter(|| set.evaluate_latest(black_box(&candles), black_box(&indicators)));
    });

    group.finish();
}

// ── 4. Backtest Walk ─────────────────────────────────────────────────

fn bench_backtest(c: &mut Criterion) {
    let mut group = c.benchmark_group("backtest");
    group.sample_size(20);
    let candles = make_candles(1260);
    let backtester = Backtester::default();

    for kind in StrategyKind::ALL {
        let strategy = kind.build();
        group.bench_with_input(BenchmarkId::new(kind.as_str(), 1260), &kind, |b, _| {
            b.iter(|| backtester.run(black_box(&candles), strategy.as_ref()));
        });
    }

    group.finish();
}

// ── 5. Analysis Cycle ────────────────────────────────────────────────

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis_cycle");
    let analyzer = Analyzer::default();
    let request = AnalysisRequest {
        symbol: "BENCH".into(),
        candles: make_candles(252),
        sentiment: 0.3,
        account: AccountState::default(),
    };

    group.bench_function("analyze_252_bars", |b| {
        b.iter(|| analyzer.analyze(black_box(&request)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_indicators,
    bench_levels,
    bench_strategies,
    bench_backtest,
    bench_analysis,
);
criterion_main!(benches);
