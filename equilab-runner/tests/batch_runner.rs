//! Integration tests for the runner: CSV files in, reports and artifacts out.

use std::path::{Path, PathBuf};

use equilab_core::domain::Action;
use equilab_core::strategies::StrategyKind;
use equilab_core::trend::Trend;
use equilab_runner::{
    analyze_many, backtest_many, import_json, save_analysis, save_backtest, AnalysisRun,
    BacktestRun, RunError, RunnerConfig,
};

/// Write a daily CSV whose closes follow `close_at(i)`.
fn write_series(dir: &Path, name: &str, bars: usize, close_at: impl Fn(usize) -> f64) -> PathBuf {
    let start = chrono::NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut body = String::from("timestamp,open,high,low,close,volume\n");
    let mut prev = close_at(0);
    for i in 0..bars {
        let close = close_at(i);
        let open = prev;
        prev = close;
        let volume = if i % 23 == 0 { 40_000.0 } else { 10_000.0 };
        body.push_str(&format!(
            "{},{open:.4},{:.4},{:.4},{close:.4},{volume}\n",
            start + chrono::Duration::days(i as i64),
            open.max(close) + 1.0,
            open.min(close) - 1.0,
        ));
    }
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn uptrend(i: usize) -> f64 {
    50.0 + 0.5 * i as f64
}

fn wave(i: usize) -> f64 {
    let t = i as f64;
    100.0 + 12.0 * (t / 8.0).sin() + 4.0 * (t / 2.5).cos()
}

#[test]
fn batch_analysis_isolates_failures_and_keeps_order() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_series(dir.path(), "acme.csv", 260, uptrend);
    let bad = dir.path().join("broken.csv");
    std::fs::write(
        &bad,
        "timestamp,open,high,low,close,volume\nnot-a-date,1,2,0.5,1.5,10\n",
    )
    .unwrap();
    let missing = dir.path().join("missing.csv");
    let wavy = write_series(dir.path(), "wave.csv", 120, wave);

    let paths = vec![good.clone(), bad.clone(), missing.clone(), wavy.clone()];
    let entries = analyze_many(&paths, 0.3, &RunnerConfig::default());

    assert_eq!(entries.len(), 4);
    let order: Vec<_> = entries.iter().map(|e| e.path.clone()).collect();
    assert_eq!(order, paths);

    let acme = entries[0].outcome.as_ref().unwrap();
    assert_eq!(acme.report.symbol, "ACME");
    assert_eq!(acme.report.bars, 260);
    assert_eq!(acme.report.trend.trend, Trend::Up);
    assert_eq!(acme.dataset_hash.len(), 64);

    assert!(matches!(entries[1].outcome, Err(RunError::Data(_))));
    assert!(matches!(entries[2].outcome, Err(RunError::Data(_))));

    let wave_run = entries[3].outcome.as_ref().unwrap();
    assert_eq!(wave_run.report.symbol, "WAVE");
    // 120 bars is short of the 200-bar trend requirement
    assert_eq!(wave_run.report.trend.trend, Trend::Choppy);
}

#[test]
fn strongly_bearish_sentiment_never_buys() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<_> = (0..3)
        .map(|k| {
            write_series(dir.path(), &format!("s{k}.csv"), 150, move |i| {
                wave(i + 7 * k) + 0.1 * k as f64
            })
        })
        .collect();

    for entry in analyze_many(&paths, -1.0, &RunnerConfig::default()) {
        let run = entry.outcome.unwrap();
        assert_ne!(run.report.outcome.decision.action, Action::Buy);
    }
}

#[test]
fn backtest_batch_covers_every_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_series(dir.path(), "wave.csv", 200, wave);

    let entries = backtest_many(&[path], &StrategyKind::ALL, &RunnerConfig::default());
    assert_eq!(entries.len(), StrategyKind::ALL.len());

    let strategies: Vec<String> = entries
        .iter()
        .map(|e| e.outcome.as_ref().unwrap().report.strategy.clone())
        .collect();
    assert_eq!(
        strategies,
        ["breakout", "mean_reversion", "volume_surge", "macd_crossover"]
    );
    for entry in &entries {
        let report = &entry.outcome.as_ref().unwrap().report;
        assert_eq!(report.symbol, "WAVE");
        assert_eq!(report.equity_curve.len(), 150);
    }
}

#[test]
fn configured_warmup_reaches_the_backtester() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_series(dir.path(), "wave.csv", 200, wave);
    let config =
        RunnerConfig::from_toml("[backtest]\nwarmup = 120\ninitial_capital = 10000.0").unwrap();

    let entries = backtest_many(&[path], &[StrategyKind::MacdCrossover], &config);
    let report = &entries[0].outcome.as_ref().unwrap().report;
    assert_eq!(report.equity_curve.len(), 80);
    assert_eq!(report.initial_capital, 10_000.0);
}

#[test]
fn artifacts_are_written_and_reloadable() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_series(dir.path(), "acme.csv", 260, uptrend);
    let out = dir.path().join("out");
    let config = RunnerConfig::default();
    let fingerprint = config.fingerprint();

    let analysis = analyze_many(&[data.clone()], 0.0, &config)
        .pop()
        .unwrap()
        .outcome
        .unwrap();
    let json_path = save_analysis(&analysis, &fingerprint, &out).unwrap();
    assert!(json_path.ends_with("ACME_analysis.json"));
    let reloaded =
        import_json::<AnalysisRun>(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(reloaded.config_fingerprint, fingerprint);
    assert_eq!(reloaded.run.dataset_hash, analysis.dataset_hash);
    assert_eq!(reloaded.run.report.symbol, "ACME");
    assert_eq!(reloaded.run.report.bars, 260);

    let backtest = backtest_many(&[data], &[StrategyKind::Breakout], &config)
        .pop()
        .unwrap()
        .outcome
        .unwrap();
    let run_dir = save_backtest(&backtest, &fingerprint, &out).unwrap();
    assert!(run_dir.ends_with("ACME_breakout"));
    for file in ["report.json", "trades.csv", "equity.csv"] {
        assert!(run_dir.join(file).is_file(), "{file} missing");
    }
    let equity = std::fs::read_to_string(run_dir.join("equity.csv")).unwrap();
    assert_eq!(equity.lines().count(), 1 + backtest.report.equity_curve.len());
    let trades = std::fs::read_to_string(run_dir.join("trades.csv")).unwrap();
    assert_eq!(trades.lines().count(), 1 + backtest.report.trades.len());

    let reloaded =
        import_json::<BacktestRun>(&std::fs::read_to_string(run_dir.join("report.json")).unwrap())
            .unwrap();
    assert_eq!(reloaded.run.report.strategy, "breakout");
    assert_eq!(reloaded.run.report.total_trades, backtest.report.total_trades);
}
