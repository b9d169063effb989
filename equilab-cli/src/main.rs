//! EquiLab CLI — analysis, backtest, and level commands over CSV candle files.
//!
//! Commands:
//! - `analyze` — full analysis cycle per file, one sentiment score for all
//! - `backtest` — walk one or more strategies over each file
//! - `levels` — support/resistance levels and the nearest pair to the last close
//!
//! Logging goes to stderr through `tracing`; set `RUST_LOG` to change the
//! level (default `info`).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use equilab_core::levels::LevelDetector;
use equilab_core::strategies::StrategyKind;
use equilab_runner::{
    analyze_many, backtest_many, load_candles, save_analysis, save_backtest, AnalysisRun,
    BacktestRun, RunnerConfig,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "equilab",
    about = "EquiLab CLI — indicator, strategy and risk analysis for equities"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the analysis cycle on each candle file.
    Analyze {
        /// CSV candle files (timestamp,open,high,low,close,volume[,adj_close]).
        #[arg(long, required = true, num_args = 1..)]
        candles: Vec<PathBuf>,

        /// Sentiment score in [-1, 1] applied to every symbol.
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        sentiment: f64,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory for JSON reports. Nothing is written without it.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print reports as JSON instead of the text summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Backtest strategies over each candle file.
    Backtest {
        /// CSV candle files.
        #[arg(long, required = true, num_args = 1..)]
        candles: Vec<PathBuf>,

        /// Strategy: breakout, mean_reversion, volume_surge, macd_crossover.
        /// Repeatable; defaults to all four.
        #[arg(long)]
        strategy: Vec<StrategyKind>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory for report.json, trades.csv and equity.csv.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print support/resistance levels for a candle file.
    Levels {
        /// CSV candle file.
        #[arg(long)]
        candles: PathBuf,

        /// Bars on each side a pivot must dominate.
        #[arg(long, default_value_t = 5)]
        window: usize,

        /// Relative distance under which levels merge (0.02 = 2%).
        #[arg(long, default_value_t = 0.02)]
        threshold: f64,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            candles,
            sentiment,
            config,
            output,
            json,
        } => run_analyze(candles, sentiment, config, output, json),
        Commands::Backtest {
            candles,
            strategy,
            config,
            output,
        } => run_backtest(candles, strategy, config, output),
        Commands::Levels {
            candles,
            window,
            threshold,
        } => run_levels(candles, window, threshold),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<RunnerConfig> {
    match path {
        Some(path) => RunnerConfig::from_file(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(RunnerConfig::default()),
    }
}

fn run_analyze(
    candles: Vec<PathBuf>,
    sentiment: f64,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let fingerprint = config.fingerprint();
    info!(files = candles.len(), sentiment, config = %fingerprint, "analyze");

    let entries = analyze_many(&candles, sentiment, &config);
    let mut failed = 0;
    for entry in &entries {
        match &entry.outcome {
            Ok(run) => {
                if json {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(run).context("failed to serialize report")?
                    );
                } else {
                    print_analysis(run);
                }
                if let Some(dir) = &output {
                    let path = save_analysis(run, &fingerprint, dir)?;
                    info!(path = %path.display(), "report saved");
                }
            }
            Err(err) => {
                failed += 1;
                error!(path = %entry.path.display(), %err, "analysis failed");
            }
        }
    }

    if failed == entries.len() {
        bail!("all {failed} analyses failed");
    }
    Ok(())
}

fn run_backtest(
    candles: Vec<PathBuf>,
    strategies: Vec<StrategyKind>,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let fingerprint = config.fingerprint();
    let kinds = if strategies.is_empty() {
        StrategyKind::ALL.to_vec()
    } else {
        strategies
    };

    let entries = backtest_many(&candles, &kinds, &config);
    let mut failed = 0;
    for entry in &entries {
        match &entry.outcome {
            Ok(run) => {
                print_backtest(run);
                if let Some(dir) = &output {
                    let run_dir = save_backtest(run, &fingerprint, dir)?;
                    println!("Artifacts saved to: {}", run_dir.display());
                }
            }
            Err(err) => {
                failed += 1;
                error!(path = %entry.path.display(), %err, "backtest failed");
            }
        }
    }

    if failed == entries.len() {
        bail!("all {failed} backtests failed");
    }
    Ok(())
}

fn run_levels(path: PathBuf, window: usize, threshold: f64) -> Result<()> {
    if window == 0 {
        bail!("--window must be at least 1");
    }
    if !threshold.is_finite() || threshold < 0.0 {
        bail!("--threshold must be non-negative");
    }
    let candles = load_candles(&path)?;
    let report = LevelDetector::new(window, threshold).report(&candles);

    println!("Symbol:       {}", candles[0].symbol);
    println!("Bars:         {}", candles.len());
    if let Some(price) = report.price {
        println!("Last close:   {price:.2}");
    }
    println!("Support:      {}", fmt_opt(report.nearest.support));
    println!("Resistance:   {}", fmt_opt(report.nearest.resistance));
    println!();
    println!("Levels ({}):", report.levels.len());
    for level in &report.levels {
        println!("  {level:.2}");
    }
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn print_analysis(run: &AnalysisRun) {
    let report = &run.report;
    let snap = &report.snapshot;
    let outcome = &report.outcome;

    println!();
    println!("=== {} ===", report.symbol);
    println!("Bars:           {}", report.bars);
    println!("Price:          {:.2}", report.market.current_price);
    println!("Trend:          {} ({})", report.trend.trend, report.trend.detail);
    println!("RSI(14):        {}", fmt_opt(snap.rsi14));
    println!(
        "SMA 20/50/200:  {} / {} / {}",
        fmt_opt(snap.sma20),
        fmt_opt(snap.sma50),
        fmt_opt(snap.sma200)
    );
    println!("ATR(14):        {}", fmt_opt(snap.atr14));
    println!("MACD hist:      {}", fmt_opt(snap.macd_histogram));
    println!(
        "Volume:         {:.0} ({:.2}x avg{})",
        report.volume_spike.current_volume,
        report.volume_spike.multiplier,
        if report.volume_spike.is_spike { ", SPIKE" } else { "" }
    );
    println!(
        "Levels:         support {} / resistance {}",
        fmt_opt(report.levels.nearest.support),
        fmt_opt(report.levels.nearest.resistance)
    );

    println!();
    println!("--- Candidates ({}) ---", report.candidates.len());
    for c in &report.candidates {
        println!(
            "{:<15} {:<4} entry {:.2} stop {:.2} target {:.2} conf {:.2}",
            c.strategy, c.direction, c.entry, c.stop_loss, c.target, c.confidence
        );
    }

    println!();
    println!("--- Decision ---");
    println!("Action:         {}", outcome.decision.action);
    if let Some(sized) = &outcome.decision.signal {
        println!(
            "Size:           {:.2} shares ({:.2} value)",
            sized.position_size, sized.position_value
        );
        println!("Stop/Target:    {:.2} / {:.2}", sized.signal.stop_loss, sized.signal.target);
    }
    println!(
        "Risk:           {:?} (volatility {:.1}%)",
        outcome.risk.risk_level,
        outcome.risk.volatility * 100.0
    );
    println!("Sentiment:      {:.2}", outcome.sentiment);
    println!("Reasoning:      {}", outcome.reasoning);
}

fn print_backtest(run: &BacktestRun) {
    let report = &run.report;
    println!();
    println!("=== Backtest: {} / {} ===", report.symbol, report.strategy);
    println!(
        "Period:         {} to {}",
        report.start.format("%Y-%m-%d"),
        report.end.format("%Y-%m-%d")
    );
    println!("Trades:         {}", report.total_trades);
    println!();
    println!("--- Performance ---");
    println!("Initial:        {:.2}", report.initial_capital);
    println!("Final Equity:   {:.2}", report.final_equity);
    println!("Total PnL:      {:.2}", report.total_pnl);
    println!("Total Return:   {:.2}%", report.total_return * 100.0);
    println!("Sharpe:         {:.3}", report.sharpe_ratio);
    println!("Max Drawdown:   {:.2}%", report.max_drawdown * 100.0);
    println!("Win Rate:       {:.1}%", report.win_rate * 100.0);
    println!("Profit Factor:  {:.2}", report.profit_factor);
    println!("Loss Streak:    {}", report.max_consecutive_losses);
    if let Some(open) = &report.open_position {
        println!(
            "Open Position:  {:.2} shares from {:.2} (unrealized {:.2})",
            open.shares, open.entry_price, open.unrealized_pnl
        );
    }
}
