use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use quantsim::config::{BotConfig, Timeframe};
use quantsim::data::load_bars_csv;
use quantsim::indicators::{IndicatorSource, OscillatorIndicators};
use quantsim::models::{BacktestReport, PerformanceSummary};
use quantsim::run_backtest;
use quantsim::simulator::Simulator;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quantsim")]
#[command(about = "Backtest simulation and scoring engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest over a CSV bar series and print the performance summary
    Backtest {
        /// Path to the market data CSV (date,open,high,low,close,volume)
        data_file: PathBuf,
        /// Symbol the series belongs to
        #[arg(long, default_value = "BTCUSDT")]
        symbol: String,
        /// Bar interval of the series
        #[arg(long, default_value = "1d")]
        timeframe: String,
        /// Oscillator zone below which bars signal long
        #[arg(long)]
        long_threshold: Option<f64>,
        /// Oscillator zone above which bars signal short
        #[arg(long)]
        short_threshold: Option<f64>,
        /// Momentum oscillator lookback
        #[arg(long)]
        rsi_period: Option<usize>,
        /// Mark any still-open position to the final close instead of discarding it
        #[arg(long)]
        close_open_positions: bool,
        /// Emit the full report as JSON instead of the summary table
        #[arg(long)]
        json: bool,
    },
    /// Print the per-bar signal sequence for a CSV bar series
    Signals {
        /// Path to the market data CSV (date,open,high,low,close,volume)
        data_file: PathBuf,
        /// Symbol the series belongs to
        #[arg(long, default_value = "BTCUSDT")]
        symbol: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Backtest {
            data_file,
            symbol,
            timeframe,
            long_threshold,
            short_threshold,
            rsi_period,
            close_open_positions,
            json,
        } => {
            let timeframe: Timeframe = timeframe.parse()?;
            let mut parameters = HashMap::new();
            if let Some(value) = long_threshold {
                parameters.insert("longThreshold".to_string(), value);
            }
            if let Some(value) = short_threshold {
                parameters.insert("shortThreshold".to_string(), value);
            }
            if let Some(value) = rsi_period {
                parameters.insert("rsiPeriod".to_string(), value as f64);
            }
            if close_open_positions {
                parameters.insert("closeOpenPositionsAtEnd".to_string(), 1.0);
            }

            let config = BotConfig::from_parameters(&symbol, "rsi_reversion", timeframe, &parameters)?;
            let bars = load_bars_csv(&data_file, &config.symbol)?;
            info!(
                "Backtesting {} on {} bars ({} timeframe)",
                config.symbol,
                bars.len(),
                config.timeframe.as_str()
            );

            let indicators = OscillatorIndicators::new(config.indicators.clone());
            let simulator = Simulator::new(config.simulator.clone());
            let report = run_backtest(&bars, &indicators, &config.signal, &simulator)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Signals { data_file, symbol } => {
            let config = BotConfig::default();
            let bars = load_bars_csv(&data_file, &symbol)?;
            let indicators = OscillatorIndicators::new(config.indicators.clone());
            let snapshots = indicators.snapshots(&bars);
            let signals = config.signal.generate_signals(&snapshots);

            for (bar, signal) in bars.iter().zip(signals.iter()) {
                println!("{}\t{:.8}\t{}", bar.date.format("%Y-%m-%d"), bar.close, signal.as_str());
            }
        }
    }

    Ok(())
}

/// Display precision is applied here only; all accumulation upstream is
/// full-precision.
fn print_report(report: &BacktestReport) {
    println!("Symbol:          {}", report.symbol);
    println!("Status:          {}", report.status.as_str());
    println!("Bars:            {}", report.bar_count);
    println!("Bias:            {}", report.bias.as_str());
    print_summary(&report.summary);
}

fn print_summary(summary: &PerformanceSummary) {
    println!("Total trades:    {}", summary.total_trades);
    println!("Total profit:    {:.2}", summary.total_profit);
    println!("Avg profit:      {:.2}", summary.avg_profit);
    println!("Win rate:        {:.1}%", summary.win_rate);
    println!("Max drawdown:    {:.2}", summary.max_drawdown);
    println!("Sharpe ratio:    {:.2}", summary.sharpe_ratio);
    if summary.profit_factor.is_infinite() {
        println!("Profit factor:   inf");
    } else {
        println!("Profit factor:   {:.2}", summary.profit_factor);
    }
}
