//! Backtest simulation and scoring engine: turns an OHLCV series into
//! per-bar trading signals, replays them through a sequential position
//! simulator, and aggregates performance statistics over the resulting
//! trade ledger.

pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod models;
pub mod performance;
pub mod signal;
pub mod simulator;

use error::EngineError;
use indicators::{series_status, IndicatorSource};
use log::info;
use models::{BacktestReport, Bar, Bias};
use performance::PerformanceCalculator;
use signal::{aggregate_bias, macd_bias, rsi_bias, SignalPolicy};
use simulator::Simulator;

/// Run the full pipeline over one in-memory bar series: indicator snapshots,
/// per-bar signals, simulated ledger, summary. Single-threaded and free of
/// shared state; concurrent runs each own their own inputs and simulator.
pub fn run_backtest(
    bars: &[Bar],
    indicators: &dyn IndicatorSource,
    policy: &SignalPolicy,
    simulator: &Simulator,
) -> Result<BacktestReport, EngineError> {
    let snapshots = indicators.snapshots(bars);
    let status = series_status(&snapshots);
    let bias = snapshots
        .last()
        .map(|s| aggregate_bias(&[rsi_bias(s.rsi, policy), macd_bias(s.macd_histogram)]))
        .unwrap_or(Bias::Neutral);
    let signals = policy.generate_signals(&snapshots);
    let trades = simulator.run(bars, &signals)?;
    let summary = PerformanceCalculator::summarize(&trades);

    let symbol = bars
        .first()
        .map(|bar| bar.symbol.clone())
        .unwrap_or_default();
    info!(
        "Backtest for {} completed: {} bars, {} trades, status {}",
        symbol,
        bars.len(),
        trades.len(),
        status.as_str()
    );

    Ok(BacktestReport {
        symbol,
        status,
        bar_count: bars.len(),
        bias,
        trades,
        summary,
    })
}
