use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One OHLCV sample for a fixed interval. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// A bar is well formed when every price field is finite and volume is
    /// finite and non-negative.
    pub fn is_well_formed(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
            && self.volume >= 0.0
    }
}

/// Per-bar derived values consumed by the signal policy. Fields are `None`
/// while the indicator is still inside its warm-up window.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub macd_histogram: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

/// Per-bar trading decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Signal {
    Long,
    Short,
    None,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Long => "long",
            Signal::Short => "short",
            Signal::None => "none",
        }
    }

    /// The direction this signal would open, if any.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Signal::Long => Some(Direction::Long),
            Signal::Short => Some(Direction::Short),
            Signal::None => None,
        }
    }
}

impl FromStr for Signal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" => Ok(Signal::Long),
            "short" => Ok(Signal::Short),
            "none" => Ok(Signal::None),
            other => Err(anyhow!("Unknown signal '{}'", other)),
        }
    }
}

/// Directional read of a single indicator, scored by a fixed lookup table
/// instead of substring matching on free-form text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

impl Bias {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bias::Bullish => "bullish",
            Bias::Bearish => "bearish",
            Bias::Neutral => "neutral",
        }
    }

    /// Score contribution of this bias when aggregating across indicators.
    pub fn score(&self) -> i32 {
        match self {
            Bias::Bullish => 1,
            Bias::Bearish => -1,
            Bias::Neutral => 0,
        }
    }
}

/// An open simulated holding awaiting exit. At most one exists per run.
#[derive(Debug, Clone)]
pub struct Position {
    pub direction: Direction,
    pub entry_price: f64,
    pub entry_index: usize,
    pub entry_date: DateTime<Utc>,
}

impl Position {
    pub fn open(direction: Direction, bar: &Bar, index: usize) -> Self {
        Self {
            direction,
            entry_price: bar.close,
            entry_index: index,
            entry_date: bar.date,
        }
    }

    /// Realize the position against an exit bar, producing an immutable trade.
    /// Profit is signed, in quote-currency units at unit position size.
    pub fn close(self, symbol: &str, bar: &Bar, index: usize) -> Trade {
        let exit_price = bar.close;
        let profit = match self.direction {
            Direction::Long => exit_price - self.entry_price,
            Direction::Short => self.entry_price - exit_price,
        };
        Trade {
            symbol: symbol.to_string(),
            direction: self.direction,
            entry_price: self.entry_price,
            entry_index: self.entry_index,
            entry_date: self.entry_date,
            exit_price,
            exit_index: index,
            exit_date: bar.date,
            profit,
        }
    }
}

/// A closed round trip. Immutable once appended to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub entry_index: usize,
    pub entry_date: DateTime<Utc>,
    pub exit_price: f64,
    pub exit_index: usize,
    pub exit_date: DateTime<Utc>,
    pub profit: f64,
}

/// Aggregate statistics over a full trade ledger. Always recomputed from the
/// ledger, never maintained incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub total_trades: usize,
    pub total_profit: f64,
    pub avg_profit: f64,
    pub win_rate: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub profit_factor: f64,
}

impl PerformanceSummary {
    pub fn empty() -> Self {
        Self {
            total_trades: 0,
            total_profit: 0.0,
            avg_profit: 0.0,
            win_rate: 0.0,
            max_drawdown: 0.0,
            sharpe_ratio: 0.0,
            profit_factor: 0.0,
        }
    }
}

/// Whether a run had enough history to produce any defined indicator values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DataStatus {
    Ok,
    InsufficientData,
}

impl DataStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataStatus::Ok => "ok",
            DataStatus::InsufficientData => "insufficient_data",
        }
    }
}

/// Everything one backtest run hands back to the service boundary. Degenerate
/// inputs produce a zero-metric report, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestReport {
    pub symbol: String,
    pub status: DataStatus,
    pub bar_count: usize,
    /// Aggregated directional read of the final snapshot's indicators.
    pub bias: Bias,
    pub trades: Vec<Trade>,
    pub summary: PerformanceSummary,
}
