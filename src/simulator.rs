use crate::error::EngineError;
use crate::models::{Bar, Position, Signal, Trade};
use log::debug;

/// Run-scoped simulator options.
#[derive(Debug, Clone, Default)]
pub struct SimulatorConfig {
    /// When set, a position still open at the end of the series is marked to
    /// the final close and reported as a trade. Off by default: the reference
    /// behavior discards unrealized positions from the ledger.
    pub close_open_positions_at_end: bool,
}

/// Sequential position simulator. Holds at most one open position at a time
/// and owns its ledger for the duration of one run; nothing is shared across
/// runs.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// Replay an aligned (bar, signal) sequence into an ordered trade ledger.
    ///
    /// Transitions:
    /// - flat + directional signal: open at that bar's close
    /// - in position + same-direction signal: hold
    /// - in position + differing signal (including none): close at that bar's
    ///   close and realize the trade; the same bar never reopens, so an
    ///   opposite-direction signal is consumed by the close alone
    pub fn run(&self, bars: &[Bar], signals: &[Signal]) -> Result<Vec<Trade>, EngineError> {
        if bars.len() != signals.len() {
            return Err(EngineError::SignalCountMismatch {
                bars: bars.len(),
                signals: signals.len(),
            });
        }
        if bars.is_empty() {
            return Ok(Vec::new());
        }

        let symbol = bars[0].symbol.clone();
        let mut open_position: Option<Position> = None;
        let mut trades: Vec<Trade> = Vec::new();

        for (index, (bar, signal)) in bars.iter().zip(signals.iter()).enumerate() {
            match open_position.take() {
                None => {
                    if let Some(direction) = signal.direction() {
                        debug!(
                            "Opening {} position for {} at {} (bar {})",
                            direction.as_str(),
                            symbol,
                            bar.close,
                            index
                        );
                        open_position = Some(Position::open(direction, bar, index));
                    }
                }
                Some(position) => {
                    if signal.direction() == Some(position.direction) {
                        open_position = Some(position);
                    } else {
                        let trade = position.close(&symbol, bar, index);
                        debug!(
                            "Closing {} position for {} at {} (bar {}, profit {})",
                            trade.direction.as_str(),
                            symbol,
                            trade.exit_price,
                            index,
                            trade.profit
                        );
                        trades.push(trade);
                        // The closing bar never reopens; the next bar starts flat.
                    }
                }
            }
        }

        if let Some(position) = open_position {
            if self.config.close_open_positions_at_end {
                let last_index = bars.len() - 1;
                let trade = position.close(&symbol, &bars[last_index], last_index);
                debug!(
                    "Marking open {} position for {} to final close {} (profit {})",
                    trade.direction.as_str(),
                    symbol,
                    trade.exit_price,
                    trade.profit
                );
                trades.push(trade);
            } else {
                debug!(
                    "Discarding open {} position for {} entered at bar {}",
                    position.direction.as_str(),
                    symbol,
                    position.entry_index
                );
            }
        }

        Ok(trades)
    }
}
