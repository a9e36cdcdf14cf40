use crate::models::{PerformanceSummary, Trade};
use statrs::statistics::Statistics;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

pub struct PerformanceCalculator;

impl PerformanceCalculator {
    /// Recompute the full summary from the ledger. Pure: callable any number
    /// of times, never mutates or caches. All ratio statistics guard their
    /// denominators; rounding is left to the reporting boundary.
    pub fn summarize(trades: &[Trade]) -> PerformanceSummary {
        if trades.is_empty() {
            return PerformanceSummary::empty();
        }

        let profits: Vec<f64> = trades.iter().map(|t| t.profit).collect();
        let total_trades = trades.len();
        let total_profit: f64 = profits.iter().sum();
        let avg_profit = total_profit / total_trades as f64;

        let winning_trades = profits.iter().filter(|&&p| p > 0.0).count();
        let win_rate = (winning_trades as f64 / total_trades as f64) * 100.0;

        let max_drawdown = Self::max_drawdown(&profits);
        let sharpe_ratio = Self::sharpe_ratio(&profits);
        let profit_factor = Self::profit_factor(&profits);

        PerformanceSummary {
            total_trades,
            total_profit,
            avg_profit,
            win_rate,
            max_drawdown,
            sharpe_ratio,
            profit_factor,
        }
    }

    /// Peak-to-trough decline on the cumulative-profit curve, which starts at
    /// zero before the first trade.
    fn max_drawdown(profits: &[f64]) -> f64 {
        let mut cumulative = 0.0f64;
        let mut peak = 0.0f64;
        let mut max_drawdown = 0.0f64;

        for profit in profits {
            cumulative += profit;
            if cumulative > peak {
                peak = cumulative;
            }
            let drawdown = peak - cumulative;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }

        max_drawdown
    }

    /// Per-trade Sharpe, annualized by a fixed √252 factor. Zero when fewer
    /// than two trades exist or the profits have no variance.
    fn sharpe_ratio(profits: &[f64]) -> f64 {
        if profits.len() < 2 {
            return 0.0;
        }

        let mean_profit = profits.mean();
        let std_dev = profits.std_dev();

        if std_dev == 0.0 || !std_dev.is_finite() {
            return 0.0;
        }

        (mean_profit / std_dev) * TRADING_DAYS_PER_YEAR.sqrt()
    }

    /// Gross profit over gross loss magnitude. Positive infinity when there
    /// are wins but no losses, zero when there are neither.
    fn profit_factor(profits: &[f64]) -> f64 {
        let gross_profit: f64 = profits.iter().filter(|&&p| p > 0.0).sum();
        let gross_loss: f64 = profits.iter().filter(|&&p| p < 0.0).map(|p| p.abs()).sum();

        if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }
}
