use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use quantsim::models::{Bar, Direction, IndicatorSnapshot, Signal, Trade};
use quantsim::performance::PerformanceCalculator;
use quantsim::signal::SignalPolicy;
use quantsim::simulator::{Simulator, SimulatorConfig};

fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            symbol: "BTCUSDT".to_string(),
            date: base + Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        })
        .collect()
}

fn signal_strategy() -> impl Strategy<Value = Signal> {
    prop::sample::select(vec![Signal::Long, Signal::Short, Signal::None])
}

fn ledger_from_profits(profits: &[f64]) -> Vec<Trade> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    profits
        .iter()
        .enumerate()
        .map(|(i, &profit)| Trade {
            symbol: "BTCUSDT".to_string(),
            direction: Direction::Long,
            entry_price: 100.0,
            entry_index: i * 2,
            entry_date: base + Duration::days((i * 2) as i64),
            exit_price: 100.0 + profit,
            exit_index: i * 2 + 1,
            exit_date: base + Duration::days((i * 2 + 1) as i64),
            profit,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn signal_policy_is_pure_and_total(rsi in prop::option::of(0.0f64..=100.0)) {
        let policy = SignalPolicy::default();
        let snapshot = IndicatorSnapshot { rsi, macd_histogram: None };

        let first = policy.signal_for(&snapshot);
        let second = policy.signal_for(&snapshot);
        prop_assert_eq!(first, second);

        match rsi {
            None => prop_assert_eq!(first, Signal::None),
            Some(value) if value < policy.long_threshold => prop_assert_eq!(first, Signal::Long),
            Some(value) if value > policy.short_threshold => prop_assert_eq!(first, Signal::Short),
            Some(_) => prop_assert_eq!(first, Signal::None),
        }
    }

    #[test]
    fn simulator_ledger_never_overlaps(
        rows in prop::collection::vec((1.0f64..10_000.0, signal_strategy()), 0..150)
    ) {
        let closes: Vec<f64> = rows.iter().map(|(close, _)| *close).collect();
        let signals: Vec<Signal> = rows.iter().map(|(_, signal)| *signal).collect();
        let bars = bars_from_closes(&closes);

        let trades = Simulator::default().run(&bars, &signals).unwrap();

        for trade in &trades {
            prop_assert!(trade.entry_index < trade.exit_index);
            prop_assert!(trade.profit.is_finite());
        }
        for pair in trades.windows(2) {
            // At most one open position: the next entry is strictly after the
            // previous exit (no same-bar reopen).
            prop_assert!(pair[0].exit_index < pair[1].entry_index);
        }
    }

    #[test]
    fn end_close_policy_adds_at_most_one_trade(
        rows in prop::collection::vec((1.0f64..10_000.0, signal_strategy()), 1..150)
    ) {
        let closes: Vec<f64> = rows.iter().map(|(close, _)| *close).collect();
        let signals: Vec<Signal> = rows.iter().map(|(_, signal)| *signal).collect();
        let bars = bars_from_closes(&closes);

        let discarded = Simulator::default().run(&bars, &signals).unwrap();
        let closed = Simulator::new(SimulatorConfig { close_open_positions_at_end: true })
            .run(&bars, &signals)
            .unwrap();

        prop_assert!(closed.len() >= discarded.len());
        prop_assert!(closed.len() <= discarded.len() + 1);
    }

    #[test]
    fn summary_metrics_stay_in_their_defined_ranges(
        profits in prop::collection::vec(-1_000.0f64..1_000.0, 0..100)
    ) {
        let trades = ledger_from_profits(&profits);
        let summary = PerformanceCalculator::summarize(&trades);

        prop_assert_eq!(summary.total_trades, trades.len());
        prop_assert!((0.0..=100.0).contains(&summary.win_rate));
        prop_assert!(summary.max_drawdown >= 0.0);
        prop_assert!(summary.total_profit.is_finite());
        prop_assert!(summary.avg_profit.is_finite());
        prop_assert!(summary.sharpe_ratio.is_finite());
        prop_assert!(summary.profit_factor >= 0.0);
    }
}
