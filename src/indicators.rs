use crate::models::{Bar, DataStatus, IndicatorSnapshot};

/// Lookback windows for the indicator collaborator.
#[derive(Debug, Clone)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
        }
    }
}

impl IndicatorConfig {
    /// Largest lookback among the configured indicators. Snapshots before
    /// this index carry undefined values.
    pub fn warmup_bars(&self) -> usize {
        self.rsi_period
            .max(self.macd_slow_period + self.macd_signal_period)
    }
}

/// Collaborator seam: anything that can turn a bar series into an aligned
/// snapshot series (same length, same order, `None` during warm-up).
pub trait IndicatorSource {
    fn snapshots(&self, bars: &[Bar]) -> Vec<IndicatorSnapshot>;
}

/// Default indicator collaborator: RSI plus MACD histogram over closes.
#[derive(Debug, Clone, Default)]
pub struct OscillatorIndicators {
    config: IndicatorConfig,
}

impl OscillatorIndicators {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }
}

impl IndicatorSource for OscillatorIndicators {
    fn snapshots(&self, bars: &[Bar]) -> Vec<IndicatorSnapshot> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let rsi = calculate_rsi(&closes, self.config.rsi_period);
        let histogram = calculate_macd_histogram(
            &closes,
            self.config.macd_fast_period,
            self.config.macd_slow_period,
            self.config.macd_signal_period,
        );

        (0..bars.len())
            .map(|i| IndicatorSnapshot {
                rsi: rsi[i],
                macd_histogram: histogram[i],
            })
            .collect()
    }
}

/// A series is usable once at least one snapshot carries a defined oscillator
/// value; otherwise the run degrades to an all-`None` signal sequence.
pub fn series_status(snapshots: &[IndicatorSnapshot]) -> DataStatus {
    if snapshots.iter().any(|s| s.rsi.is_some()) {
        DataStatus::Ok
    } else {
        DataStatus::InsufficientData
    }
}

pub fn calculate_ema(prices: &[f64], period: usize) -> Vec<f64> {
    if prices.is_empty() {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema_values = Vec::with_capacity(prices.len());
    ema_values.push(prices[0]);

    for i in 1..prices.len() {
        let ema = (prices[i] * multiplier) + (ema_values[i - 1] * (1.0 - multiplier));
        ema_values.push(ema);
    }

    ema_values
}

fn rsi_from_avgs(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

/// Wilder-smoothed RSI aligned to the input. The first `period` entries are
/// `None` (insufficient lookback), as is everything when the series is shorter
/// than `period + 1`.
pub fn calculate_rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut rsi_values = vec![None; prices.len()];
    if period == 0 || prices.len() < period + 1 {
        return rsi_values;
    }

    let mut sum_gain = 0.0f64;
    let mut sum_loss = 0.0f64;
    for i in 1..=period {
        let delta = prices[i] - prices[i - 1];
        if delta >= 0.0 {
            sum_gain += delta;
        } else {
            sum_loss += -delta;
        }
    }

    let mut avg_gain = sum_gain / period as f64;
    let mut avg_loss = sum_loss / period as f64;
    rsi_values[period] = Some(rsi_from_avgs(avg_gain, avg_loss));

    for i in (period + 1)..prices.len() {
        let delta = prices[i] - prices[i - 1];
        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { -delta } else { 0.0 };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
        rsi_values[i] = Some(rsi_from_avgs(avg_gain, avg_loss));
    }

    rsi_values
}

/// MACD histogram (MACD line minus its signal line) aligned to the input.
/// Entries inside the `slow + signal` warm-up window are `None`.
pub fn calculate_macd_histogram(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Vec<Option<f64>> {
    let warmup = slow_period + signal_period;
    let mut histogram = vec![None; prices.len()];
    if prices.len() <= warmup {
        return histogram;
    }

    let fast_ema = calculate_ema(prices, fast_period);
    let slow_ema = calculate_ema(prices, slow_period);
    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal_line = calculate_ema(&macd_line, signal_period);

    for i in warmup..prices.len() {
        histogram[i] = Some(macd_line[i] - signal_line[i]);
    }

    histogram
}
