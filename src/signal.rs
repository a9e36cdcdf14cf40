use crate::error::EngineError;
use crate::models::{Bias, IndicatorSnapshot, Signal};

/// Threshold policy turning one snapshot into one signal. Pure and memoryless:
/// the decision depends only on the snapshot passed in.
#[derive(Debug, Clone)]
pub struct SignalPolicy {
    pub long_threshold: f64,
    pub short_threshold: f64,
}

impl Default for SignalPolicy {
    fn default() -> Self {
        Self {
            long_threshold: 30.0,
            short_threshold: 70.0,
        }
    }
}

impl SignalPolicy {
    pub fn new(long_threshold: f64, short_threshold: f64) -> Result<Self, EngineError> {
        let policy = Self {
            long_threshold,
            short_threshold,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.long_threshold.is_finite() || !self.short_threshold.is_finite() {
            return Err(EngineError::InvalidConfig {
                reason: "signal thresholds must be finite".to_string(),
            });
        }
        if !(0.0..=100.0).contains(&self.long_threshold)
            || !(0.0..=100.0).contains(&self.short_threshold)
        {
            return Err(EngineError::InvalidConfig {
                reason: format!(
                    "signal thresholds must be within 0..=100 (long: {}, short: {})",
                    self.long_threshold, self.short_threshold
                ),
            });
        }
        if self.long_threshold >= self.short_threshold {
            return Err(EngineError::InvalidConfig {
                reason: format!(
                    "long threshold {} must be below short threshold {}",
                    self.long_threshold, self.short_threshold
                ),
            });
        }
        Ok(())
    }

    /// One bar in, one signal out. Undefined oscillator values (warm-up) map
    /// to `Signal::None`.
    pub fn signal_for(&self, snapshot: &IndicatorSnapshot) -> Signal {
        let Some(rsi) = snapshot.rsi else {
            return Signal::None;
        };

        if rsi < self.long_threshold {
            Signal::Long
        } else if rsi > self.short_threshold {
            Signal::Short
        } else {
            Signal::None
        }
    }

    /// Bulk form over an aligned snapshot series.
    pub fn generate_signals(&self, snapshots: &[IndicatorSnapshot]) -> Vec<Signal> {
        snapshots.iter().map(|s| self.signal_for(s)).collect()
    }
}

/// Classify the momentum oscillator reading relative to the policy zones.
pub fn rsi_bias(rsi: Option<f64>, policy: &SignalPolicy) -> Bias {
    match rsi {
        Some(value) if value < policy.long_threshold => Bias::Bullish,
        Some(value) if value > policy.short_threshold => Bias::Bearish,
        _ => Bias::Neutral,
    }
}

/// Classify the trend-divergence reading by its sign.
pub fn macd_bias(histogram: Option<f64>) -> Bias {
    match histogram {
        Some(value) if value > 0.0 => Bias::Bullish,
        Some(value) if value < 0.0 => Bias::Bearish,
        _ => Bias::Neutral,
    }
}

/// Aggregate per-indicator biases by summed lookup score.
pub fn aggregate_bias(biases: &[Bias]) -> Bias {
    let score: i32 = biases.iter().map(|b| b.score()).sum();
    match score {
        s if s > 0 => Bias::Bullish,
        s if s < 0 => Bias::Bearish,
        _ => Bias::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(rsi: Option<f64>) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi,
            macd_histogram: None,
        }
    }

    #[test]
    fn bottom_zone_goes_long_and_top_zone_goes_short() {
        let policy = SignalPolicy::default();
        assert_eq!(policy.signal_for(&snapshot(Some(25.0))), Signal::Long);
        assert_eq!(policy.signal_for(&snapshot(Some(75.0))), Signal::Short);
        assert_eq!(policy.signal_for(&snapshot(Some(50.0))), Signal::None);
    }

    #[test]
    fn threshold_values_themselves_are_neutral() {
        let policy = SignalPolicy::default();
        assert_eq!(policy.signal_for(&snapshot(Some(30.0))), Signal::None);
        assert_eq!(policy.signal_for(&snapshot(Some(70.0))), Signal::None);
    }

    #[test]
    fn warmup_snapshot_is_never_a_signal() {
        let policy = SignalPolicy::default();
        assert_eq!(policy.signal_for(&snapshot(None)), Signal::None);
    }

    #[test]
    fn signal_generation_is_deterministic() {
        let policy = SignalPolicy::default();
        let snapshots: Vec<IndicatorSnapshot> =
            (0..100).map(|i| snapshot(Some(i as f64))).collect();
        assert_eq!(
            policy.generate_signals(&snapshots),
            policy.generate_signals(&snapshots)
        );
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        assert!(SignalPolicy::new(70.0, 30.0).is_err());
        assert!(SignalPolicy::new(30.0, 30.0).is_err());
        assert!(SignalPolicy::new(-5.0, 70.0).is_err());
        assert!(SignalPolicy::new(20.0, 80.0).is_ok());
    }

    #[test]
    fn bias_scoring_uses_the_lookup_table() {
        let policy = SignalPolicy::default();
        assert_eq!(rsi_bias(Some(10.0), &policy), Bias::Bullish);
        assert_eq!(rsi_bias(Some(90.0), &policy), Bias::Bearish);
        assert_eq!(rsi_bias(None, &policy), Bias::Neutral);
        assert_eq!(macd_bias(Some(0.4)), Bias::Bullish);
        assert_eq!(macd_bias(Some(-0.4)), Bias::Bearish);

        assert_eq!(
            aggregate_bias(&[Bias::Bullish, Bias::Bullish, Bias::Bearish]),
            Bias::Bullish
        );
        assert_eq!(aggregate_bias(&[Bias::Bullish, Bias::Bearish]), Bias::Neutral);
        assert_eq!(aggregate_bias(&[]), Bias::Neutral);
    }
}
