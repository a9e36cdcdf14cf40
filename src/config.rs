use crate::error::EngineError;
use crate::indicators::IndicatorConfig;
use crate::signal::SignalPolicy;
use crate::simulator::SimulatorConfig;
use anyhow::anyhow;
use std::collections::HashMap;
use std::str::FromStr;

/// Bar interval a bot trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Minute,
    Hour,
    Day,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Minute => "1m",
            Timeframe::Hour => "1h",
            Timeframe::Day => "1d",
        }
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" | "minute" => Ok(Timeframe::Minute),
            "1h" | "hour" => Ok(Timeframe::Hour),
            "1d" | "day" | "daily" => Ok(Timeframe::Day),
            other => Err(anyhow!("Unknown timeframe '{}'", other)),
        }
    }
}

/// Explicit bot configuration: every recognized option is enumerated here with
/// a default, and validated at construction. No loose parameter dictionaries
/// escape this boundary.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub symbol: String,
    pub strategy_id: String,
    pub initial_capital: f64,
    pub risk_fraction: f64,
    pub timeframe: Timeframe,

    // Grouped configurations
    pub indicators: IndicatorConfig,
    pub signal: SignalPolicy,
    pub simulator: SimulatorConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            strategy_id: "rsi_reversion".to_string(),
            initial_capital: 10_000.0,
            risk_fraction: 0.02,
            timeframe: Timeframe::Day,
            indicators: IndicatorConfig::default(),
            signal: SignalPolicy::default(),
            simulator: SimulatorConfig::default(),
        }
    }
}

impl BotConfig {
    /// Build a configuration from a raw numeric parameter map, falling back
    /// to defaults for absent keys. The result is validated before use.
    pub fn from_parameters(
        symbol: &str,
        strategy_id: &str,
        timeframe: Timeframe,
        parameters: &HashMap<String, f64>,
    ) -> Result<Self, EngineError> {
        let defaults = Self::default();
        let config = Self {
            symbol: symbol.trim().to_uppercase(),
            strategy_id: strategy_id.trim().to_string(),
            initial_capital: get_param(parameters, "initialCapital", defaults.initial_capital),
            risk_fraction: get_param(parameters, "riskFraction", defaults.risk_fraction),
            timeframe,
            indicators: IndicatorConfig {
                rsi_period: get_usize_param_min(parameters, "rsiPeriod", 14, 1),
                macd_fast_period: get_usize_param_min(parameters, "macdFastPeriod", 12, 1),
                macd_slow_period: get_usize_param_min(parameters, "macdSlowPeriod", 26, 2),
                macd_signal_period: get_usize_param_min(parameters, "macdSignalPeriod", 9, 1),
            },
            signal: SignalPolicy {
                long_threshold: get_param(parameters, "longThreshold", 30.0),
                short_threshold: get_param(parameters, "shortThreshold", 70.0),
            },
            simulator: SimulatorConfig {
                close_open_positions_at_end: get_param(parameters, "closeOpenPositionsAtEnd", 0.0)
                    >= 0.5,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.symbol.is_empty() {
            return Err(EngineError::InvalidConfig {
                reason: "symbol must not be empty".to_string(),
            });
        }
        if self.strategy_id.is_empty() {
            return Err(EngineError::InvalidConfig {
                reason: "strategy id must not be empty".to_string(),
            });
        }
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(EngineError::InvalidConfig {
                reason: format!("initial capital must be positive (value: {})", self.initial_capital),
            });
        }
        if !self.risk_fraction.is_finite()
            || self.risk_fraction <= 0.0
            || self.risk_fraction > 1.0
        {
            return Err(EngineError::InvalidConfig {
                reason: format!(
                    "risk fraction must be within (0, 1] (value: {})",
                    self.risk_fraction
                ),
            });
        }
        if self.indicators.macd_fast_period >= self.indicators.macd_slow_period {
            return Err(EngineError::InvalidConfig {
                reason: format!(
                    "MACD fast period {} must be below slow period {}",
                    self.indicators.macd_fast_period, self.indicators.macd_slow_period
                ),
            });
        }
        self.signal.validate()?;
        Ok(())
    }
}

/// Extract a parameter as f64 with a default value.
fn get_param(params: &HashMap<String, f64>, key: &str, default: f64) -> f64 {
    params
        .get(key)
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Extract a parameter as usize with a minimum value.
fn get_usize_param_min(params: &HashMap<String, f64>, key: &str, default: usize, min: usize) -> usize {
    params
        .get(key)
        .copied()
        .filter(|v| v.is_finite())
        .map(|v| v.round().max(min as f64) as usize)
        .unwrap_or(default)
}
