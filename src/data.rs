use crate::error::EngineError;
use crate::models::Bar;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct BarRecord {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load one symbol's bar series from a CSV file with a
/// `date,open,high,low,close,volume` header. Dates accept RFC 3339 or plain
/// `YYYY-MM-DD`. The loaded series is validated before it is returned:
/// malformed bars reject the whole run (fail fast) rather than being skipped,
/// so that every caller sees the same ledger for the same file.
pub fn load_bars_csv(path: &Path, symbol: &str) -> Result<Vec<Bar>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open market data file {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut bars = Vec::new();
    for (row, result) in reader.deserialize::<BarRecord>().enumerate() {
        let record = result.with_context(|| format!("failed to parse CSV row {}", row + 1))?;
        let date = parse_bar_date(&record.date)
            .with_context(|| format!("invalid date '{}' in CSV row {}", record.date, row + 1))?;
        bars.push(Bar {
            symbol: symbol.trim().to_uppercase(),
            date,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        });
    }

    validate_series(&bars)?;
    info!("Loaded {} bars for {} from {}", bars.len(), symbol, path.display());
    Ok(bars)
}

fn parse_bar_date(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .with_context(|| format!("expected RFC 3339 or YYYY-MM-DD (value: {})", trimmed))?;
    Ok(date
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc())
}

/// Enforce the input contract: finite OHLCV fields and strictly ascending
/// timestamps. Violations are structural and reject the series outright.
pub fn validate_series(bars: &[Bar]) -> Result<(), EngineError> {
    for (index, bar) in bars.iter().enumerate() {
        if !bar.is_well_formed() {
            return Err(EngineError::MalformedBar {
                index,
                reason: "non-finite OHLCV field".to_string(),
            });
        }
    }

    for (index, pair) in bars.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(EngineError::UnorderedTimestamps {
                index: index + 1,
                previous: pair[0].date,
                current: pair[1].date,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bar(offset_days: i64, close: f64) -> Bar {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Bar {
            symbol: "BTCUSDT".to_string(),
            date: base + Duration::days(offset_days),
            open: close,
            high: close,
            low: close,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn ordered_finite_series_passes() {
        let bars = vec![bar(0, 100.0), bar(1, 101.0), bar(2, 99.0)];
        assert!(validate_series(&bars).is_ok());
        assert!(validate_series(&[]).is_ok());
    }

    #[test]
    fn duplicate_or_reversed_timestamps_are_rejected() {
        let bars = vec![bar(0, 100.0), bar(2, 101.0), bar(1, 99.0)];
        assert!(matches!(
            validate_series(&bars),
            Err(EngineError::UnorderedTimestamps { index: 2, .. })
        ));

        let bars = vec![bar(0, 100.0), bar(0, 101.0)];
        assert!(matches!(
            validate_series(&bars),
            Err(EngineError::UnorderedTimestamps { .. })
        ));
    }

    #[test]
    fn non_finite_bar_fails_fast() {
        let mut bad = bar(1, 100.0);
        bad.low = f64::NEG_INFINITY;
        let bars = vec![bar(0, 100.0), bad];
        assert!(matches!(
            validate_series(&bars),
            Err(EngineError::MalformedBar { index: 1, .. })
        ));
    }

    #[test]
    fn bar_dates_parse_both_supported_formats() {
        assert!(parse_bar_date("2024-03-01").is_ok());
        assert!(parse_bar_date("2024-03-01T12:30:00Z").is_ok());
        assert!(parse_bar_date("03/01/2024").is_err());
    }
}
