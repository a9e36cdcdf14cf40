use chrono::{DateTime, Utc};

/// Typed errors for structurally invalid input. Predictable degenerate inputs
/// (empty series, no trades) never surface here; they degrade to zero-metric
/// summaries instead.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("malformed bar at index {index}: {reason}")]
    MalformedBar { index: usize, reason: String },

    #[error("bars out of order at index {index}: {current} is not after {previous}")]
    UnorderedTimestamps {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("signal count {signals} does not match bar count {bars}")]
    SignalCountMismatch { bars: usize, signals: usize },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}
