//! Configuration errors. Any of these prevents the engine from being built.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Tick size must be strictly positive.
    #[error("tick size must be > 0, got {0}")]
    NonPositiveTickSize(Decimal),

    /// Target percentage below the trail percentage.
    #[error("min target percent ({target}) cannot be less than min trail percent ({trail})")]
    TargetBelowTrail { target: Decimal, trail: Decimal },

    /// The hedge leg is half the quantity, so at least two lots are needed.
    #[error("quantity must be >= 2 so the hedge leg is not empty, got {0}")]
    QuantityTooSmall(i64),

    #[error("strike increment must be > 0, got {0}")]
    NonPositiveStrikeDiff(Decimal),

    #[error("market open {open} must be before market close {close}")]
    InvalidMarketHours { open: String, close: String },

    #[error("unknown time zone: {0}")]
    UnknownTimezone(String),

    #[error("invalid holiday date {value:?}: {reason}")]
    InvalidHoliday { value: String, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to load settings: {0}")]
    Figment(#[from] Box<figment::Error>),
}
