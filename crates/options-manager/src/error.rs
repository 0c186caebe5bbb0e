//! Recoverable failures of the entry/exit pipeline.
//!
//! None of these are fatal: the operation that hits one reports it and the
//! trade is left exactly as it was before the operation started.

use calspread_core::Direction;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManagerError {
    /// The broker returned nothing usable (no candles, no expiries, empty depth).
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// No listed expiry satisfied the selection rule.
    #[error("no matching expiry: {0}")]
    NoMatchingExpiry(String),

    /// Depth ladder had zero volume, so the leg cannot be priced.
    #[error("no liquidity to price {contract}")]
    NoLiquidity { contract: String },

    /// A broker call failed.
    #[error("broker error: {0}")]
    Broker(#[from] anyhow::Error),

    #[error("already in position since {since}")]
    AlreadyInPosition { since: String },

    #[error("no open position")]
    NotInPosition,

    #[error("cannot enter a neutral trade")]
    NeutralDirection,

    /// `enter` was called without an actionable signal recorded.
    #[error("no pending entry")]
    NoPendingEntry,

    #[error("cannot enter {requested}, pending signal is {pending}")]
    DirectionMismatch {
        requested: Direction,
        pending: Direction,
    },

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl ManagerError {
    pub(crate) fn no_expiry_at_least(min_days: i64, closest: Option<(NaiveDate, i64)>) -> Self {
        match closest {
            Some((expiry, days)) => Self::NoMatchingExpiry(format!(
                "no expiry with >= {min_days} days to expiry, furthest is {expiry} at {days} days"
            )),
            None => Self::NoMatchingExpiry(format!(
                "no expiry with >= {min_days} days to expiry, none listed"
            )),
        }
    }
}

/// Errors from trade snapshot persistence.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// IO error reading/writing file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
