//! Recorded market snapshot replayed by the paper broker.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use calspread_core::{Candle, MarketDepth, Signal};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("failed to read market fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid market fixture {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("market fixture for {0} has no ticks")]
    NoTicks(String),
}

/// Everything the paper broker serves for one underlying.
///
/// ```json
/// {
///   "symbol": "NIFTY",
///   "ticks": [21950, 21990, 22040],
///   "expiries": ["2024-03-14", "2024-03-28"],
///   "default_depth": { "bids": [...], "asks": [...] },
///   "depth": { "NIFTY24031422000PE": { "bids": [...], "asks": [...] } },
///   "daily_candles": [...],
///   "intraday_candles": [...],
///   "signal": { "direction": "buy", "entry_price": "21950", ... }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperMarket {
    pub symbol: String,
    /// Underlying prices, served one per `last_price` call.
    pub ticks: Vec<Decimal>,
    pub expiries: Vec<NaiveDate>,
    /// Served for any contract without its own entry in `depth`.
    pub default_depth: Option<MarketDepth>,
    /// Depth by contract symbol.
    pub depth: HashMap<String, MarketDepth>,
    pub daily_candles: Vec<Candle>,
    pub intraday_candles: Vec<Candle>,
    /// Signal returned by the replay oracle; neutral when absent.
    pub signal: Option<Signal>,
}

impl PaperMarket {
    /// Reads a JSON fixture.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or if it has no ticks.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MarketError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| MarketError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let market: Self = serde_json::from_str(&raw).map_err(|source| MarketError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if market.ticks.is_empty() {
            return Err(MarketError::NoTicks(market.symbol));
        }
        Ok(market)
    }

    /// Depth for `contract_symbol`, falling back to the default ladder, then
    /// to an empty one.
    pub fn depth_for(&self, contract_symbol: &str) -> MarketDepth {
        self.depth
            .get(contract_symbol)
            .or(self.default_depth.as_ref())
            .cloned()
            .unwrap_or_default()
    }
}
