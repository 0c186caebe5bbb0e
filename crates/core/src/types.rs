//! Domain types shared by the engine and its collaborators.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Directional view produced by the signal oracle and carried by a trade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
    #[default]
    Neutral,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Execution side of a single option leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side that closes a leg opened on `self`.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Option kind, displayed with exchange suffixes (`CE` / `PE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    #[serde(rename = "CE", alias = "call")]
    Call,
    #[serde(rename = "PE", alias = "put")]
    Put,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "CE"),
            Self::Put => write!(f, "PE"),
        }
    }
}

/// An option contract. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionContract {
    pub expiry: NaiveDate,
    pub strike: Decimal,
    pub kind: OptionKind,
    /// Contract symbol, e.g. `NIFTY24032822000PE`.
    pub symbol: String,
    pub underlying: String,
}

impl OptionContract {
    /// Create a contract, deriving the contract symbol from its terms.
    pub fn new(underlying: &str, expiry: NaiveDate, strike: Decimal, kind: OptionKind) -> Self {
        let underlying = underlying.to_uppercase();
        let symbol = format!(
            "{}{}{}{}",
            underlying,
            expiry.format("%y%m%d"),
            strike.normalize(),
            kind
        );
        Self {
            expiry,
            strike,
            kind,
            symbol,
            underlying,
        }
    }

    /// Human-readable description (e.g., "NIFTY 22000PE 2024-03-28").
    pub fn display_name(&self) -> String {
        format!(
            "{} {}{} {}",
            self.underlying,
            self.strike.normalize(),
            self.kind,
            self.expiry
        )
    }
}

/// A leg of a trade: contract plus intended execution price, side and size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionPosition {
    pub contract: OptionContract,
    pub price: Decimal,
    pub side: Side,
    pub quantity: i64,
}

impl OptionPosition {
    /// An unpriced leg; the price is filled in from market depth.
    pub fn unpriced(contract: OptionContract, side: Side, quantity: i64) -> Self {
        Self {
            contract,
            price: Decimal::ZERO,
            side,
            quantity,
        }
    }

    /// The leg that closes this one at `price`.
    #[must_use]
    pub fn closing(&self, price: Decimal) -> Self {
        Self {
            contract: self.contract.clone(),
            price,
            side: self.side.reversed(),
            quantity: self.quantity,
        }
    }
}

/// One level of a market-depth ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: Decimal,
    pub quantity: i64,
    pub orders: i64,
}

impl DepthLevel {
    pub const fn new(price: Decimal, quantity: i64, orders: i64) -> Self {
        Self {
            price,
            quantity,
            orders,
        }
    }
}

/// Bid and ask ladders for one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDepth {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

/// Candle resolution requested from the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Minute1,
    Minute5,
    Minute15,
    Day,
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minute1 => write!(f, "1m"),
            Self::Minute5 => write!(f, "5m"),
            Self::Minute15 => write!(f, "15m"),
            Self::Day => write!(f, "1d"),
        }
    }
}

/// A historical price bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    #[serde(default)]
    pub volume: Decimal,
    #[serde(default)]
    pub open_interest: Decimal,
}

/// Directional recommendation for the current evaluation instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    pub entry_price: Decimal,
    pub stop_loss_price: Decimal,
    pub target_price: Decimal,
}

impl Signal {
    /// A signal that recommends no trade.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn is_actionable(&self) -> bool {
        self.direction != Direction::Neutral
    }
}
