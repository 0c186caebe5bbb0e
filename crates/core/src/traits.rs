use crate::types::{Candle, MarketDepth, OptionContract, Signal, Timeframe};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

/// Market-data capabilities the engine needs from a broker.
///
/// Transport and authentication belong to the implementation; the engine
/// only ever sees this contract.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Last traded price of `symbol`.
    async fn last_price(&self, symbol: &str) -> Result<Decimal>;

    /// Option expiries currently listed for `symbol`.
    async fn option_expiries(&self, symbol: &str) -> Result<Vec<NaiveDate>>;

    /// Bid and ask ladders for an option contract.
    async fn market_depth(&self, contract: &OptionContract) -> Result<MarketDepth>;

    /// Historical candles for `symbol` in `[from, to]`.
    async fn candles(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>>;
}

/// Directional recommendation from prior-day and current-day candles.
pub trait SignalOracle: Send + Sync {
    fn compute_signal(
        &self,
        min_stop_loss_pct: Decimal,
        min_target_pct: Decimal,
        previous_day: &[Candle],
        current_day: &[Candle],
    ) -> Signal;
}

/// Source of "now" for the engine. Replaceable for tests and backtests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        let mut now = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *now = instant;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
