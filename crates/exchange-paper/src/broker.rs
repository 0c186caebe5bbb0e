//! Paper broker serving a recorded [`PaperMarket`].
//!
//! Never touches a real exchange. Underlying ticks are replayed in order, one
//! per `last_price` call, and the last tick repeats once the tape runs out.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;
use calspread_core::{Broker, Candle, MarketDepth, OptionContract, Timeframe};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::market::PaperMarket;

pub struct PaperBroker {
    market: PaperMarket,
    cursor: AtomicUsize,
}

impl PaperBroker {
    pub fn new(market: PaperMarket) -> Self {
        info!(
            symbol = market.symbol,
            ticks = market.ticks.len(),
            expiries = market.expiries.len(),
            "Paper broker ready"
        );
        Self {
            market,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn market(&self) -> &PaperMarket {
        &self.market
    }

    /// Ticks served so far.
    pub fn ticks_served(&self) -> usize {
        self.cursor.load(Ordering::SeqCst).min(self.market.ticks.len())
    }

    fn check_symbol(&self, symbol: &str) -> Result<()> {
        if !symbol.eq_ignore_ascii_case(&self.market.symbol) {
            bail!(
                "paper market serves {}, not {symbol}",
                self.market.symbol
            );
        }
        Ok(())
    }
}

#[async_trait]
impl Broker for PaperBroker {
    async fn last_price(&self, symbol: &str) -> Result<Decimal> {
        self.check_symbol(symbol)?;
        let ticks = &self.market.ticks;
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        let Some(price) = ticks.get(index).or_else(|| ticks.last()) else {
            bail!("no ticks recorded for {symbol}");
        };
        debug!(symbol, %price, index, "Paper tick");
        Ok(*price)
    }

    async fn option_expiries(&self, symbol: &str) -> Result<Vec<NaiveDate>> {
        self.check_symbol(symbol)?;
        Ok(self.market.expiries.clone())
    }

    async fn market_depth(&self, contract: &OptionContract) -> Result<MarketDepth> {
        self.check_symbol(&contract.underlying)?;
        Ok(self.market.depth_for(&contract.symbol))
    }

    /// Daily requests get the recorded daily candles, everything else the
    /// intraday ones. The requested window is not applied to the recording.
    async fn candles(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>> {
        self.check_symbol(symbol)?;
        debug!(symbol, %from, %to, %timeframe, "Paper candles");
        Ok(match timeframe {
            Timeframe::Day => self.market.daily_candles.clone(),
            _ => self.market.intraday_candles.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calspread_core::{DepthLevel, OptionKind};
    use rust_decimal_macros::dec;

    fn market() -> PaperMarket {
        PaperMarket {
            symbol: "NIFTY".to_string(),
            ticks: vec![dec!(100), dec!(105), dec!(121)],
            expiries: vec![NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()],
            default_depth: Some(MarketDepth {
                bids: vec![DepthLevel::new(dec!(10), 50, 1)],
                asks: vec![DepthLevel::new(dec!(10.5), 50, 1)],
            }),
            ..PaperMarket::default()
        }
    }

    #[tokio::test]
    async fn replays_ticks_then_repeats_last() {
        let broker = PaperBroker::new(market());
        let mut seen = vec![];
        for _ in 0..5 {
            seen.push(broker.last_price("NIFTY").await.unwrap());
        }
        assert_eq!(
            seen,
            vec![dec!(100), dec!(105), dec!(121), dec!(121), dec!(121)]
        );
        assert_eq!(broker.ticks_served(), 3);
    }

    #[tokio::test]
    async fn symbol_match_is_case_insensitive() {
        let broker = PaperBroker::new(market());
        assert!(broker.last_price("nifty").await.is_ok());
        assert!(broker.last_price("BANKNIFTY").await.is_err());
        assert!(broker.option_expiries("BANKNIFTY").await.is_err());
    }

    #[tokio::test]
    async fn serves_depth_for_any_contract_of_the_underlying() {
        let broker = PaperBroker::new(market());
        let contract = OptionContract::new(
            "NIFTY",
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            dec!(22000),
            OptionKind::Call,
        );
        let depth = broker.market_depth(&contract).await.unwrap();
        assert_eq!(depth.asks[0].price, dec!(10.5));
    }

    #[tokio::test]
    async fn splits_candles_by_timeframe() {
        let candle = |close| Candle {
            timestamp: Utc::now(),
            open: close,
            high: close,
            low: close,
            close,
            volume: Decimal::ZERO,
            open_interest: Decimal::ZERO,
        };
        let broker = PaperBroker::new(PaperMarket {
            daily_candles: vec![candle(dec!(1))],
            intraday_candles: vec![candle(dec!(2)), candle(dec!(3))],
            ..market()
        });
        let now = Utc::now();

        let daily = broker.candles("NIFTY", now, now, Timeframe::Day).await.unwrap();
        let intraday = broker
            .candles("NIFTY", now, now, Timeframe::Minute5)
            .await
            .unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(intraday.len(), 2);
    }
}
