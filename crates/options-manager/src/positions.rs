//! Builds the two calendar-spread legs on entry and their closing legs on exit.

use calspread_core::{
    Broker, DepthLevel, Direction, MarketDepth, OptionContract, OptionKind, OptionPosition,
    Settings, Side,
};
use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::error::ManagerError;
use crate::expiry;
use crate::pricing::{self, DepthQuote};
use crate::strikes;
use crate::trade::DepthVolumes;

/// Priced legs plus the depth volume each was priced over.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltPositions {
    pub positions: Vec<OptionPosition>,
    pub depth: DepthVolumes,
}

/// Constructs entry and exit legs from broker data.
pub struct PositionBuilder<'a> {
    broker: &'a dyn Broker,
    settings: &'a Settings,
}

impl<'a> PositionBuilder<'a> {
    pub fn new(broker: &'a dyn Broker, settings: &'a Settings) -> Self {
        Self { broker, settings }
    }

    /// Short near-dated leg plus long monthly hedge leg at the same strike.
    ///
    /// A bullish trade sells puts, a bearish trade sells calls. The hedge
    /// trades half the quantity. Expiry distances are measured from `now` in
    /// the strategy's time zone. Either both legs are priced or nothing is
    /// returned.
    ///
    /// # Errors
    ///
    /// Any broker failure, missing expiry or unpriceable leg.
    pub async fn build_entry_positions(
        &self,
        direction: Direction,
        now: DateTime<Tz>,
    ) -> Result<BuiltPositions, ManagerError> {
        let kind = match direction {
            Direction::Buy => OptionKind::Put,
            Direction::Sell => OptionKind::Call,
            Direction::Neutral => return Err(ManagerError::NeutralDirection),
        };
        let symbol = self.settings.symbol.as_str();

        let ltp = self.broker.last_price(symbol).await?;
        let strike = strikes::nearest_itm_strike(ltp, direction, self.settings.strike_diff);

        let expiries = self.broker.option_expiries(symbol).await?;
        if expiries.is_empty() {
            return Err(ManagerError::DataUnavailable(format!(
                "no option expiries listed for {symbol}"
            )));
        }
        let sell_expiry =
            expiry::nearest_expiry_at_least(now, self.settings.min_days_to_expiry, &expiries)?;
        let buy_expiry = expiry::calendar_spread_expiry(now.date_naive(), sell_expiry, &expiries)?;

        debug!(
            symbol,
            %ltp,
            %strike,
            %sell_expiry,
            %buy_expiry,
            "Selected calendar spread terms"
        );

        let quantity = self.settings.quantity;
        let mut sell_leg = OptionPosition::unpriced(
            OptionContract::new(symbol, sell_expiry, strike, kind),
            Side::Sell,
            quantity,
        );
        let mut buy_leg = OptionPosition::unpriced(
            OptionContract::new(symbol, buy_expiry, strike, kind),
            Side::Buy,
            quantity / 2,
        );

        let sell_quote = self.price_leg(&sell_leg.contract, Ladder::Bids).await?;
        let buy_quote = self.price_leg(&buy_leg.contract, Ladder::Asks).await?;
        sell_leg.price = sell_quote.price;
        buy_leg.price = buy_quote.price;

        info!(
            sell = sell_leg.contract.display_name(),
            sell_price = %sell_leg.price,
            buy = buy_leg.contract.display_name(),
            buy_price = %buy_leg.price,
            "Entry legs priced"
        );

        Ok(BuiltPositions {
            positions: vec![sell_leg, buy_leg],
            depth: DepthVolumes {
                sell_leg: sell_quote.volume,
                buy_leg: buy_quote.volume,
            },
        })
    }

    /// Closing legs for `open`: same contracts and sizes, reversed sides,
    /// priced off the ladder the close would trade against.
    ///
    /// # Errors
    ///
    /// Fails as a whole if any single leg cannot be priced.
    pub async fn build_exit_positions(
        &self,
        open: &[OptionPosition],
    ) -> Result<BuiltPositions, ManagerError> {
        let mut positions = Vec::with_capacity(open.len());
        let mut depth = DepthVolumes::default();

        for leg in open {
            let ladder = match leg.side {
                Side::Buy => Ladder::Bids,
                Side::Sell => Ladder::Asks,
            };
            let quote = self.price_leg(&leg.contract, ladder).await?;
            let closing = leg.closing(quote.price);
            match closing.side {
                Side::Sell => depth.sell_leg += quote.volume,
                Side::Buy => depth.buy_leg += quote.volume,
            }
            positions.push(closing);
        }

        Ok(BuiltPositions { positions, depth })
    }

    async fn price_leg(
        &self,
        contract: &OptionContract,
        ladder: Ladder,
    ) -> Result<DepthQuote, ManagerError> {
        let depth = self.broker.market_depth(contract).await?;
        let levels = ladder.levels(&depth);
        if levels.is_empty() {
            return Err(ManagerError::DataUnavailable(format!(
                "empty {ladder} for {}",
                contract.display_name()
            )));
        }
        let quote = pricing::weighted_quote(levels, self.settings.tick_size);
        if !quote.has_liquidity() {
            return Err(ManagerError::NoLiquidity {
                contract: contract.display_name(),
            });
        }
        Ok(quote)
    }
}

#[derive(Debug, Clone, Copy)]
enum Ladder {
    Bids,
    Asks,
}

impl Ladder {
    fn levels(self, depth: &MarketDepth) -> &[DepthLevel] {
        match self {
            Self::Bids => &depth.bids,
            Self::Asks => &depth.asks,
        }
    }
}

impl std::fmt::Display for Ladder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bids => write!(f, "bids"),
            Self::Asks => write!(f, "asks"),
        }
    }
}
