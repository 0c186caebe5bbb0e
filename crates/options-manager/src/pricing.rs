//! Depth-weighted leg pricing with tick-size rounding.
//!
//! Levels are weighted by `quantity * orders`. The weighted average is snapped
//! to the tick grid and never rounded down across a tick: the taker always
//! quotes at or above the raw average.

use calspread_core::DepthLevel;
use rust_decimal::{Decimal, RoundingStrategy};

/// Price and total volume of one side of a depth ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DepthQuote {
    /// Tick-rounded weighted average, zero when there is no liquidity.
    pub price: Decimal,
    /// Sum of `quantity * orders` across all levels.
    pub volume: Decimal,
}

impl DepthQuote {
    pub fn has_liquidity(&self) -> bool {
        !self.price.is_zero()
    }
}

/// Volume-weighted average price of `levels`, rounded up onto the tick grid.
///
/// Returns zero when the ladder has no volume.
pub fn average_price(levels: &[DepthLevel], tick_size: Decimal) -> Decimal {
    weighted_quote(levels, tick_size).price
}

/// Like [`average_price`] but also reports the volume the price was taken over.
pub fn weighted_quote(levels: &[DepthLevel], tick_size: Decimal) -> DepthQuote {
    let mut notional = Decimal::ZERO;
    let mut volume = Decimal::ZERO;
    for level in levels {
        let level_volume = Decimal::from(level.quantity) * Decimal::from(level.orders);
        notional += level.price * level_volume;
        volume += level_volume;
    }

    if volume.is_zero() {
        return DepthQuote::default();
    }

    DepthQuote {
        price: round_up_to_tick(notional / volume, tick_size),
        volume,
    }
}

/// Snaps `price` to a multiple of `tick_size`, bumping up one tick when the
/// truncated multiple is below `price`, then truncates to the tick's decimals.
pub fn round_up_to_tick(price: Decimal, tick_size: Decimal) -> Decimal {
    if tick_size <= Decimal::ZERO {
        return price;
    }
    let mut rounded = (price / tick_size).trunc() * tick_size;
    if rounded < price {
        rounded += tick_size;
    }
    rounded.round_dp_with_strategy(tick_decimals(tick_size), RoundingStrategy::ToZero)
}

/// Number of decimal places in `tick_size` (0.05 -> 2, 0.5 -> 1, 1 -> 0).
fn tick_decimals(tick_size: Decimal) -> u32 {
    tick_size.normalize().scale()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn level(price: Decimal, quantity: i64, orders: i64) -> DepthLevel {
        DepthLevel::new(price, quantity, orders)
    }

    #[test]
    fn on_tick_average_is_unchanged() {
        let levels = [level(dec!(100), 2, 1), level(dec!(101), 2, 1)];
        assert_eq!(average_price(&levels, dec!(0.05)), dec!(100.5));
    }

    #[test]
    fn off_tick_average_rounds_up() {
        // (100*1 + 100.07*2) / 3 = 100.0466..
        let levels = [level(dec!(100), 1, 1), level(dec!(100.07), 2, 1)];
        assert_eq!(average_price(&levels, dec!(0.05)), dec!(100.05));
    }

    #[test]
    fn weights_by_quantity_times_orders() {
        // volumes 10*3 = 30 and 10*1 = 10 -> (30*50 + 10*60) / 40 = 52.5
        let levels = [level(dec!(50), 10, 3), level(dec!(60), 10, 1)];
        let quote = weighted_quote(&levels, dec!(0.05));
        assert_eq!(quote.price, dec!(52.5));
        assert_eq!(quote.volume, dec!(40));
    }

    #[test]
    fn zero_volume_means_no_liquidity() {
        let levels = [level(dec!(100), 0, 5), level(dec!(101), 5, 0)];
        let quote = weighted_quote(&levels, dec!(0.05));
        assert_eq!(quote.price, Decimal::ZERO);
        assert!(!quote.has_liquidity());
        assert_eq!(average_price(&[], dec!(0.05)), Decimal::ZERO);
    }

    #[test]
    fn result_is_on_tick_and_never_below_raw_average() {
        let ticks = [dec!(0.05), dec!(0.1), dec!(0.25), dec!(1)];
        let ladders = [
            vec![level(dec!(12.33), 7, 2), level(dec!(12.41), 3, 5)],
            vec![level(dec!(250.01), 1, 1)],
            vec![
                level(dec!(99.99), 11, 1),
                level(dec!(100.02), 4, 3),
                level(dec!(100.11), 9, 2),
            ],
        ];
        for tick in ticks {
            for ladder in &ladders {
                let mut notional = Decimal::ZERO;
                let mut volume = Decimal::ZERO;
                for l in ladder {
                    let v = Decimal::from(l.quantity * l.orders);
                    notional += l.price * v;
                    volume += v;
                }
                let raw = notional / volume;
                let price = average_price(ladder, tick);
                assert!((price / tick).fract().is_zero(), "{price} not on tick {tick}");
                assert!(price >= raw, "{price} below raw average {raw}");
                assert!(price - raw < tick, "{price} more than a tick above {raw}");
            }
        }
    }

    #[test]
    fn truncates_to_tick_decimals() {
        assert_eq!(round_up_to_tick(dec!(10.001), dec!(0.05)), dec!(10.05));
        assert_eq!(round_up_to_tick(dec!(10.001), dec!(0.5)), dec!(10.5));
        assert_eq!(round_up_to_tick(dec!(10.001), dec!(1)), dec!(11));
        assert_eq!(round_up_to_tick(dec!(10.001), dec!(1)).scale(), 0);
    }
}
