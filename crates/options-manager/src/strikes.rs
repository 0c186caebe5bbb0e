//! Strike selection.

use calspread_core::Direction;
use rust_decimal::Decimal;

/// Nearest strike on the `increment` grid that is in the money for the leg
/// the trade sells.
///
/// `last_price` is first floored to the grid. A bullish trade (selling puts)
/// bumps the strike one increment up when the floor sits below the price; a
/// bearish trade (selling calls) drops one increment when the floor sits
/// above it. Exact multiples are returned unchanged.
pub fn nearest_itm_strike(last_price: Decimal, direction: Direction, increment: Decimal) -> Decimal {
    if increment <= Decimal::ZERO {
        return last_price;
    }
    let floored = (last_price / increment).floor() * increment;
    match direction {
        Direction::Buy if floored < last_price => floored + increment,
        Direction::Sell if floored > last_price => floored - increment,
        _ => floored,
    }
}
