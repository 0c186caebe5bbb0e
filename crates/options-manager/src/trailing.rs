//! Trailing stop-loss: arm once the trade is far enough in profit, then lock
//! the stop at breakeven once price confirms past the trail level.

use calspread_core::Direction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::trade::Trade;

/// A change to the trade's trailing-stop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrailUpdate {
    /// Gain crossed the minimum trail percentage for the first time.
    Armed { trail_stop_loss_price: Decimal },
    /// Price reached the trail level and the stop moved to entry.
    BreakevenLocked { stop_loss_price: Decimal },
}

/// Unrealized gain of the underlying in percent; zero when not in profit.
pub fn gain_percent(direction: Direction, entry: Decimal, tick: Decimal) -> Decimal {
    if entry.is_zero() {
        return Decimal::ZERO;
    }
    let hundred = Decimal::ONE_HUNDRED;
    match direction {
        Direction::Buy if tick > entry => (tick - entry) / entry * hundred,
        Direction::Sell if tick < entry => (entry - tick) / entry * hundred,
        _ => Decimal::ZERO,
    }
}

/// Advances the trailing-stop state of `trade` for one tick.
///
/// The tick that arms the trail never also moves the stop; the breakeven
/// ratchet is evaluated from the following tick on and fires at most once.
pub fn update_trailing_stop(
    trade: &mut Trade,
    tick: Decimal,
    min_trail_percent: Decimal,
) -> Option<TrailUpdate> {
    let entry = trade.entry_price;

    if !trade.min_trail_hit {
        if gain_percent(trade.direction, entry, tick) < min_trail_percent {
            return None;
        }
        let distance = match trade.direction {
            Direction::Buy => entry - trade.stop_loss_price,
            Direction::Sell => trade.stop_loss_price - entry,
            Direction::Neutral => return None,
        };
        trade.min_trail_hit = true;
        trade.trail_stop_loss_price = match trade.direction {
            Direction::Sell => entry - distance,
            _ => entry + distance,
        };
        return Some(TrailUpdate::Armed {
            trail_stop_loss_price: trade.trail_stop_loss_price,
        });
    }

    if trade.stop_loss_price == entry {
        return None;
    }
    let confirmed = match trade.direction {
        Direction::Buy => tick >= trade.trail_stop_loss_price,
        Direction::Sell => tick <= trade.trail_stop_loss_price,
        Direction::Neutral => false,
    };
    if !confirmed {
        return None;
    }
    trade.stop_loss_price = entry;
    Some(TrailUpdate::BreakevenLocked {
        stop_loss_price: entry,
    })
}
