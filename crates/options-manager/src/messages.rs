//! Human-readable entry/exit summaries and CSV audit rows for a trade.

use calspread_core::OptionPosition;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::trade::{DepthVolumes, Trade};

fn format_time(at: Option<DateTime<Utc>>, tz: Tz) -> String {
    at.map(|t| t.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn leg_lines(prefix: &str, position: &OptionPosition) -> String {
    format!(
        "{prefix}{} {} at price {:.2}\nexpiry: {}\nquantity: {}\n",
        position.contract.strike.normalize(),
        position.contract.kind,
        position.price,
        position.contract.expiry.format("%Y-%m-%d"),
        position.quantity,
    )
}

fn depth_line(depth: DepthVolumes) -> String {
    format!(
        "depth sell leg: {:.2} depth buy leg: {:.2}",
        depth.sell_leg, depth.buy_leg
    )
}

/// Summary sent when a position is opened.
pub fn entry_message(symbol: &str, trade: &Trade, tz: Tz) -> String {
    let mut parts = vec![format!(
        "{symbol} {}\nEntry: {:.2}\nSL: {:.2}\nTarget: {:.2}\n",
        trade.direction, trade.entry_price, trade.stop_loss_price, trade.target_price,
    )];
    parts.extend(trade.entry_positions.iter().map(|p| leg_lines("", p)));
    parts.push(depth_line(trade.entry_depth));
    parts.push(format!("Entry Time: {}", format_time(trade.entry_time, tz)));
    parts.join("\n")
}

/// Summary sent when a position is closed.
pub fn exit_message(trade: &Trade, tz: Tz) -> String {
    let mut parts: Vec<String> = trade
        .exit_positions
        .iter()
        .map(|p| leg_lines("Exit ", p))
        .collect();
    if let Some(reason) = trade.close_reason {
        parts.push(format!("Reason: {reason}"));
    }
    parts.push(depth_line(trade.exit_depth));
    parts.push(format!("Exit Time: {}", format_time(trade.exit_time, tz)));
    parts.join("\n")
}

fn csv_rows(kind: &str, positions: &[OptionPosition], trade: &Trade, depth: DepthVolumes, tz: Tz) -> Vec<String> {
    positions
        .iter()
        .map(|p| {
            format!(
                "Type:{kind}, Strike: {:.2}, OptionType: {}, Price: {:.2}, TradeType: {}, Quantity: {}, Expiry: {}, TimeOfEntry: {}, TimeOfExit: {}, Available SellQty: {:.2}, Available BuyQty: {:.2}",
                p.contract.strike,
                p.contract.kind,
                p.price,
                p.side,
                p.quantity,
                p.contract.expiry.format("%Y-%m-%d"),
                format_time(trade.entry_time, tz),
                format_time(trade.exit_time, tz),
                depth.sell_leg,
                depth.buy_leg,
            )
        })
        .collect()
}

/// One audit row per entry leg.
pub fn csv_entry_rows(trade: &Trade, tz: Tz) -> Vec<String> {
    csv_rows("Enter", &trade.entry_positions, trade, trade.entry_depth, tz)
}

/// One audit row per exit leg.
pub fn csv_exit_rows(trade: &Trade, tz: Tz) -> Vec<String> {
    csv_rows("Exit", &trade.exit_positions, trade, trade.exit_depth, tz)
}
