//! Driver loop: polls for entries while flat and feeds ticks while in position.

use calspread_core::Direction;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::ManagerError;
use crate::lifecycle::{TickOutcome, TradeLifecycle};
use crate::notifications::ExitNotifications;

/// What one pass of the driver did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Outside market hours.
    OutsideWindow,
    /// Flat and no actionable signal.
    NoEntry,
    /// Signal was actionable but the legs could not be built.
    EntryFailed,
    Entered(Direction),
    Tick(TickOutcome),
    /// Square-off time reached, position closed.
    SquaredOff,
}

/// One pass of the driver.
///
/// # Errors
///
/// Only surfaces failures of the tick feed and of exits that must be
/// retried; entry failures are logged and reported as [`Step::EntryFailed`].
pub async fn step(engine: &mut TradeLifecycle) -> Result<Step, ManagerError> {
    if !engine.in_trading_window() {
        return Ok(Step::OutsideWindow);
    }

    if engine.in_position() {
        if engine.past_square_off() {
            engine.exit_now().await?;
            info!(message = %engine.exit_message(), "Squared off");
            return Ok(Step::SquaredOff);
        }
        let tick = engine.last_price().await?;
        let outcome = engine.exit_on_tick(tick).await?;
        if matches!(outcome, TickOutcome::StopLossHit | TickOutcome::TargetHit) {
            info!(message = %engine.exit_message(), "Exited");
        }
        return Ok(Step::Tick(outcome));
    }

    if engine.past_square_off() || !engine.is_entry_satisfied().await {
        return Ok(Step::NoEntry);
    }

    let direction = engine.trade().direction;
    match engine.enter(direction).await {
        Ok(()) => {
            info!(message = %engine.entry_message(), "Entered");
            Ok(Step::Entered(direction))
        }
        Err(e) => {
            warn!(error = %e, "Entry failed, staying flat");
            Ok(Step::EntryFailed)
        }
    }
}

/// Runs the driver every `sleep_duration` until `shutdown` flips to true.
///
/// # Errors
///
/// Never fails on its own; step errors are logged and the loop continues.
pub async fn run(
    engine: &mut TradeLifecycle,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    info!(
        symbol = engine.settings().symbol,
        sleep_secs = engine.sleep_duration().as_secs(),
        trail_pct = %engine.settings().min_trail_percent,
        target_pct = %engine.settings().min_target_percent,
        sl_pct = %engine.settings().min_sl_percent,
        "Calendar spread manager started"
    );

    let period = engine.sleep_duration().max(std::time::Duration::from_millis(100));
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
        }

        match step(engine).await {
            Ok(step) => tracing::debug!(?step, state = %engine.state(), "Step complete"),
            Err(e) => error!(error = %e, "Step failed"),
        }
    }

    info!(state = %engine.state(), "Calendar spread manager stopped");
    Ok(())
}

/// Drains all three notification queues, logging each event, until every
/// sender is gone.
pub fn spawn_notification_logger(mut notifications: ExitNotifications) -> JoinHandle<()> {
    tokio::spawn(async move {
        let (mut sl_open, mut target_open, mut trail_open) = (true, true, true);
        while sl_open || target_open || trail_open {
            tokio::select! {
                event = notifications.stop_loss_hit.recv(), if sl_open => match event {
                    Some(e) => warn!(tick = %e.tick_price, level = %e.level, "Stop-loss hit"),
                    None => sl_open = false,
                },
                event = notifications.target_hit.recv(), if target_open => match event {
                    Some(e) => info!(tick = %e.tick_price, level = %e.level, "Target hit"),
                    None => target_open = false,
                },
                event = notifications.trail_update.recv(), if trail_open => match event {
                    Some(e) => info!(tick = %e.tick_price, update = ?e.update, "Trail update"),
                    None => trail_open = false,
                },
            }
        }
    })
}
