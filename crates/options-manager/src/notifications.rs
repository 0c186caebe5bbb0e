//! Exit notifications.
//!
//! Three bounded queues (stop-loss hit, target hit, trail update) written
//! with `try_send` right after the trade is mutated. Publishing never blocks
//! the tick path: a full queue drops the event, a dropped receiver is ignored.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::trailing::TrailUpdate;

/// A stop-loss or target hit that closed the position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitEvent {
    /// Underlying tick that triggered the exit.
    pub tick_price: Decimal,
    /// The stop-loss or target level that was crossed.
    pub level: Decimal,
    pub at: DateTime<Utc>,
}

/// A trailing-stop change that did not close the position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailEvent {
    pub tick_price: Decimal,
    pub update: TrailUpdate,
    pub at: DateTime<Utc>,
}

/// Receiving ends handed to the driver.
#[derive(Debug)]
pub struct ExitNotifications {
    pub stop_loss_hit: mpsc::Receiver<ExitEvent>,
    pub target_hit: mpsc::Receiver<ExitEvent>,
    pub trail_update: mpsc::Receiver<TrailEvent>,
}

/// Sending ends owned by the engine.
#[derive(Debug, Clone)]
pub struct ExitNotifier {
    stop_loss_hit: mpsc::Sender<ExitEvent>,
    target_hit: mpsc::Sender<ExitEvent>,
    trail_update: mpsc::Sender<TrailEvent>,
}

impl ExitNotifier {
    /// Creates the three queues with `capacity` slots each (at least one).
    pub fn channel(capacity: usize) -> (Self, ExitNotifications) {
        let capacity = capacity.max(1);
        let (sl_tx, sl_rx) = mpsc::channel(capacity);
        let (target_tx, target_rx) = mpsc::channel(capacity);
        let (trail_tx, trail_rx) = mpsc::channel(capacity);
        (
            Self {
                stop_loss_hit: sl_tx,
                target_hit: target_tx,
                trail_update: trail_tx,
            },
            ExitNotifications {
                stop_loss_hit: sl_rx,
                target_hit: target_rx,
                trail_update: trail_rx,
            },
        )
    }

    pub fn stop_loss_hit(&self, event: ExitEvent) {
        publish(&self.stop_loss_hit, event, "stop_loss_hit");
    }

    pub fn target_hit(&self, event: ExitEvent) {
        publish(&self.target_hit, event, "target_hit");
    }

    pub fn trail_update(&self, event: TrailEvent) {
        publish(&self.trail_update, event, "trail_update");
    }
}

fn publish<T>(tx: &mpsc::Sender<T>, event: T, channel: &'static str) {
    match tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            warn!(channel, "Notification queue full, event dropped");
        }
        Err(TrySendError::Closed(_)) => {
            debug!(channel, "No listener, event dropped");
        }
    }
}
