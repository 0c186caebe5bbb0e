//! The single active trade and the lifecycle states it moves through.

use calspread_core::{Direction, OptionPosition, Signal};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of the engine, derived from the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// No position and no actionable signal.
    Flat,
    /// Signal recorded, waiting for the entry to be built.
    PendingEntry,
    /// Legs open, exit monitor active.
    InPosition,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::PendingEntry => write!(f, "pending_entry"),
            Self::InPosition => write!(f, "in_position"),
        }
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    StopLoss,
    Target,
    Forced,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StopLoss => write!(f, "stop_loss"),
            Self::Target => write!(f, "target"),
            Self::Forced => write!(f, "forced"),
        }
    }
}

/// Depth volumes observed while pricing the two legs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthVolumes {
    pub sell_leg: Decimal,
    pub buy_leg: Decimal,
}

/// The active trade. Serialized as the crash-recovery snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trade {
    pub in_position: bool,
    pub entry_satisfied: bool,
    pub entry_positions: Vec<OptionPosition>,
    pub exit_positions: Vec<OptionPosition>,
    pub entry_time: Option<DateTime<Utc>>,
    pub exit_time: Option<DateTime<Utc>>,
    pub entry_price: Decimal,
    pub stop_loss_price: Decimal,
    pub target_price: Decimal,
    pub trail_stop_loss_price: Decimal,
    pub direction: Direction,
    pub min_trail_hit: bool,
    pub stop_loss_hit: bool,
    pub target_hit: bool,
    pub close_reason: Option<CloseReason>,
    pub entry_depth: DepthVolumes,
    pub exit_depth: DepthVolumes,
}

impl Trade {
    pub fn state(&self) -> LifecycleState {
        if self.in_position {
            LifecycleState::InPosition
        } else if self.entry_satisfied {
            LifecycleState::PendingEntry
        } else {
            LifecycleState::Flat
        }
    }

    /// True once the trade has been entered and exited.
    pub fn is_closed(&self) -> bool {
        !self.in_position && self.exit_time.is_some()
    }

    /// Copies the oracle's levels onto a pending trade.
    pub fn apply_signal(&mut self, signal: &Signal) {
        self.direction = signal.direction;
        self.entry_price = signal.entry_price;
        self.stop_loss_price = signal.stop_loss_price;
        self.target_price = signal.target_price;
        self.entry_satisfied = true;
    }

    pub(crate) fn open(
        &mut self,
        direction: Direction,
        positions: Vec<OptionPosition>,
        depth: DepthVolumes,
        at: DateTime<Utc>,
    ) {
        self.direction = direction;
        self.in_position = true;
        self.entry_satisfied = false;
        self.entry_positions = positions;
        self.exit_positions.clear();
        self.entry_time = Some(at);
        self.exit_time = None;
        self.entry_depth = depth;
        self.exit_depth = DepthVolumes::default();
        self.trail_stop_loss_price = Decimal::ZERO;
        self.min_trail_hit = false;
        self.stop_loss_hit = false;
        self.target_hit = false;
        self.close_reason = None;
    }

    pub(crate) fn close(
        &mut self,
        positions: Vec<OptionPosition>,
        depth: DepthVolumes,
        reason: CloseReason,
        at: DateTime<Utc>,
    ) {
        self.in_position = false;
        self.exit_positions = positions;
        self.exit_depth = depth;
        self.exit_time = Some(at);
        self.close_reason = Some(reason);
        match reason {
            CloseReason::StopLoss => self.stop_loss_hit = true,
            CloseReason::Target => self.target_hit = true,
            CloseReason::Forced => {}
        }
    }

    /// True if `tick` is at or through the stop-loss.
    pub fn is_stop_loss_hit(&self, tick: Decimal) -> bool {
        match self.direction {
            Direction::Buy => tick <= self.stop_loss_price,
            Direction::Sell => tick >= self.stop_loss_price,
            Direction::Neutral => false,
        }
    }

    /// True if `tick` is at or through the target.
    pub fn is_target_hit(&self, tick: Decimal) -> bool {
        match self.direction {
            Direction::Buy => tick >= self.target_price,
            Direction::Sell => tick <= self.target_price,
            Direction::Neutral => false,
        }
    }
}
