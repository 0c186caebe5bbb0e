//! Deterministic ATM calendar-spread management.
//!
//! Decides when to open a short near-dated option against a long monthly
//! hedge at the same in-the-money strike, prices both legs off market depth,
//! and closes them on stop-loss, target, trailing stop or square-off.
//!
//! Pure building blocks (`pricing`, `strikes`, `expiry`, `calendar`,
//! `trailing`) feed the `PositionBuilder` and the `TradeLifecycle` engine;
//! `service` is the polling driver.

pub mod calendar;
pub mod error;
pub mod expiry;
pub mod lifecycle;
pub mod messages;
pub mod notifications;
pub mod persistence;
pub mod positions;
pub mod pricing;
pub mod service;
pub mod strikes;
pub mod trade;
pub mod trailing;

pub use error::{ManagerError, PersistenceError};
pub use lifecycle::{TickOutcome, TradeLifecycle};
pub use notifications::{ExitEvent, ExitNotifications, ExitNotifier, TrailEvent};
pub use persistence::TradeStore;
pub use positions::{BuiltPositions, PositionBuilder};
pub use trade::{CloseReason, DepthVolumes, LifecycleState, Trade};
pub use trailing::TrailUpdate;
