//! Paper market for the calendar-spread engine.
//!
//! Replays a recorded JSON snapshot (underlying ticks, option expiries, depth
//! ladders, candles and a signal) through the core `Broker` and
//! `SignalOracle` traits, so the full lifecycle can run without a live
//! broker connection.

pub mod broker;
pub mod market;
pub mod oracle;

pub use broker::PaperBroker;
pub use market::{MarketError, PaperMarket};
pub use oracle::ReplaySignalOracle;
