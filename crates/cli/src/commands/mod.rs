//! CLI commands for the calendar-spread engine.

pub mod run;
pub mod show_trade;
pub mod validate;

pub use run::{run_engine, RunArgs};
pub use show_trade::{run_show_trade, ShowTradeArgs};
pub use validate::{run_validate, ValidateArgs};
