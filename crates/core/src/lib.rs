pub mod config;
pub mod config_loader;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{Holidays, Settings};
pub use config_loader::ConfigLoader;
pub use error::ConfigError;
pub use traits::{Broker, Clock, ManualClock, SignalOracle, SystemClock};
pub use types::{
    Candle, DepthLevel, Direction, MarketDepth, OptionContract, OptionKind, OptionPosition, Side,
    Signal, Timeframe,
};
