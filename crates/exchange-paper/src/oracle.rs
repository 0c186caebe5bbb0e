//! Signal oracle that replays a recorded signal.

use calspread_core::{Candle, Signal, SignalOracle};
use rust_decimal::Decimal;
use tracing::debug;

/// Returns the same recorded signal on every evaluation.
#[derive(Debug, Clone, Default)]
pub struct ReplaySignalOracle {
    signal: Signal,
}

impl ReplaySignalOracle {
    pub fn new(signal: Signal) -> Self {
        Self { signal }
    }

    /// Replays `signal`, or stays neutral when there is none.
    pub fn from_recorded(signal: Option<Signal>) -> Self {
        Self::new(signal.unwrap_or_else(Signal::neutral))
    }
}

impl SignalOracle for ReplaySignalOracle {
    fn compute_signal(
        &self,
        _min_sl_percent: Decimal,
        _min_target_percent: Decimal,
        previous_day: &[Candle],
        current_day: &[Candle],
    ) -> Signal {
        // Without candles there is nothing to trade on.
        if previous_day.is_empty() || current_day.is_empty() {
            debug!("No candles, replay oracle stays neutral");
            return Signal::neutral();
        }
        self.signal.clone()
    }
}
