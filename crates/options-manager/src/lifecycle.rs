//! The trade lifecycle engine: Flat -> PendingEntry -> InPosition -> Flat.
//!
//! The engine owns the single active [`Trade`]. Every method takes
//! `&mut self`, so the driver serializes calls by construction. Broker and
//! oracle are injected capabilities; time comes from the injected [`Clock`]
//! and is converted to the strategy's time zone, parsed once at construction.

use std::sync::Arc;
use std::time::Duration;

use calspread_core::{
    Broker, Candle, Clock, ConfigError, Direction, Holidays, Settings, SignalOracle, Timeframe,
};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::calendar;
use crate::error::ManagerError;
use crate::messages;
use crate::notifications::{ExitEvent, ExitNotifications, ExitNotifier, TrailEvent};
use crate::persistence::TradeStore;
use crate::positions::PositionBuilder;
use crate::trade::{CloseReason, LifecycleState, Trade};
use crate::trailing::{self, TrailUpdate};

/// What a single tick did to the open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not in position, nothing evaluated.
    Ignored,
    /// In position, nothing changed.
    Holding,
    /// Trailing stop changed, position still open.
    Trailed(TrailUpdate),
    /// Position closed at the stop-loss.
    StopLossHit,
    /// Position closed at the target.
    TargetHit,
}

/// ATM calendar-spread trade lifecycle.
pub struct TradeLifecycle {
    settings: Settings,
    holidays: Holidays,
    tz: Tz,
    broker: Arc<dyn Broker>,
    oracle: Arc<dyn SignalOracle>,
    clock: Arc<dyn Clock>,
    notifier: ExitNotifier,
    store: Option<TradeStore>,
    trade: Trade,
}

impl TradeLifecycle {
    /// Builds the engine after validating `settings`.
    ///
    /// Returns the engine together with the receiving ends of its exit
    /// notification queues.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings violate an invariant; no engine is
    /// created in that case.
    pub fn new(
        settings: Settings,
        holidays: Holidays,
        broker: Arc<dyn Broker>,
        oracle: Arc<dyn SignalOracle>,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, ExitNotifications), ConfigError> {
        settings.validate()?;
        let tz = settings.tz()?;
        let store = settings.trade_file_path.as_ref().map(TradeStore::new);
        let (notifier, notifications) = ExitNotifier::channel(settings.notification_buffer);

        info!(
            symbol = settings.symbol,
            timezone = %tz,
            holidays = holidays.len(),
            "Trade lifecycle initialised"
        );

        Ok((
            Self {
                settings,
                holidays,
                tz,
                broker,
                oracle,
                clock,
                notifier,
                store,
                trade: Trade::default(),
            },
            notifications,
        ))
    }

    /// Replaces the snapshot store (or disables it with `None`).
    #[must_use]
    pub fn with_store(mut self, store: Option<TradeStore>) -> Self {
        self.store = store;
        self
    }

    /// Loads the persisted trade if `load_from_persisted_state` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read.
    pub fn restore(&mut self) -> Result<LifecycleState, ManagerError> {
        if !self.settings.load_from_persisted_state {
            return Ok(self.state());
        }
        if let Some(store) = &self.store {
            self.trade = store.load()?;
        }
        info!(state = %self.state(), "Trade state restored");
        Ok(self.state())
    }

    pub fn state(&self) -> LifecycleState {
        self.trade.state()
    }

    pub fn in_position(&self) -> bool {
        self.trade.in_position
    }

    /// The current trade, for logging and messaging.
    pub fn trade(&self) -> &Trade {
        &self.trade
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn sleep_duration(&self) -> Duration {
        self.settings.sleep_duration()
    }

    /// Latest underlying price, the tick fed to [`Self::exit_on_tick`].
    ///
    /// # Errors
    ///
    /// Returns the broker's failure.
    pub async fn last_price(&self) -> Result<Decimal, ManagerError> {
        Ok(self.broker.last_price(&self.settings.symbol).await?)
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn local_now(&self) -> DateTime<Tz> {
        self.now().with_timezone(&self.tz)
    }

    fn today(&self) -> NaiveDate {
        self.local_now().date_naive()
    }

    /// True on trading days between market open and close, local time.
    pub fn in_trading_window(&self) -> bool {
        let now = self.local_now();
        let time = now.time();
        self.holidays.is_trading_day(now.date_naive())
            && time >= self.settings.market_open
            && time < self.settings.market_close
    }

    /// True once the configured square-off time has passed today.
    pub fn past_square_off(&self) -> bool {
        self.settings
            .square_off_time
            .is_some_and(|cutoff| self.local_now().time() >= cutoff)
    }

    /// Evaluates the signal oracle and records an actionable signal on the
    /// pending trade.
    ///
    /// Data failures are logged and reported as "not satisfied".
    pub async fn is_entry_satisfied(&mut self) -> bool {
        if self.trade.in_position {
            return false;
        }
        if self.trade.is_closed() {
            debug!("Previous trade closed, starting a fresh one");
            self.trade = Trade::default();
        }

        let (previous_day, current_day) = match self.fetch_candles().await {
            Ok(candles) => candles,
            Err(e) => {
                warn!(error = %e, "Entry check failed");
                self.clear_pending();
                return false;
            }
        };

        let signal = self.oracle.compute_signal(
            self.settings.min_sl_percent,
            self.settings.min_target_percent,
            &previous_day,
            &current_day,
        );

        if !signal.is_actionable() {
            debug!("Signal neutral");
            self.clear_pending();
            return false;
        }

        self.trade.apply_signal(&signal);
        info!(
            direction = %signal.direction,
            entry = %signal.entry_price,
            stop_loss = %signal.stop_loss_price,
            target = %signal.target_price,
            "Entry satisfied"
        );
        self.persist();
        true
    }

    fn clear_pending(&mut self) {
        if self.trade.entry_satisfied {
            self.trade.entry_satisfied = false;
            self.persist();
        }
    }

    /// Previous trading day's daily candles and today's 5-minute candles.
    async fn fetch_candles(&self) -> Result<(Vec<Candle>, Vec<Candle>), ManagerError> {
        let now = self.now();
        let today = self.today();
        let previous = calendar::previous_trading_day(today, &self.holidays);
        let symbol = self.settings.symbol.as_str();

        let current_day = self
            .broker
            .candles(
                symbol,
                self.at_local(today, self.settings.market_open)?,
                now,
                Timeframe::Minute5,
            )
            .await?;
        let previous_day = self
            .broker
            .candles(
                symbol,
                self.at_local(previous, self.settings.market_open)?,
                self.at_local(previous, self.settings.market_close)?,
                Timeframe::Day,
            )
            .await?;

        if current_day.is_empty() {
            return Err(ManagerError::DataUnavailable(format!(
                "no 5m candles for {symbol} on {today}"
            )));
        }
        if previous_day.is_empty() {
            return Err(ManagerError::DataUnavailable(format!(
                "no daily candle for {symbol} on {previous}"
            )));
        }
        Ok((previous_day, current_day))
    }

    fn at_local(&self, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, ManagerError> {
        self.tz
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            .ok_or_else(|| {
                ManagerError::DataUnavailable(format!("{date} {time} does not exist in {}", self.tz))
            })
    }

    /// Opens the calendar spread in `direction`.
    ///
    /// Only a pending entry can be opened, and only in the direction of the
    /// signal recorded by [`Self::is_entry_satisfied`].
    ///
    /// # Errors
    ///
    /// Fails if already in position, if `direction` is neutral, if no entry
    /// is pending, if `direction` differs from the pending signal, or if the
    /// legs cannot be built. The trade is untouched on failure.
    pub async fn enter(&mut self, direction: Direction) -> Result<(), ManagerError> {
        if self.trade.in_position {
            return Err(ManagerError::AlreadyInPosition {
                since: self
                    .trade
                    .entry_time
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
            });
        }
        if direction == Direction::Neutral {
            return Err(ManagerError::NeutralDirection);
        }
        if self.state() != LifecycleState::PendingEntry {
            return Err(ManagerError::NoPendingEntry);
        }
        if direction != self.trade.direction {
            return Err(ManagerError::DirectionMismatch {
                requested: direction,
                pending: self.trade.direction,
            });
        }

        let built = PositionBuilder::new(self.broker.as_ref(), &self.settings)
            .build_entry_positions(direction, self.local_now())
            .await?;

        let now = self.now();
        self.trade.open(direction, built.positions, built.depth, now);
        info!(
            direction = %direction,
            legs = self.trade.entry_positions.len(),
            entry = %self.trade.entry_price,
            stop_loss = %self.trade.stop_loss_price,
            target = %self.trade.target_price,
            "Position opened"
        );
        self.persist();
        Ok(())
    }

    /// Runs the exit monitor for one underlying tick.
    ///
    /// Order: trailing-stop update, stop-loss check, target check. A hit
    /// closes the position and publishes exactly one exit event; otherwise a
    /// trailing-stop change publishes one trail event.
    ///
    /// # Errors
    ///
    /// Fails only when a hit was detected but the closing legs could not be
    /// built; the position then stays open and the next tick retries.
    pub async fn exit_on_tick(&mut self, tick: Decimal) -> Result<TickOutcome, ManagerError> {
        if !self.trade.in_position {
            return Ok(TickOutcome::Ignored);
        }

        let trail = trailing::update_trailing_stop(
            &mut self.trade,
            tick,
            self.settings.min_trail_percent,
        );

        let hit = if self.trade.is_stop_loss_hit(tick) {
            Some((CloseReason::StopLoss, self.trade.stop_loss_price))
        } else if self.trade.is_target_hit(tick) {
            Some((CloseReason::Target, self.trade.target_price))
        } else {
            None
        };

        if let Some((reason, level)) = hit {
            info!(%tick, %level, %reason, "Exit level crossed");
            if let Err(e) = self.close(reason).await {
                if trail.is_some() {
                    self.persist();
                }
                return Err(e);
            }
            let event = ExitEvent {
                tick_price: tick,
                level,
                at: self.now(),
            };
            return Ok(match reason {
                CloseReason::StopLoss => {
                    self.notifier.stop_loss_hit(event);
                    TickOutcome::StopLossHit
                }
                _ => {
                    self.notifier.target_hit(event);
                    TickOutcome::TargetHit
                }
            });
        }

        match trail {
            Some(update) => {
                info!(%tick, ?update, "Trailing stop updated");
                self.persist();
                self.notifier.trail_update(TrailEvent {
                    tick_price: tick,
                    update,
                    at: self.now(),
                });
                Ok(TickOutcome::Trailed(update))
            }
            None => {
                debug!(%tick, "Holding");
                Ok(TickOutcome::Holding)
            }
        }
    }

    /// Closes the position now, regardless of price. No notification.
    ///
    /// # Errors
    ///
    /// Fails if not in position or if the closing legs cannot be built.
    pub async fn exit_now(&mut self) -> Result<(), ManagerError> {
        if !self.trade.in_position {
            return Err(ManagerError::NotInPosition);
        }
        self.close(CloseReason::Forced).await
    }

    async fn close(&mut self, reason: CloseReason) -> Result<(), ManagerError> {
        let built = PositionBuilder::new(self.broker.as_ref(), &self.settings)
            .build_exit_positions(&self.trade.entry_positions)
            .await?;

        let now = self.now();
        self.trade.close(built.positions, built.depth, reason, now);
        info!(%reason, legs = self.trade.exit_positions.len(), "Position closed");
        self.persist();
        Ok(())
    }

    /// Writes the snapshot; failures are logged and never undo a transition.
    fn persist(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.trade) {
                warn!(path = %store.path().display(), error = %e, "Failed to persist trade");
            }
        }
    }

    pub fn entry_message(&self) -> String {
        messages::entry_message(&self.settings.symbol, &self.trade, self.tz)
    }

    pub fn exit_message(&self) -> String {
        messages::exit_message(&self.trade, self.tz)
    }

    pub fn csv_entry_rows(&self) -> Vec<String> {
        messages::csv_entry_rows(&self.trade, self.tz)
    }

    pub fn csv_exit_rows(&self) -> Vec<String> {
        messages::csv_exit_rows(&self.trade, self.tz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use calspread_core::{
        DepthLevel, ManualClock, MarketDepth, OptionContract, Signal,
    };
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct TestBroker {
        candles: Mutex<Vec<Candle>>,
        depth_down: AtomicBool,
        requested: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>, Timeframe)>>,
    }

    impl TestBroker {
        fn new() -> Self {
            Self {
                candles: Mutex::new(vec![candle()]),
                depth_down: AtomicBool::new(false),
                requested: Mutex::new(vec![]),
            }
        }
    }

    fn candle() -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 3, 45, 0).unwrap(),
            open: dec!(100),
            high: dec!(101),
            low: dec!(99),
            close: dec!(100),
            volume: dec!(1000),
            open_interest: Decimal::ZERO,
        }
    }

    #[async_trait]
    impl Broker for TestBroker {
        async fn last_price(&self, _symbol: &str) -> Result<Decimal> {
            Ok(dec!(21950))
        }

        async fn option_expiries(&self, _symbol: &str) -> Result<Vec<NaiveDate>> {
            Ok(vec![
                NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 28).unwrap(),
            ])
        }

        async fn market_depth(&self, _contract: &OptionContract) -> Result<MarketDepth> {
            if self.depth_down.load(Ordering::SeqCst) {
                anyhow::bail!("depth feed down");
            }
            Ok(MarketDepth {
                bids: vec![DepthLevel::new(dec!(100), 10, 1)],
                asks: vec![DepthLevel::new(dec!(101), 10, 1)],
            })
        }

        async fn candles(
            &self,
            _symbol: &str,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
            timeframe: Timeframe,
        ) -> Result<Vec<Candle>> {
            self.requested.lock().unwrap().push((from, to, timeframe));
            Ok(self.candles.lock().unwrap().clone())
        }
    }

    struct FixedOracle(Mutex<Signal>);

    impl SignalOracle for FixedOracle {
        fn compute_signal(
            &self,
            _min_sl: Decimal,
            _min_target: Decimal,
            _previous_day: &[Candle],
            _current_day: &[Candle],
        ) -> Signal {
            self.0.lock().unwrap().clone()
        }
    }

    fn buy_signal() -> Signal {
        Signal {
            direction: Direction::Buy,
            entry_price: dec!(100),
            stop_loss_price: dec!(90),
            target_price: dec!(120),
        }
    }

    struct Harness {
        engine: TradeLifecycle,
        rx: ExitNotifications,
        broker: Arc<TestBroker>,
        oracle: Arc<FixedOracle>,
    }

    fn harness() -> Harness {
        let broker = Arc::new(TestBroker::new());
        let oracle = Arc::new(FixedOracle(Mutex::new(buy_signal())));
        // Monday 2024-03-04 10:00 IST
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 4, 4, 30, 0).unwrap()));
        let settings = Settings {
            min_trail_percent: dec!(5),
            min_target_percent: dec!(10),
            quantity: 50,
            min_days_to_expiry: 7,
            tick_size: dec!(0.05),
            ..Settings::default()
        };
        let (engine, rx) = TradeLifecycle::new(
            settings,
            Holidays::default(),
            broker.clone(),
            oracle.clone(),
            clock,
        )
        .unwrap();
        Harness {
            engine,
            rx,
            broker,
            oracle,
        }
    }

    #[test]
    fn invalid_settings_prevent_construction() {
        let settings = Settings {
            tick_size: Decimal::ZERO,
            ..Settings::default()
        };
        let result = TradeLifecycle::new(
            settings,
            Holidays::default(),
            Arc::new(TestBroker::new()),
            Arc::new(FixedOracle(Mutex::new(Signal::neutral()))),
            Arc::new(calspread_core::SystemClock),
        );
        assert!(matches!(result, Err(ConfigError::NonPositiveTickSize(_))));
    }

    #[tokio::test]
    async fn entry_satisfied_records_signal() {
        let mut h = harness();
        assert!(h.engine.is_entry_satisfied().await);
        assert_eq!(h.engine.state(), LifecycleState::PendingEntry);
        assert_eq!(h.engine.trade().entry_price, dec!(100));
        assert_eq!(h.engine.trade().stop_loss_price, dec!(90));
        assert_eq!(h.engine.trade().direction, Direction::Buy);
    }

    #[tokio::test]
    async fn candle_windows_use_previous_trading_day() {
        let mut h = harness();
        h.engine.is_entry_satisfied().await;

        let requested = h.broker.requested.lock().unwrap().clone();
        assert_eq!(requested.len(), 2);
        // today 09:15 IST -> now
        assert_eq!(requested[0].0, Utc.with_ymd_and_hms(2024, 3, 4, 3, 45, 0).unwrap());
        assert_eq!(requested[0].2, Timeframe::Minute5);
        // previous Friday 09:15 -> 15:30 IST
        assert_eq!(requested[1].0, Utc.with_ymd_and_hms(2024, 3, 1, 3, 45, 0).unwrap());
        assert_eq!(requested[1].1, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
        assert_eq!(requested[1].2, Timeframe::Day);
    }

    #[tokio::test]
    async fn neutral_signal_clears_stale_flag() {
        let mut h = harness();
        assert!(h.engine.is_entry_satisfied().await);

        *h.oracle.0.lock().unwrap() = Signal::neutral();
        assert!(!h.engine.is_entry_satisfied().await);
        assert_eq!(h.engine.state(), LifecycleState::Flat);
    }

    #[tokio::test]
    async fn missing_candles_are_not_satisfied() {
        let mut h = harness();
        h.broker.candles.lock().unwrap().clear();
        assert!(!h.engine.is_entry_satisfied().await);
        assert_eq!(h.engine.state(), LifecycleState::Flat);
    }

    #[tokio::test]
    async fn failed_entry_stays_pending() {
        let mut h = harness();
        h.engine.is_entry_satisfied().await;
        h.broker.depth_down.store(true, Ordering::SeqCst);

        assert!(h.engine.enter(Direction::Buy).await.is_err());
        assert_eq!(h.engine.state(), LifecycleState::PendingEntry);
        assert!(h.engine.trade().entry_positions.is_empty());
    }

    #[tokio::test]
    async fn enter_requires_a_pending_entry() {
        let mut h = harness();
        assert!(matches!(
            h.engine.enter(Direction::Buy).await,
            Err(ManagerError::NoPendingEntry)
        ));
        assert_eq!(h.engine.state(), LifecycleState::Flat);
        assert!(h.engine.trade().entry_positions.is_empty());

        // a closed trade keeps its old levels but is not pending
        h.engine.is_entry_satisfied().await;
        h.engine.enter(Direction::Buy).await.unwrap();
        h.engine.exit_now().await.unwrap();
        assert!(matches!(
            h.engine.enter(Direction::Buy).await,
            Err(ManagerError::NoPendingEntry)
        ));
        assert_eq!(h.engine.state(), LifecycleState::Flat);
    }

    #[tokio::test]
    async fn enter_must_follow_pending_direction() {
        let mut h = harness();
        assert!(h.engine.is_entry_satisfied().await);

        assert!(matches!(
            h.engine.enter(Direction::Sell).await,
            Err(ManagerError::DirectionMismatch {
                requested: Direction::Sell,
                pending: Direction::Buy,
            })
        ));
        assert!(matches!(
            h.engine.enter(Direction::Neutral).await,
            Err(ManagerError::NeutralDirection)
        ));
        assert_eq!(h.engine.state(), LifecycleState::PendingEntry);
        assert!(h.engine.trade().entry_positions.is_empty());

        h.engine.enter(Direction::Buy).await.unwrap();
        assert_eq!(h.engine.state(), LifecycleState::InPosition);
    }

    #[tokio::test]
    async fn cannot_enter_twice() {
        let mut h = harness();
        h.engine.is_entry_satisfied().await;
        h.engine.enter(Direction::Buy).await.unwrap();
        assert!(matches!(
            h.engine.enter(Direction::Buy).await,
            Err(ManagerError::AlreadyInPosition { .. })
        ));
        assert!(!h.engine.is_entry_satisfied().await);
    }

    #[tokio::test]
    async fn stop_loss_wins_over_target_on_same_tick() {
        let mut h = harness();
        h.engine.is_entry_satisfied().await;
        h.engine.enter(Direction::Buy).await.unwrap();
        // inverted levels so one tick crosses both
        h.engine.trade.target_price = dec!(85);

        let outcome = h.engine.exit_on_tick(dec!(85)).await.unwrap();
        assert_eq!(outcome, TickOutcome::StopLossHit);
        assert!(h.engine.trade().stop_loss_hit);
        assert!(!h.engine.trade().target_hit);
        assert!(h.rx.stop_loss_hit.try_recv().is_ok());
        assert!(h.rx.target_hit.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_exit_keeps_position_and_stays_silent() {
        let mut h = harness();
        h.engine.is_entry_satisfied().await;
        h.engine.enter(Direction::Buy).await.unwrap();
        h.broker.depth_down.store(true, Ordering::SeqCst);

        assert!(h.engine.exit_on_tick(dec!(80)).await.is_err());
        assert!(h.engine.in_position());
        assert!(h.rx.stop_loss_hit.try_recv().is_err());

        h.broker.depth_down.store(false, Ordering::SeqCst);
        assert_eq!(
            h.engine.exit_on_tick(dec!(80)).await.unwrap(),
            TickOutcome::StopLossHit
        );
        assert_eq!(h.rx.stop_loss_hit.try_recv().unwrap().tick_price, dec!(80));
    }

    #[tokio::test]
    async fn exit_now_closes_without_notification() {
        let mut h = harness();
        h.engine.is_entry_satisfied().await;
        h.engine.enter(Direction::Buy).await.unwrap();

        h.engine.exit_now().await.unwrap();
        assert_eq!(h.engine.state(), LifecycleState::Flat);
        assert_eq!(h.engine.trade().close_reason, Some(CloseReason::Forced));
        assert_eq!(h.engine.trade().exit_positions.len(), 2);
        assert!(h.rx.stop_loss_hit.try_recv().is_err());
        assert!(h.rx.target_hit.try_recv().is_err());
        assert!(matches!(
            h.engine.exit_now().await,
            Err(ManagerError::NotInPosition)
        ));
    }

    #[tokio::test]
    async fn ticks_are_ignored_while_flat() {
        let mut h = harness();
        assert_eq!(
            h.engine.exit_on_tick(dec!(50)).await.unwrap(),
            TickOutcome::Ignored
        );
    }

    #[tokio::test]
    async fn closed_trade_is_replaced_on_next_entry_check() {
        let mut h = harness();
        h.engine.is_entry_satisfied().await;
        h.engine.enter(Direction::Buy).await.unwrap();
        h.engine.exit_now().await.unwrap();
        assert!(h.engine.trade().is_closed());

        assert!(h.engine.is_entry_satisfied().await);
        assert!(h.engine.trade().exit_positions.is_empty());
        assert!(h.engine.trade().exit_time.is_none());
    }

    #[tokio::test]
    async fn trading_window_respects_hours_and_weekends() {
        let broker = Arc::new(TestBroker::new());
        let oracle = Arc::new(FixedOracle(Mutex::new(Signal::neutral())));
        // Monday 2024-03-04 08:00 IST
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 4, 2, 30, 0).unwrap());
        let settings = Settings {
            square_off_time: NaiveTime::from_hms_opt(15, 15, 0),
            ..Settings::default()
        };
        let (engine, _rx) = TradeLifecycle::new(
            settings,
            Holidays::default(),
            broker,
            oracle,
            Arc::new(clock.clone()),
        )
        .unwrap();

        assert!(!engine.in_trading_window());
        clock.set(Utc.with_ymd_and_hms(2024, 3, 4, 4, 0, 0).unwrap()); // 09:30
        assert!(engine.in_trading_window());
        assert!(!engine.past_square_off());
        clock.set(Utc.with_ymd_and_hms(2024, 3, 4, 9, 50, 0).unwrap()); // 15:20
        assert!(engine.past_square_off());
        clock.set(Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap()); // 15:30
        assert!(!engine.in_trading_window());
        clock.set(Utc.with_ymd_and_hms(2024, 3, 2, 4, 0, 0).unwrap()); // Saturday
        assert!(!engine.in_trading_window());
    }

    #[tokio::test]
    async fn transitions_are_persisted_and_restored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trade.json");
        let store = TradeStore::new(&path);

        let mut h = harness();
        h.engine = h.engine.with_store(Some(store.clone()));
        h.engine.is_entry_satisfied().await;
        h.engine.enter(Direction::Buy).await.unwrap();
        assert!(store.load().unwrap().in_position);

        let settings = Settings {
            load_from_persisted_state: true,
            ..h.engine.settings().clone()
        };
        let (restored, _rx) = TradeLifecycle::new(
            settings,
            Holidays::default(),
            h.broker.clone(),
            h.oracle.clone(),
            Arc::new(calspread_core::SystemClock),
        )
        .unwrap();
        let mut restored = restored.with_store(Some(store));
        assert_eq!(restored.restore().unwrap(), LifecycleState::InPosition);
        assert_eq!(restored.trade(), h.engine.trade());
    }
}
