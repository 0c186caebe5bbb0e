use crate::error::ConfigError;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// Strategy settings. Loaded once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Underlying symbol (e.g. "NIFTY").
    pub symbol: String,
    /// Gain % at which the trailing stop arms.
    pub min_trail_percent: Decimal,
    pub min_target_percent: Decimal,
    #[serde(alias = "min_stop_loss_percent")]
    pub min_sl_percent: Decimal,
    /// Lots for the short leg; the hedge leg trades half of this.
    pub quantity: i64,
    #[serde(alias = "strikeDiff", default = "default_strike_diff")]
    pub strike_diff: Decimal,
    #[serde(alias = "minDaysToExpiry")]
    pub min_days_to_expiry: i64,
    pub tick_size: Decimal,
    #[serde(default = "default_sleep_secs")]
    pub sleep_duration_secs: u64,
    #[serde(default)]
    pub holidays_file_path: Option<String>,
    #[serde(alias = "tradeFilePath", default)]
    pub trade_file_path: Option<String>,
    #[serde(default)]
    pub load_from_persisted_state: bool,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_market_open")]
    pub market_open: NaiveTime,
    #[serde(default = "default_market_close")]
    pub market_close: NaiveTime,
    /// Forced exit time for an open position, if any.
    #[serde(default)]
    pub square_off_time: Option<NaiveTime>,
    #[serde(default = "default_notification_buffer")]
    pub notification_buffer: usize,
}

fn default_strike_diff() -> Decimal {
    Decimal::from(100)
}

const fn default_sleep_secs() -> u64 {
    60
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_market_open() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN)
}

fn default_market_close() -> NaiveTime {
    NaiveTime::from_hms_opt(15, 30, 0).unwrap_or(NaiveTime::MIN)
}

const fn default_notification_buffer() -> usize {
    16
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            symbol: "NIFTY".to_string(),
            min_trail_percent: Decimal::from(5),
            min_target_percent: Decimal::from(10),
            min_sl_percent: Decimal::from(5),
            quantity: 50,
            strike_diff: default_strike_diff(),
            min_days_to_expiry: 7,
            tick_size: Decimal::new(5, 2),
            sleep_duration_secs: default_sleep_secs(),
            holidays_file_path: None,
            trade_file_path: None,
            load_from_persisted_state: false,
            timezone: default_timezone(),
            market_open: default_market_open(),
            market_close: default_market_close(),
            square_off_time: None,
            notification_buffer: default_notification_buffer(),
        }
    }
}

impl Settings {
    /// Checks the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_size <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveTickSize(self.tick_size));
        }
        if self.min_target_percent < self.min_trail_percent {
            return Err(ConfigError::TargetBelowTrail {
                target: self.min_target_percent,
                trail: self.min_trail_percent,
            });
        }
        if self.quantity < 2 {
            return Err(ConfigError::QuantityTooSmall(self.quantity));
        }
        if self.strike_diff <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveStrikeDiff(self.strike_diff));
        }
        if self.market_open >= self.market_close {
            return Err(ConfigError::InvalidMarketHours {
                open: self.market_open.to_string(),
                close: self.market_close.to_string(),
            });
        }
        self.tz()?;
        Ok(())
    }

    /// The strategy's local time zone.
    ///
    /// # Errors
    ///
    /// Returns an error if `timezone` is not an IANA zone name.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()))
    }

    #[must_use]
    pub const fn sleep_duration(&self) -> Duration {
        Duration::from_secs(self.sleep_duration_secs)
    }
}

/// Dates on which the market does not trade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holidays {
    #[serde(deserialize_with = "deserialize_dates")]
    holiday_dates: BTreeSet<NaiveDate>,
}

fn deserialize_dates<'de, D>(deserializer: D) -> Result<BTreeSet<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<String> = Vec::deserialize(deserializer)?;
    raw.iter()
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(serde::de::Error::custom)
        })
        .collect()
}

impl Holidays {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holiday_dates: dates.into_iter().collect(),
        }
    }

    /// Parses `YYYY-MM-DD` strings.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first string that is not a date.
    pub fn from_strings<S: AsRef<str>>(dates: &[S]) -> Result<Self, ConfigError> {
        let mut holiday_dates = BTreeSet::new();
        for value in dates {
            let value = value.as_ref();
            let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
                ConfigError::InvalidHoliday {
                    value: value.to_string(),
                    reason: e.to_string(),
                }
            })?;
            holiday_dates.insert(date);
        }
        Ok(Self { holiday_dates })
    }

    /// Reads a `{"holiday_dates": [...]}` JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.holiday_dates.contains(&date)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.holiday_dates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holiday_dates.is_empty()
    }

    /// True if the market trades on `date`: a weekday that is not a holiday.
    #[must_use]
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.contains(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_tick_size() {
        let settings = Settings {
            tick_size: dec!(0),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::NonPositiveTickSize(_))
        ));
    }

    #[test]
    fn rejects_target_below_trail() {
        let settings = Settings {
            min_trail_percent: dec!(8),
            min_target_percent: dec!(6),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::TargetBelowTrail { .. })
        ));
    }

    #[test]
    fn target_equal_to_trail_is_allowed() {
        let settings = Settings {
            min_trail_percent: dec!(6),
            min_target_percent: dec!(6),
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_timezone() {
        let settings = Settings {
            timezone: "Mars/Olympus".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::UnknownTimezone(_))
        ));
    }

    #[test]
    fn holidays_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"holiday_dates": ["2024-01-26", "2024-03-08"]}}"#
        )
        .unwrap();

        let holidays = Holidays::load(file.path()).unwrap();
        assert_eq!(holidays.len(), 2);
        assert!(holidays.contains(NaiveDate::from_ymd_opt(2024, 1, 26).unwrap()));
    }

    #[test]
    fn holidays_reject_malformed_dates() {
        let result = Holidays::from_strings(&["2024-13-01"]);
        assert!(matches!(result, Err(ConfigError::InvalidHoliday { .. })));
    }

    #[test]
    fn weekends_and_holidays_are_not_trading_days() {
        let holidays = Holidays::from_strings(&["2024-01-26"]).unwrap();
        // Friday holiday
        assert!(!holidays.is_trading_day(NaiveDate::from_ymd_opt(2024, 1, 26).unwrap()));
        // Saturday
        assert!(!holidays.is_trading_day(NaiveDate::from_ymd_opt(2024, 1, 27).unwrap()));
        // Monday
        assert!(holidays.is_trading_day(NaiveDate::from_ymd_opt(2024, 1, 29).unwrap()));
    }
}
