use crate::config::{Holidays, Settings};
use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads settings from a TOML or JSON file (by extension), overridden by
    /// `CALSPREAD_`-prefixed environment variables, and validates them.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting settings violate an invariant.
    pub fn load(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
        let path = path.as_ref();
        let figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Figment::new().merge(Json::file(path)),
            _ => Figment::new().merge(Toml::file(path)),
        };

        let settings: Settings = figment
            .merge(Env::prefixed("CALSPREAD_"))
            .extract()
            .map_err(Box::new)?;

        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings, then the holiday calendar they point at.
    ///
    /// A missing `holidays_file_path` yields an empty calendar.
    ///
    /// # Errors
    ///
    /// Returns an error if either file fails to load.
    pub fn load_with_holidays(path: impl AsRef<Path>) -> Result<(Settings, Holidays), ConfigError> {
        let settings = Self::load(path)?;
        let holidays = match &settings.holidays_file_path {
            Some(holidays_path) => Holidays::load(holidays_path)?,
            None => {
                tracing::warn!("No holidays_file_path configured, only weekends are skipped");
                Holidays::default()
            }
        };
        tracing::info!(
            symbol = settings.symbol,
            holidays = holidays.len(),
            "Settings loaded"
        );
        Ok((settings, holidays))
    }
}
