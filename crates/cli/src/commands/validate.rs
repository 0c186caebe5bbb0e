//! Loads and validates settings and the holiday calendar.

use std::path::PathBuf;

use anyhow::{Context, Result};
use calspread_core::ConfigLoader;
use chrono::Utc;
use clap::Args;

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Settings file (TOML or JSON).
    #[arg(short, long, default_value = "config/settings.toml")]
    pub settings: PathBuf,
}

/// Prints the effective settings, failing on the first violated invariant.
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let (settings, holidays) = ConfigLoader::load_with_holidays(&args.settings)
        .with_context(|| format!("Invalid settings in {}", args.settings.display()))?;
    let tz = settings.tz()?;
    let today = Utc::now().with_timezone(&tz).date_naive();

    println!("Settings OK: {}", args.settings.display());
    println!("  symbol:             {}", settings.symbol);
    println!("  quantity:           {} (hedge {})", settings.quantity, settings.quantity / 2);
    println!("  strike step:        {}", settings.strike_diff);
    println!("  tick size:          {}", settings.tick_size);
    println!("  min days to expiry: {}", settings.min_days_to_expiry);
    println!(
        "  sl / trail / target: {}% / {}% / {}%",
        settings.min_sl_percent, settings.min_trail_percent, settings.min_target_percent
    );
    println!(
        "  market hours:       {} - {} {}",
        settings.market_open, settings.market_close, tz
    );
    if let Some(cutoff) = settings.square_off_time {
        println!("  square-off:         {cutoff}");
    }
    println!("  poll interval:      {}s", settings.sleep_duration_secs);
    println!("  holidays:           {}", holidays.len());
    println!(
        "  today ({today}):  {}",
        if holidays.is_trading_day(today) {
            "trading day"
        } else {
            "closed"
        }
    );
    match &settings.trade_file_path {
        Some(path) => println!(
            "  trade snapshot:     {path} (restore: {})",
            settings.load_from_persisted_state
        ),
        None => println!("  trade snapshot:     disabled"),
    }

    Ok(())
}
