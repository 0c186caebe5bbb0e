//! Prints the persisted trade snapshot.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use calspread_core::ConfigLoader;
use calspread_options_manager::{messages, TradeStore};
use clap::Args;

/// Arguments for the show-trade command.
#[derive(Args, Debug)]
pub struct ShowTradeArgs {
    /// Settings file (TOML or JSON).
    #[arg(short, long, default_value = "config/settings.toml")]
    pub settings: PathBuf,

    /// Snapshot to read instead of the configured `trade_file_path`.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Print the raw JSON snapshot.
    #[arg(long)]
    pub json: bool,

    /// Print one CSV audit row per leg.
    #[arg(long)]
    pub csv: bool,
}

pub fn run_show_trade(args: &ShowTradeArgs) -> Result<()> {
    let settings = ConfigLoader::load(&args.settings)
        .with_context(|| format!("Invalid settings in {}", args.settings.display()))?;
    let tz = settings.tz()?;

    let path = match (&args.file, &settings.trade_file_path) {
        (Some(path), _) => path.clone(),
        (None, Some(path)) => PathBuf::from(path),
        (None, None) => bail!("no trade_file_path configured and no --file given"),
    };

    let store = TradeStore::new(&path);
    let trade = store
        .load()
        .with_context(|| format!("Failed to read trade snapshot {}", path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&trade)?);
        return Ok(());
    }

    println!("Trade snapshot: {}", path.display());
    println!("State: {}", trade.state());

    if args.csv {
        for row in messages::csv_entry_rows(&trade, tz)
            .into_iter()
            .chain(messages::csv_exit_rows(&trade, tz))
        {
            println!("{row}");
        }
        return Ok(());
    }

    if !trade.entry_positions.is_empty() {
        println!();
        println!("{}", messages::entry_message(&settings.symbol, &trade, tz));
    }
    if trade.min_trail_hit {
        println!();
        println!(
            "Trail armed at {:.2}, stop now {:.2}",
            trade.trail_stop_loss_price, trade.stop_loss_price
        );
    }
    if trade.is_closed() {
        println!();
        println!("{}", messages::exit_message(&trade, tz));
    }

    Ok(())
}
