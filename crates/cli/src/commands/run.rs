//! Runs the engine against a recorded paper market.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use calspread_core::{Clock, ConfigLoader, ManualClock, SystemClock};
use calspread_options_manager::{service, TradeLifecycle};
use calspread_paper::{PaperBroker, PaperMarket, ReplaySignalOracle};
use chrono::{DateTime, Utc};
use clap::Args;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Settings file (TOML or JSON).
    #[arg(short, long, default_value = "config/settings.toml")]
    pub settings: PathBuf,

    /// Recorded paper market (JSON).
    #[arg(short, long, default_value = "config/paper_market.json")]
    pub market: PathBuf,

    /// Pin the clock to this instant (RFC 3339) instead of wall time.
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

/// Runs the engine until SIGINT or SIGTERM.
pub async fn run_engine(args: RunArgs) -> Result<()> {
    let (settings, holidays) = ConfigLoader::load_with_holidays(&args.settings)
        .with_context(|| format!("Failed to load settings from {}", args.settings.display()))?;
    let market = PaperMarket::load(&args.market)?;
    if !market.symbol.eq_ignore_ascii_case(&settings.symbol) {
        bail!(
            "market {} does not match configured symbol {}",
            market.symbol,
            settings.symbol
        );
    }

    let oracle = ReplaySignalOracle::from_recorded(market.signal.clone());
    let broker = Arc::new(PaperBroker::new(market));
    let clock: Arc<dyn Clock> = match args.at {
        Some(at) => {
            info!(%at, "Clock pinned");
            Arc::new(ManualClock::new(at))
        }
        None => Arc::new(SystemClock),
    };

    let (mut engine, notifications) =
        TradeLifecycle::new(settings, holidays, broker, Arc::new(oracle), clock)?;
    let state = engine.restore()?;
    info!(%state, "Engine ready");

    let logger = service::spawn_notification_logger(notifications);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal_task = tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            error!(error = %e, "Signal handler failed, shutting down");
        }
        let _ = shutdown_tx.send(true);
    });

    service::run(&mut engine, shutdown_rx).await?;
    signal_task.abort();

    if engine.in_position() {
        warn!(
            direction = %engine.trade().direction,
            "Stopped while in position"
        );
    }

    // Dropping the engine closes the notification queues so the logger drains and exits.
    drop(engine);
    logger.await?;

    info!("Calendar spread engine stopped");
    Ok(())
}

async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, initiating graceful shutdown");
            }
            res = tokio::signal::ctrl_c() => {
                res?;
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C, initiating graceful shutdown");
    }

    Ok(())
}
