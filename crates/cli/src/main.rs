use clap::{Parser, Subcommand};

mod commands;

use commands::{RunArgs, ShowTradeArgs, ValidateArgs};

#[derive(Parser)]
#[command(name = "calspread")]
#[command(about = "ATM calendar-spread options engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine against a paper market until interrupted
    Run(RunArgs),
    /// Load and validate settings and holidays, then exit
    Validate(ValidateArgs),
    /// Print the persisted trade snapshot
    ShowTrade(ShowTradeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Run(args) => commands::run_engine(args).await?,
        Commands::Validate(args) => commands::run_validate(&args)?,
        Commands::ShowTrade(args) => commands::run_show_trade(&args)?,
    }

    Ok(())
}
