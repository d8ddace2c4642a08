use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use riskboard::core::log::init_logging;
use riskboard::core::sort::SortKey;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Bypass intermediate caches with a unique request stamp
    #[arg(short, long, global = true)]
    force: bool,

    /// Attempts per refresh before giving up
    #[arg(long, global = true)]
    retries: Option<u32>,

    /// Milliseconds to wait between attempts
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for riskboard::AppCommand {
    fn from(cmd: Commands) -> riskboard::AppCommand {
        match cmd {
            Commands::Summary => riskboard::AppCommand::Summary,
            Commands::Returns { sort, asc } => riskboard::AppCommand::Returns {
                sort,
                ascending: asc,
            },
            Commands::Correlation => riskboard::AppCommand::Correlation,
            Commands::Risk => riskboard::AppCommand::Risk,
            Commands::Exposure => riskboard::AppCommand::Exposure,
            Commands::Status => riskboard::AppCommand::Status,
            Commands::Watch => riskboard::AppCommand::Watch,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the executive risk summary
    Summary,
    /// Display the periodic returns heatmap
    Returns {
        /// Column to sort by: ticker, contrib, ytd, 1m, 1y, 5y
        #[arg(short, long)]
        sort: Option<SortKey>,
        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
    },
    /// Display the correlation matrix
    Correlation,
    /// Display risk attribution, stress tests and leverage
    Risk,
    /// Display currency exposure and the FX watchlist
    Exposure,
    /// Check whether the risk service is ready
    Status,
    /// Keep the dashboard on screen and refresh periodically
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let overrides = riskboard::Overrides {
        force: cli.force,
        retries: cli.retries,
        delay_ms: cli.delay_ms,
    };

    let result = match cli.command {
        Some(Commands::Setup) => riskboard::cli::setup::setup(),
        Some(cmd) => {
            riskboard::run_command(cmd.into(), cli.config_path.as_deref(), &overrides).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
