use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use eqsift::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for eqsift::AppCommand {
    fn from(cmd: Commands) -> eqsift::AppCommand {
        match cmd {
            Commands::Analyze => eqsift::AppCommand::Analyze,
            Commands::Rebalance => eqsift::AppCommand::Rebalance,
            Commands::Rankings { limit } => eqsift::AppCommand::Rankings { limit },
            Commands::Portfolio => eqsift::AppCommand::Portfolio,
            Commands::Export { path } => eqsift::AppCommand::Export { path },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch, value and score universe symbols not yet analyzed
    Analyze,
    /// Recompute scores and rebuild the model portfolio weights
    Rebalance,
    /// Display analyzed stocks ranked by composite score
    Rankings {
        /// Show only the top N stocks
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Display the current model portfolio grouped by sector
    Portfolio,
    /// Export all analyzed records to a JSON snapshot
    Export {
        /// Output file path
        #[arg(short, long)]
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => eqsift::cli::setup::setup(),
        Some(cmd) => eqsift::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
