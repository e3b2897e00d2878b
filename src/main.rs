//! Token Sweeper - move a wallet's balances to one address in a single call
//!
//! # WARNING
//! - Transfers are irreversible. Double-check the recipient.
//! - A submitted transaction can still revert on-chain; check the explorer.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use token_sweeper::cli::commands;
use token_sweeper::config::Config;

/// Token Sweeper - bulk-transfer native and ERC-20 balances
#[derive(Parser)]
#[command(name = "sweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "sweeper.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show balances, prices and USD values
    Portfolio {
        /// Account to inspect (default: the configured wallet's account)
        #[arg(long)]
        address: Option<String>,
    },

    /// Transfer selected balances to a recipient in one transaction
    Transfer {
        /// Recipient address (prompted if omitted)
        #[arg(short, long)]
        recipient: Option<String>,

        /// Select every balance
        #[arg(long, conflicts_with = "token")]
        all: bool,

        /// Select a balance by contract address, or "native"
        #[arg(long = "token", value_name = "ADDR")]
        token: Vec<String>,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,

        /// Build the call without submitting it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show current configuration (secrets masked)
    Config,

    /// Check connectivity (RPC, indexer, price API, wallet)
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("token_sweeper=info".parse()?),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Using chain {} (id {}), contract {}",
        config.chain.name, config.chain.chain_id, config.bulk_transfer.contract
    );

    let result = match cli.command {
        Commands::Portfolio { address } => commands::portfolio(&config, address).await,
        Commands::Transfer {
            recipient,
            all,
            token,
            force,
            dry_run,
        } => commands::transfer(&config, recipient, all, token, force, dry_run).await,
        Commands::Config => commands::show_config(&config),
        Commands::Health => commands::health(&config).await,
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
