//! Voter Registry Command Line Interface
//!
//! Deploys a registry onto a local sled store and drives its operations.
//! Every command names its caller explicitly with `--from`.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use voting_registry::{EventBus, TracingObserver, VoterRegistry};
use voting_storage::{SledStorage, StateStore};
use voting_types::Address;

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "voting-cli")]
#[command(about = "Voter Registry Command Line Interface", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./voting.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Registry data directory (overrides configuration)
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Log filter, e.g. `info` or `voting_registry=debug`
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Deploy a new registry owned by the given account
    Deploy {
        #[arg(long)]
        owner: Address,
    },
    /// Register a voter (owner only)
    Register {
        /// Calling account
        #[arg(long)]
        from: Address,
        voter: Address,
    },
    /// Hand ownership to another account (owner only)
    TransferOwnership {
        /// Calling account
        #[arg(long)]
        from: Address,
        new_owner: Address,
    },
    /// Print whether an account is registered
    IsRegistered { voter: Address },
    /// Print the stored record of an account
    Voter { voter: Address },
    /// Print the current owner
    Owner,
    /// List registered voters
    Voters,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    init_logging(&config);

    let store: Arc<dyn StateStore> = Arc::new(
        SledStorage::new(&config.data_dir)
            .with_context(|| format!("opening registry store at {}", config.data_dir.display()))?,
    );

    let mut events = EventBus::new();
    events.subscribe(Arc::new(TracingObserver));

    for line in execute(cli.command, store.clone(), events)? {
        println!("{line}");
    }

    store.flush()
}

/// Run one command against `store` and return the lines to print.
fn execute(command: Commands, store: Arc<dyn StateStore>, events: EventBus) -> Result<Vec<String>> {
    let open = |store: Arc<dyn StateStore>, events: EventBus| {
        VoterRegistry::open(store, events).context("no registry deployed in this data directory")
    };

    let output = match command {
        Commands::Deploy { owner } => {
            let registry = VoterRegistry::deploy(store, owner, events)?;
            vec![format!("Registry deployed, owner {}", registry.current_owner())]
        }
        Commands::Register { from, voter } => {
            open(store, events)?.register_voter(&from, voter)?;
            vec![format!("Voter registered: {voter}")]
        }
        Commands::TransferOwnership { from, new_owner } => {
            open(store, events)?.transfer_ownership(&from, new_owner)?;
            vec![format!("Ownership transferred to {new_owner}")]
        }
        Commands::IsRegistered { voter } => {
            vec![open(store, events)?.is_registered(&voter).to_string()]
        }
        Commands::Voter { voter } => {
            vec![serde_json::to_string_pretty(&open(store, events)?.voter(&voter))?]
        }
        Commands::Owner => vec![open(store, events)?.current_owner().to_string()],
        Commands::Voters => open(store, events)?
            .registered_voters()
            .iter()
            .map(Address::to_string)
            .collect(),
    };

    Ok(output)
}

fn init_logging(config: &CliConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
