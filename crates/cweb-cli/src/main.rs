// crates/cweb-cli/src/main.rs
//
// CLI entrypoint for the cweb reputation network node.
//
// Loads configuration, initializes tracing, and dispatches to subcommands for
// key management, identity registration, voting, and admission dry-runs.

mod commands;
mod config;
mod node;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::votes::VoteCmd;
use config::CwebConfig;
use cweb_core::HashAlgorithm;

/// cweb: signed content appraisals over a shared key-value store.
#[derive(Parser, Debug)]
#[command(name = "cweb", version = "0.1.0", about = "cweb reputation network node")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.cweb/config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate the node's ed25519 keypair.
    Keygen {
        /// Replace an existing keypair.
        #[arg(long)]
        force: bool,
    },

    /// Print the local public key and node id.
    Whoami,

    /// Publish a self-signed identity for the local key.
    Register {
        #[arg(long)]
        handle: String,
    },

    /// Resolve a hex public key to its registered identity.
    Lookup {
        public_key: String,
    },

    /// Sign and publish a vote on a content hash.
    Vote(VoteCmd),

    /// List all votes on a content hash.
    Votes {
        hash: String,
        #[arg(long)]
        algorithm: Option<HashAlgorithm>,
    },

    /// Run admission control over a raw encoded record.
    Admit {
        /// Domain name, e.g. "vote" or "user".
        #[arg(long)]
        domain: String,
        #[arg(long)]
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path: PathBuf = config::expand_tilde(&cli.config);
    let (cweb_config, load_error) = if config_path.exists() {
        match CwebConfig::load(&config_path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (CwebConfig::default(), Some(e)),
        }
    } else {
        (CwebConfig::default(), None)
    };

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cweb_config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match load_error {
        Some(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path.display(),
            e
        ),
        None if config_path.exists() => {
            tracing::debug!("Loaded configuration from {}", config_path.display())
        }
        None => tracing::debug!(
            "No config at {}. Using defaults.",
            config_path.display()
        ),
    }

    match &cli.command {
        Commands::Keygen { force } => commands::keys::keygen(&cweb_config, *force)?,
        Commands::Whoami => commands::keys::whoami(&cweb_config)?,
        Commands::Register { handle } => commands::identity::register(&cweb_config, handle).await?,
        Commands::Lookup { public_key } => {
            commands::identity::lookup(&cweb_config, public_key).await?
        }
        Commands::Vote(cmd) => commands::votes::vote(&cweb_config, cmd).await?,
        Commands::Votes { hash, algorithm } => {
            commands::votes::votes(&cweb_config, hash, *algorithm).await?
        }
        Commands::Admit { domain, file } => {
            commands::admit::admit(&cweb_config, domain, file).await?
        }
    }

    Ok(())
}
