//! `scriptnet` -- operator CLI for scriptnet.
//!
//! Provides the following subcommands:
//!
//! - `scriptnet status` -- Show configuration status.
//! - `scriptnet config show` -- Print the resolved configuration.
//! - `scriptnet sanitize` -- Run the sanitization pipeline on some text.
//! - `scriptnet fetch` -- Perform one request through the gated fetch binding.
//! - `scriptnet bridge` -- Run a console host with a live chat bridge.

use clap::{Parser, Subcommand};

mod commands;

/// scriptnet operator CLI.
#[derive(Parser)]
#[command(name = "scriptnet", about = "scriptnet operator CLI", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Show configuration status.
    Status(commands::status::StatusArgs),

    /// Show resolved configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },

    /// Sanitize text the way outbound chat messages are.
    Sanitize(commands::sanitize::SanitizeArgs),

    /// Perform one HTTP request through the fetch binding.
    Fetch(commands::fetch::FetchArgs),

    /// Connect the chat bridge and print inbound messages.
    Bridge(commands::bridge::BridgeArgs),
}

/// Subcommands for `scriptnet config`.
#[derive(Subcommand)]
enum ConfigCmd {
    /// Display the full resolved configuration (token redacted).
    Show {
        /// Config file path (overrides auto-discovery).
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    match cli.command {
        Commands::Status(args) => commands::status::run(args)?,
        Commands::Config { action } => match action {
            ConfigCmd::Show { config } => {
                let loaded = commands::load_config(config.as_deref())?;
                commands::config_cmd::config_show(&loaded.config);
            }
        },
        Commands::Sanitize(args) => commands::sanitize::run(args),
        Commands::Fetch(args) => commands::fetch::run(args).await?,
        Commands::Bridge(args) => commands::bridge::run(args).await?,
    }

    Ok(())
}
