//! `scriptnet status` -- show configuration status.
//!
//! Discovers the active configuration file, parses it, and prints a
//! summary. The bot token is reported only as present or missing.
//!
//! ```text
//! scriptnet status
//! scriptnet status --config ./config.json
//! ```

use clap::Args;

use scriptnet_core::config_loader::CONFIG_ENV_VAR;
use scriptnet_types::config::Config;

use super::load_config;

/// Arguments for the `scriptnet status` subcommand.
#[derive(Args)]
pub struct StatusArgs {
    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Run the status command.
pub fn run(args: StatusArgs) -> anyhow::Result<()> {
    let loaded = load_config(args.config.as_deref())?;

    println!("scriptnet status");
    println!("================");
    println!();
    match &loaded.path {
        Some(path) => println!("Config: {}", path.display()),
        None => {
            println!("Config: not found");
            println!("  Searched: ~/.scriptnet/config.json");
            println!("  Set {CONFIG_ENV_VAR} env var to override");
            println!();
            println!("Using defaults:");
        }
    }
    println!();
    for line in summary(&loaded.config) {
        println!("{line}");
    }
    Ok(())
}

fn summary(config: &Config) -> Vec<String> {
    let bridge = &config.bridge;
    let token = if !bridge.token.is_empty() {
        "set".to_string()
    } else if let Some(var) = &bridge.token_env {
        if bridge.resolved_token().is_empty() {
            format!("missing (${var} is empty or unset)")
        } else {
            format!("from ${var}")
        }
    } else {
        "missing".to_string()
    };

    let mut lines = vec![
        "Chat bridge:".to_string(),
        format!("  Token:              {token}"),
        format!("  Sanitize messages:  {}", bridge.sanitize_messages),
        format!("  Gateway URL:        {}", bridge.gateway_url),
        format!("  Ready timeout:      {}s", bridge.ready_timeout_secs),
        format!("  Channel bindings:   {}", bridge.channels.len()),
    ];
    let mut bindings: Vec<_> = bridge.channels.iter().collect();
    bindings.sort();
    for (key, id) in bindings {
        lines.push(format!("    {key} -> {id}"));
    }

    let fetch = &config.fetch;
    lines.push(String::new());
    lines.push("Fetch:".to_string());
    lines.push(format!(
        "  Timeouts (connect/read/write): {}s / {}s / {}s",
        fetch.connect_timeout_secs, fetch.read_timeout_secs, fetch.write_timeout_secs
    ));
    lines.push(format!("  User agent:         {}", fetch.user_agent));

    lines.push(String::new());
    lines.push("Capability gateway:".to_string());
    lines.push(format!(
        "  Singleplayer warning delay: {}ms",
        config.gateway.warning_delay_ms
    ));
    lines
}
