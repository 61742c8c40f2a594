//! `scriptnet config` -- display resolved configuration.
//!
//! # Examples
//!
//! ```text
//! scriptnet config show
//! scriptnet config show --config ./config.json
//! ```

use scriptnet_types::config::Config;

/// Display the resolved configuration as formatted JSON.
///
/// The bot token serializes as an empty string.
pub fn config_show(config: &Config) {
    match render(config) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("error: failed to serialize config: {e}"),
    }
}

fn render(config: &Config) -> serde_json::Result<String> {
    serde_json::to_string_pretty(config)
}
