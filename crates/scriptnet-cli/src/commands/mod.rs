//! CLI command implementations for `scriptnet`.
//!
//! - [`status`] -- Configuration diagnostics.
//! - [`config_cmd`] -- Resolved configuration as JSON.
//! - [`sanitize`] -- Offline sanitization.
//! - [`fetch`] -- One-shot gated fetch.
//! - [`bridge`] -- Console host around a live chat bridge.

pub mod bridge;
pub mod config_cmd;
pub mod fetch;
pub mod sanitize;
pub mod status;

use std::path::Path;

use scriptnet_core::config_loader::{self, LoadedConfig};

/// Load configuration from the given path override or via auto-discovery.
///
/// Discovery order: `SCRIPTNET_CONFIG`, then `~/.scriptnet/config.json`,
/// then built-in defaults.
pub fn load_config(config_override: Option<&str>) -> anyhow::Result<LoadedConfig> {
    if let Some(path) = config_override
        && !Path::new(path).exists()
    {
        anyhow::bail!("config file not found: {path}");
    }
    config_loader::load_config(config_override.map(Path::new))
        .map_err(|e| anyhow::anyhow!("failed to load config: {e}"))
}
