//! Configuration file discovery and loading.
//!
//! The discovery order is:
//! 1. `SCRIPTNET_CONFIG` environment variable (absolute path).
//! 2. `~/.scriptnet/config.json`
//! 3. If none found, built-in defaults (an empty JSON object).
//!
//! JSON keys are normalized from camelCase to snake_case before
//! deserializing. Keys inside `channels` maps are user-chosen channel keys
//! and are kept verbatim.

use std::path::{Path, PathBuf};

use scriptnet_types::config::Config;
use scriptnet_types::{Result, ScriptnetError};
use serde_json::Value;
use tracing::{debug, info};

/// Environment variable holding an explicit config path.
pub const CONFIG_ENV_VAR: &str = "SCRIPTNET_CONFIG";

/// Object keys whose children are data, not schema fields.
const VERBATIM_KEYS: &[&str] = &["channels"];

/// A loaded config plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// `None` when built-in defaults were used.
    pub path: Option<PathBuf>,
}

/// Discover the config file path using the fallback chain.
///
/// `env_override` is the value of [`CONFIG_ENV_VAR`], if set. Returns
/// `None` if no config file exists at any candidate location.
pub fn discover_config_path(
    env_override: Option<String>,
    home_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(env_path) = env_override.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(env_path));
    }

    let candidate = home_dir?.join(".scriptnet").join("config.json");
    candidate.exists().then_some(candidate)
}

/// Load configuration from `explicit` if given, else via discovery.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => discover_config_path(std::env::var(CONFIG_ENV_VAR).ok(), dirs::home_dir()),
    };

    let Some(path) = path else {
        info!("no config file found, using defaults");
        return Ok(LoadedConfig {
            config: Config::default(),
            path: None,
        });
    };

    let raw = load_config_raw(&path)?;
    let config = serde_json::from_value(raw).map_err(|e| ScriptnetError::ConfigInvalid {
        reason: format!("{}: {e}", path.display()),
    })?;
    Ok(LoadedConfig {
        config,
        path: Some(path),
    })
}

/// Read and key-normalize the JSON at `path`.
pub fn load_config_raw(path: &Path) -> Result<Value> {
    debug!(path = %path.display(), "loading config file");
    let contents = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents).map_err(|e| {
        ScriptnetError::ConfigInvalid {
            reason: format!("failed to parse {}: {e}", path.display()),
        }
    })?;
    if !value.is_object() {
        return Err(ScriptnetError::ConfigInvalid {
            reason: format!("{} must contain a JSON object", path.display()),
        });
    }
    Ok(normalize_keys(value))
}

/// Convert camelCase JSON keys to snake_case recursively.
///
/// Children of the keys in `VERBATIM_KEYS` keep their own keys unchanged
/// (their values are still normalized).
pub fn normalize_keys(value: Value) -> Value {
    normalize(value, false)
}

fn normalize(value: Value, keep_keys: bool) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, val)| {
                    let new_key = if keep_keys { key } else { camel_to_snake(&key) };
                    let verbatim = !keep_keys && VERBATIM_KEYS.contains(&new_key.as_str());
                    (new_key, normalize(val, verbatim))
                })
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.into_iter().map(|v| normalize(v, false)).collect()),
        other => other,
    }
}

/// Convert a single camelCase string to snake_case.
///
/// A run of uppercase letters (an acronym) is kept together, with an
/// underscore inserted before its last letter only when that letter starts
/// a new lowercase word.
///
/// # Examples
/// ```
/// # use scriptnet_core::config_loader::camel_to_snake;
/// assert_eq!(camel_to_snake("sanitizeMessages"), "sanitize_messages");
/// assert_eq!(camel_to_snake("already_snake"), "already_snake");
/// assert_eq!(camel_to_snake("apiBaseURL"), "api_base_url");
/// assert_eq!(camel_to_snake("HTTPTimeout"), "http_timeout");
/// ```
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next.is_some_and(|c| c.is_lowercase()))
            {
                result.push('_');
            }
        }
        result.push(ch.to_ascii_lowercase());
    }
    result
}
