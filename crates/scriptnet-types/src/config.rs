//! Configuration schema types.
//!
//! All structs accept both `snake_case` and `camelCase` field names in JSON
//! via `#[serde(alias)]`. Unknown fields are silently ignored so that a
//! config written for a newer release still loads.
//!
//! ```json
//! {
//!   "bridge": {
//!     "token": "MTA5...",
//!     "channels": { "announcements": "123456789012345678" },
//!     "sanitizeMessages": true
//!   },
//!   "fetch": { "connectTimeoutSecs": 30 },
//!   "gateway": { "warningDelayMs": 3000 }
//! }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::token::BotToken;

/// Shared default function: returns `true`.
pub(crate) fn default_true() -> bool {
    true
}

// ── Root config ──────────────────────────────────────────────────────────

/// Root configuration for scriptnet.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chat bridge connection and channel bindings.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Outbound HTTP settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Capability gateway policy.
    #[serde(default)]
    pub gateway: CapabilityConfig,
}

// ── Bridge ───────────────────────────────────────────────────────────────

/// Chat bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Bot token from the Discord Developer Portal.
    #[serde(default)]
    pub token: BotToken,

    /// Environment variable name that holds the bot token (e.g. `"DISCORD_BOT_TOKEN"`).
    /// When set, the env var is used if `token` is empty.
    #[serde(default, alias = "tokenEnv")]
    pub token_env: Option<String>,

    /// Logical channel key -> platform channel id.
    #[serde(default)]
    pub channels: HashMap<String, String>,

    /// Sanitize outbound text and embed descriptions before sending.
    #[serde(default = "default_true", alias = "sanitizeMessages")]
    pub sanitize_messages: bool,

    /// Gateway WebSocket URL.
    #[serde(default = "default_gateway_url", alias = "gatewayUrl")]
    pub gateway_url: String,

    /// REST API base URL.
    #[serde(default = "default_api_base_url", alias = "apiBaseUrl")]
    pub api_base_url: String,

    /// Gateway intents bitmask.
    #[serde(default = "default_intents")]
    pub intents: u32,

    /// How long `connect()` waits for READY and guild data.
    #[serde(default = "default_ready_timeout", alias = "readyTimeoutSecs")]
    pub ready_timeout_secs: u64,
}

fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=10&encoding=json".into()
}
fn default_api_base_url() -> String {
    "https://discord.com/api/v10".into()
}
fn default_intents() -> u32 {
    37377 // GUILDS + GUILD_MESSAGES + DIRECT_MESSAGES + MESSAGE_CONTENT
}
fn default_ready_timeout() -> u64 {
    30
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            token: BotToken::default(),
            token_env: None,
            channels: HashMap::new(),
            sanitize_messages: true,
            gateway_url: default_gateway_url(),
            api_base_url: default_api_base_url(),
            intents: default_intents(),
            ready_timeout_secs: default_ready_timeout(),
        }
    }
}

impl BridgeConfig {
    /// The token to authenticate with: `token` if non-empty, else the value
    /// of the env var named by `token_env`, else an empty token.
    pub fn resolved_token(&self) -> BotToken {
        if !self.token.is_empty() {
            return self.token.clone();
        }
        self.token_env
            .as_deref()
            .and_then(BotToken::from_env)
            .unwrap_or_default()
    }

    /// Whether `channel_id` is one of the configured binding values.
    pub fn is_bound_channel(&self, channel_id: &str) -> bool {
        self.channels.values().any(|id| id == channel_id)
    }

    /// Ready timeout as a [`Duration`].
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }
}

// ── Fetch ────────────────────────────────────────────────────────────────

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// TCP/TLS connect timeout in seconds.
    #[serde(default = "default_timeout_secs", alias = "connectTimeoutSecs")]
    pub connect_timeout_secs: u64,

    /// Per-read timeout in seconds.
    #[serde(default = "default_timeout_secs", alias = "readTimeoutSecs")]
    pub read_timeout_secs: u64,

    /// Upper bound for writing the request, in seconds.
    #[serde(default = "default_timeout_secs", alias = "writeTimeoutSecs")]
    pub write_timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent", alias = "userAgent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("scriptnet/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_timeout_secs(),
            read_timeout_secs: default_timeout_secs(),
            write_timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

// ── Capability gateway ───────────────────────────────────────────────────

/// Capability gateway policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityConfig {
    /// Delay before the singleplayer warning is broadcast, in milliseconds.
    #[serde(default = "default_warning_delay_ms", alias = "warningDelayMs")]
    pub warning_delay_ms: u64,
}

fn default_warning_delay_ms() -> u64 {
    3000
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            warning_delay_ms: default_warning_delay_ms(),
        }
    }
}

impl CapabilityConfig {
    /// Warning delay as a [`Duration`].
    pub fn warning_delay(&self) -> Duration {
        Duration::from_millis(self.warning_delay_ms)
    }
}
