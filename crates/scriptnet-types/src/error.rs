//! Error types for scriptnet.
//!
//! Provides [`ScriptnetError`] as the top-level error type and
//! [`ChannelError`] for chat-bridge failures. Both are non-exhaustive to
//! allow future extension without breaking downstream.

use thiserror::Error;

/// Top-level error type for scriptnet.
///
/// Variants fall into two groups: environment/safety conditions that
/// scripts are expected to branch on (capability disabled, bad config),
/// and plumbing errors bubbled up from lower layers.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScriptnetError {
    // ── Safety ───────────────────────────────────────────────────────

    /// A network capability was invoked while the gateway is disabled.
    #[error("capability disabled: {capability}")]
    CapabilityDisabled {
        /// Name of the capability the caller attempted (e.g. `"fetch"`).
        capability: String,
    },

    /// Configuration is malformed or semantically invalid.
    #[error("invalid config: {reason}")]
    ConfigInvalid {
        /// What is wrong with the configuration.
        reason: String,
    },

    // ── Plumbing ─────────────────────────────────────────────────────

    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A chat-bridge error bubbled up.
    #[error("channel error: {0}")]
    Channel(String),

    /// An outbound HTTP error bubbled up.
    #[error("fetch error: {0}")]
    Fetch(String),
}

/// Chat-bridge error type.
///
/// Used by the bridge to report failures in connecting, authenticating,
/// resolving channels, or exchanging messages.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ChannelError {
    /// The bridge was constructed without an auth token.
    #[error("chat bridge token is required")]
    MissingToken,

    /// Failed to establish a connection to the platform.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication / authorization was rejected.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Sending a message failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The bridge is not currently connected.
    #[error("not connected")]
    NotConnected,

    /// The logical channel key is not in the configured bindings.
    #[error("channel key not found: {0}")]
    UnknownChannelKey(String),

    /// The platform does not know (or cannot reach) the channel id.
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    /// Catch-all for errors that do not fit other variants.
    #[error("{0}")]
    Other(String),
}

impl From<ChannelError> for ScriptnetError {
    fn from(err: ChannelError) -> Self {
        ScriptnetError::Channel(err.to_string())
    }
}

/// A convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScriptnetError>;
