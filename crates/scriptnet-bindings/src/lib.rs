//! # scriptnet-bindings
//!
//! The script-facing surface. [`BindingSurface`] exposes fetch, the chat
//! bridge and broadcast messaging to the embedding script runtime, and
//! checks the shared [`CapabilityCell`](scriptnet_core::CapabilityCell)
//! before every network-capable call.
//!
//! Broadcast messaging is never gated.

pub mod bridge;
pub mod error;
pub mod surface;

pub use bridge::GatedBridge;
pub use error::BindingError;
pub use surface::BindingSurface;

/// Capability names carried by [`BindingError::CapabilityDisabled`].
pub mod capability {
    pub const FETCH: &str = "fetch";
    pub const FETCH_ASYNC: &str = "fetchAsync";
    pub const CHAT_CONNECT: &str = "chat.connect";
    pub const CHAT_SEND_MESSAGE: &str = "chat.sendMessage";
    pub const CHAT_SEND_EMBED: &str = "chat.sendEmbed";
    pub const CHAT_SET_ACTIVITY: &str = "chat.setActivity";
    pub const CHAT_ON_MESSAGE: &str = "chat.onMessage";
}
