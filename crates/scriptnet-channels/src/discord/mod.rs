//! Discord bridge.
//!
//! Connects to the Discord Gateway via WebSocket for inbound events and
//! uses the REST API for outbound messages.
//!
//! # Modules
//!
//! - [`events`] -- Discord Gateway payload types and opcodes
//! - [`api`] -- HTTP client wrapper for the Discord REST API
//! - [`cache`] -- in-memory users, channels, guilds and roles
//! - [`inbound`] -- `MESSAGE_CREATE` to event mapping, observer dispatch
//! - [`bridge`] -- the [`ChatBridge`] connection and send paths

pub mod api;
pub mod bridge;
pub mod cache;
pub mod events;
pub mod inbound;

pub use bridge::{BridgeState, ChatBridge};
pub use cache::EntityCache;
pub use inbound::MessageObserver;

#[cfg(test)]
mod tests;
