//! Chat platform bridge for scriptnet.
//!
//! A [`ChatBridge`] holds one bot connection: it maps logical channel keys
//! to platform channel ids, sends plain messages and embeds, and raises
//! [`InboundMessageEvent`](scriptnet_types::event::InboundMessageEvent)s to
//! registered observers.
//!
//! # Architecture
//!
//! ```text
//! Gateway WebSocket ──dispatch──> EntityCache ──> build_event ──> observers
//!                                      │
//! script send ──resolve key──> is_messageable? ──sanitize──> REST (spawned)
//! ```
//!
//! # Error handling
//!
//! Operations return [`ChannelError`](scriptnet_types::error::ChannelError)
//! from the `scriptnet-types` crate. This crate re-exports it for
//! convenience.

pub mod discord;

pub use discord::{BridgeState, ChatBridge, EntityCache, MessageObserver};

// Re-export the canonical error type so callers do not need to depend
// on scriptnet-types directly for channel errors.
pub use scriptnet_types::error::ChannelError;
