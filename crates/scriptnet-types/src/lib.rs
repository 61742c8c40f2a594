//! # scriptnet-types
//!
//! Core type definitions for scriptnet.
//!
//! This crate is the foundation of the dependency graph -- every other
//! scriptnet crate depends on it. It contains:
//!
//! - **[`error`]** -- [`ScriptnetError`] and [`ChannelError`] error types
//! - **[`config`]** -- Configuration schema (bridge, fetch, capability gateway)
//! - **[`event`]** -- Inbound chat events and outbound message/embed types
//! - **[`token`]** -- [`BotToken`](token::BotToken), the redacted bot credential

pub mod config;
pub mod error;
pub mod event;
pub mod token;

pub use error::{ChannelError, Result, ScriptnetError};
