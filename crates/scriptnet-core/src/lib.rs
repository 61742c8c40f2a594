//! # scriptnet-core
//!
//! Policy and host-facing logic for scriptnet, free of network I/O.
//!
//! - **[`capability`]** -- the capability gateway state machine and its
//!   shared [`CapabilityCell`]
//! - **[`sanitize`]** -- the text sanitization pipeline
//! - **[`broadcast`]** -- ungated messaging to the host's live sessions
//! - **[`admin`]** -- operator actions (enable, disable, reload, status)
//! - **[`config_loader`]** -- config file discovery and key normalization

pub mod admin;
pub mod broadcast;
pub mod capability;
pub mod config_loader;
pub mod sanitize;

pub use broadcast::{BroadcastGateway, SessionRegistry};
pub use capability::{CapabilityCell, CapabilityGateway, ReadyOutcome, RuntimeMode};
pub use sanitize::{NoDirectory, Sanitizer, UserDirectory};
