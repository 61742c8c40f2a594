//! # scriptnet-fetch
//!
//! Outbound HTTP for scripts: [`FetchClient`] performs requests described by
//! [`FetchOptions`] and returns a [`FetchResult`]. Requests are never
//! retried; transport failures surface as [`FetchError::Network`] carrying
//! the URL.
//!
//! This crate does no capability checking of its own. Script-facing entry
//! points go through `scriptnet-bindings`, which gates every call.

pub mod client;
pub mod error;
pub mod options;

pub use client::{FetchClient, FetchHandle};
pub use error::FetchError;
pub use options::{FetchOptions, FetchResult};
