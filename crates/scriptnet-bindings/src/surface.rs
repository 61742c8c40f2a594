//! [`BindingSurface`]: the entry points registered with the script runtime.

use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use scriptnet_channels::ChatBridge;
use scriptnet_core::{BroadcastGateway, CapabilityCell, CapabilityGateway};
use scriptnet_fetch::{FetchClient, FetchHandle, FetchOptions, FetchResult};
use scriptnet_types::config::{BridgeConfig, FetchConfig};

use crate::bridge::GatedBridge;
use crate::capability;
use crate::error::BindingError;

/// Gated access to fetch and the chat bridge, ungated access to broadcast.
#[derive(Debug, Clone)]
pub struct BindingSurface {
    cell: CapabilityCell,
    fetch: FetchClient,
    broadcast: BroadcastGateway,
    runtime: Handle,
}

impl BindingSurface {
    pub fn new(gateway: &CapabilityGateway, fetch: FetchClient, runtime: Handle) -> Self {
        Self {
            cell: gateway.cell(),
            fetch,
            broadcast: gateway.broadcast().clone(),
            runtime,
        }
    }

    /// Build with a fresh [`FetchClient`] from `config`.
    pub fn from_config(
        gateway: &CapabilityGateway,
        config: &FetchConfig,
        runtime: Handle,
    ) -> Result<Self, BindingError> {
        let fetch = FetchClient::new(config, runtime.clone())?;
        Ok(Self::new(gateway, fetch, runtime))
    }

    pub fn is_enabled(&self) -> bool {
        self.cell.is_enabled()
    }

    fn check(&self, capability: &str) -> Result<(), BindingError> {
        check(&self.cell, capability)
    }

    // ── fetch ───────────────────────────────────────────────────────────

    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchResult, BindingError> {
        self.check(capability::FETCH)?;
        Ok(self.fetch.fetch(url, options).await?)
    }

    /// Blocking fetch for host threads outside the runtime.
    pub fn fetch_blocking(&self, url: &str, options: &FetchOptions) -> Result<FetchResult, BindingError> {
        self.check(capability::FETCH)?;
        Ok(self.fetch.fetch_blocking(url, options)?)
    }

    pub fn fetch_async(&self, url: &str, options: &FetchOptions) -> Result<FetchHandle, BindingError> {
        self.check(capability::FETCH_ASYNC)?;
        Ok(self.fetch.fetch_async(url, options))
    }

    /// Fetch with a loosely-typed options object, returning the script
    /// result object.
    pub async fn fetch_value(&self, url: &str, options: Option<&Value>) -> Result<Value, BindingError> {
        let options = options
            .map(FetchOptions::from_script_value)
            .unwrap_or_default();
        Ok(self.fetch(url, &options).await?.to_script_value())
    }

    // ── chat bridge ─────────────────────────────────────────────────────

    /// Connect a chat bridge and wrap it in the capability check.
    pub async fn connect_bridge(&self, config: BridgeConfig) -> Result<GatedBridge, BindingError> {
        self.check(capability::CHAT_CONNECT)?;
        let bridge = ChatBridge::connect(config, self.runtime.clone()).await?;
        Ok(self.bridge(bridge))
    }

    /// Wrap an existing bridge.
    pub fn bridge(&self, bridge: Arc<ChatBridge>) -> GatedBridge {
        GatedBridge::new(self.cell.clone(), bridge)
    }

    // ── broadcast ───────────────────────────────────────────────────────

    /// Host session messaging. Never gated.
    pub fn broadcast(&self) -> &BroadcastGateway {
        &self.broadcast
    }
}

/// Fail fast with [`BindingError::CapabilityDisabled`] when the registry
/// is disabled.
pub(crate) fn check(cell: &CapabilityCell, capability: &str) -> Result<(), BindingError> {
    if cell.is_enabled() {
        debug!(capability, "capability check passed");
        Ok(())
    } else {
        warn!(capability, "network capability called while registry is disabled");
        Err(BindingError::disabled(capability))
    }
}
