//! [`GatedBridge`]: the chat bridge object scripts hold.

use std::sync::Arc;

use serde_json::Value;

use scriptnet_channels::ChatBridge;
use scriptnet_core::CapabilityCell;
use scriptnet_types::event::{EmbedFields, InboundMessageEvent};

use crate::capability;
use crate::error::BindingError;
use crate::surface::check;

/// A [`ChatBridge`] whose script-facing calls check the capability first.
///
/// The wrapped bridge is not reachable through this handle; hosts that need
/// ungated access keep their own `Arc<ChatBridge>`.
///
/// `Ok(false)` from a send means the request was not dispatched (unknown
/// channel key or unreachable channel); it says nothing about delivery.
#[derive(Debug, Clone)]
pub struct GatedBridge {
    cell: CapabilityCell,
    inner: Arc<ChatBridge>,
}

impl GatedBridge {
    pub fn new(cell: CapabilityCell, inner: Arc<ChatBridge>) -> Self {
        Self { cell, inner }
    }

    pub fn send_message(&self, channel_key: &str, text: &str) -> Result<bool, BindingError> {
        check(&self.cell, capability::CHAT_SEND_MESSAGE)?;
        Ok(self.inner.send(channel_key, text))
    }

    pub fn send_embed(&self, channel_key: &str, fields: EmbedFields) -> Result<bool, BindingError> {
        check(&self.cell, capability::CHAT_SEND_EMBED)?;
        Ok(self.inner.send_embed(channel_key, fields))
    }

    /// [`send_embed`](Self::send_embed) with a loosely-typed fields object.
    pub fn send_embed_value(&self, channel_key: &str, fields: &Value) -> Result<bool, BindingError> {
        self.send_embed(channel_key, EmbedFields::from_script_value(fields))
    }

    pub fn set_activity(&self, text: &str) -> Result<(), BindingError> {
        check(&self.cell, capability::CHAT_SET_ACTIVITY)?;
        self.inner.set_presence(text);
        Ok(())
    }

    pub fn on_message<F>(&self, observer: F) -> Result<(), BindingError>
    where
        F: Fn(&InboundMessageEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        check(&self.cell, capability::CHAT_ON_MESSAGE)?;
        self.inner.on_message(observer);
        Ok(())
    }

    /// Release the connection. Always allowed.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.is_shut_down()
    }
}
