//! Errors surfaced to scripts.

use thiserror::Error;

use scriptnet_fetch::FetchError;
use scriptnet_types::ScriptnetError;
use scriptnet_types::error::ChannelError;

/// Error returned by every gated binding.
///
/// [`CapabilityDisabled`](BindingError::CapabilityDisabled) is the safety
/// signal scripts branch on; the other variants wrap the failing layer.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BindingError {
    /// The network registry is disabled; no I/O was attempted.
    #[error("{capability} is unavailable: network registry is disabled (an operator can run /scriptnet enable)")]
    CapabilityDisabled { capability: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

impl BindingError {
    pub(crate) fn disabled(capability: &str) -> Self {
        Self::CapabilityDisabled {
            capability: capability.to_owned(),
        }
    }

    pub fn is_capability_disabled(&self) -> bool {
        matches!(self, Self::CapabilityDisabled { .. })
    }

    /// The capability name, when this is a capability rejection.
    pub fn capability(&self) -> Option<&str> {
        match self {
            Self::CapabilityDisabled { capability } => Some(capability),
            _ => None,
        }
    }
}

impl From<BindingError> for ScriptnetError {
    fn from(err: BindingError) -> Self {
        match err {
            BindingError::CapabilityDisabled { capability } => {
                ScriptnetError::CapabilityDisabled { capability }
            }
            BindingError::Fetch(e) => e.into(),
            BindingError::Channel(e) => e.into(),
        }
    }
}
