//! Capability gateway: decides whether network bindings may run.
//!
//! The state is one atomic flag ([`CapabilityCell`]) shared by every
//! component that needs to check it. Only [`CapabilityGateway`] can flip it;
//! everything else holds a read-only clone of the cell.
//!
//! Lifecycle:
//!
//! ```text
//!  process start ──► Disabled ──enable()──► Enabled
//!                       ▲                      │
//!                       └──────disable()───────┘
//! ```
//!
//! [`CapabilityGateway::on_host_ready`] auto-enables on dedicated hosts and
//! schedules a one-shot warning broadcast on singleplayer hosts.
//! [`CapabilityGateway::on_host_stopping`] always disables.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use scriptnet_types::config::CapabilityConfig;
use tokio::runtime::Handle;
use tracing::info;

use crate::broadcast::BroadcastGateway;

/// Broadcast after a manual enable.
pub const ENABLED_NOTICE: &str = "&a[ScriptNet] Network registry enabled.";

/// Broadcast right after [`ENABLED_NOTICE`]; bindings are only visible to
/// scripts loaded after the change.
pub const RELOAD_REMINDER: &str =
    "&e[ScriptNet] Reload your scripts so the network bindings become available.";

/// Deferred broadcast on singleplayer hosts.
pub const SINGLEPLAYER_WARNING: &str = "&c[ScriptNet] Network bindings (fetch, chat bridge) are \
     disabled by default in singleplayer. &eRun &f/scriptnet enable&e and reload your scripts \
     to use them.";

/// Whether network capabilities are currently reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityState {
    Disabled,
    Enabled,
}

impl std::fmt::Display for CapabilityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityState::Disabled => f.write_str("disabled"),
            CapabilityState::Enabled => f.write_str("enabled"),
        }
    }
}

/// How the host process is running, as classified when it becomes ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Singleplayer,
    DedicatedMultiplayer,
}

/// What [`CapabilityGateway::on_host_ready`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// Dedicated host, was disabled, now enabled.
    AutoEnabled,
    /// Dedicated host that was already enabled; nothing to do.
    AlreadyEnabled,
    /// Singleplayer host; stays disabled and a warning is scheduled.
    WarningScheduled,
}

/// Shared, atomically updated capability flag. Starts disabled.
///
/// Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct CapabilityCell(Arc<AtomicBool>);

impl CapabilityCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> CapabilityState {
        if self.is_enabled() {
            CapabilityState::Enabled
        } else {
            CapabilityState::Disabled
        }
    }

    /// Store `enabled` and return the previous value.
    fn swap(&self, enabled: bool) -> bool {
        self.0.swap(enabled, Ordering::SeqCst)
    }
}

/// The process-wide enable/disable state machine.
#[derive(Debug)]
pub struct CapabilityGateway {
    cell: CapabilityCell,
    broadcast: BroadcastGateway,
    warning_delay: Duration,
    runtime: Handle,
}

impl CapabilityGateway {
    /// Create a gateway in the `Disabled` state.
    ///
    /// `runtime` is where the deferred singleplayer warning is scheduled;
    /// lifecycle hooks may be called from threads outside that runtime.
    pub fn new(broadcast: BroadcastGateway, config: &CapabilityConfig, runtime: Handle) -> Self {
        Self {
            cell: CapabilityCell::new(),
            broadcast,
            warning_delay: config.warning_delay(),
            runtime,
        }
    }

    /// A read-only handle on the state, for components that gate on it.
    pub fn cell(&self) -> CapabilityCell {
        self.cell.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.cell.is_enabled()
    }

    pub fn state(&self) -> CapabilityState {
        self.cell.state()
    }

    pub fn broadcast(&self) -> &BroadcastGateway {
        &self.broadcast
    }

    /// Enable capabilities and announce it.
    ///
    /// Returns `true` if this call performed the transition; a second call
    /// is a no-op and broadcasts nothing. Reloading scripts is left to the
    /// embedding runtime.
    pub fn enable(&self) -> bool {
        if !self.transition_to_enabled() {
            return false;
        }
        self.broadcast.system_message(ENABLED_NOTICE);
        self.broadcast.system_message(RELOAD_REMINDER);
        true
    }

    /// Disable capabilities. Idempotent.
    pub fn disable(&self) {
        if self.cell.swap(false) {
            info!("network capabilities disabled");
        }
    }

    /// Apply the runtime-mode policy once the host is ready to serve.
    pub fn on_host_ready(&self, mode: RuntimeMode) -> ReadyOutcome {
        info!(?mode, "host ready");
        match mode {
            RuntimeMode::DedicatedMultiplayer => {
                if self.transition_to_enabled() {
                    ReadyOutcome::AutoEnabled
                } else {
                    ReadyOutcome::AlreadyEnabled
                }
            }
            RuntimeMode::Singleplayer => {
                self.schedule_singleplayer_warning();
                ReadyOutcome::WarningScheduled
            }
        }
    }

    /// Host is shutting down: always disable.
    pub fn on_host_stopping(&self) {
        self.disable();
        info!("host stopping, network registry disabled");
    }

    fn transition_to_enabled(&self) -> bool {
        let was_enabled = self.cell.swap(true);
        if !was_enabled {
            info!("network capabilities enabled");
        }
        !was_enabled
    }

    fn schedule_singleplayer_warning(&self) {
        let broadcast = self.broadcast.clone();
        let delay = self.warning_delay;
        info!(delay_ms = delay.as_millis() as u64, "singleplayer host, scheduling warning");
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            info!("broadcasting singleplayer warning");
            broadcast.system_message(SINGLEPLAYER_WARNING);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::InMemorySessions;

    fn gateway(delay_ms: u64) -> (Arc<InMemorySessions>, CapabilityGateway) {
        let sessions = Arc::new(InMemorySessions::new());
        sessions.join("op");
        let gw = CapabilityGateway::new(
            BroadcastGateway::new(sessions.clone()),
            &CapabilityConfig {
                warning_delay_ms: delay_ms,
            },
            Handle::current(),
        );
        (sessions, gw)
    }

    #[tokio::test]
    async fn starts_disabled() {
        let (_, gw) = gateway(10);
        assert!(!gw.is_enabled());
        assert_eq!(gw.state(), CapabilityState::Disabled);
    }

    #[tokio::test]
    async fn enable_twice_broadcasts_once() {
        let (sessions, gw) = gateway(10);
        assert!(gw.enable());
        assert!(!gw.enable());
        assert!(gw.is_enabled());

        let inbox = sessions.inbox("op");
        assert_eq!(inbox.len(), 2, "one notice plus one reload reminder: {inbox:?}");
        assert!(inbox[0].contains("enabled"));
        assert!(inbox[1].contains("Reload"));
    }

    #[tokio::test]
    async fn disable_is_idempotent() {
        let (_, gw) = gateway(10);
        gw.disable();
        gw.enable();
        gw.disable();
        gw.disable();
        assert!(!gw.is_enabled());
    }

    #[tokio::test]
    async fn cells_share_state() {
        let (_, gw) = gateway(10);
        let cell = gw.cell();
        assert!(!cell.is_enabled());
        gw.enable();
        assert!(cell.is_enabled());
        gw.on_host_stopping();
        assert!(!cell.is_enabled());
    }

    #[tokio::test]
    async fn dedicated_host_auto_enables_silently() {
        let (sessions, gw) = gateway(10);
        assert_eq!(
            gw.on_host_ready(RuntimeMode::DedicatedMultiplayer),
            ReadyOutcome::AutoEnabled
        );
        assert!(gw.is_enabled());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sessions.inbox("op").is_empty(), "no broadcast on auto-enable");
    }

    #[tokio::test]
    async fn dedicated_host_already_enabled() {
        let (_, gw) = gateway(10);
        gw.enable();
        assert_eq!(
            gw.on_host_ready(RuntimeMode::DedicatedMultiplayer),
            ReadyOutcome::AlreadyEnabled
        );
    }

    #[tokio::test]
    async fn singleplayer_stays_disabled_and_warns_once_after_delay() {
        let (sessions, gw) = gateway(30);
        assert_eq!(
            gw.on_host_ready(RuntimeMode::Singleplayer),
            ReadyOutcome::WarningScheduled
        );
        assert!(!gw.is_enabled());
        assert!(sessions.inbox("op").is_empty(), "warning must be deferred");

        tokio::time::sleep(Duration::from_millis(200)).await;
        let inbox = sessions.inbox("op");
        assert_eq!(inbox.len(), 1);
        assert!(inbox[0].contains("disabled by default"));
        assert!(!gw.is_enabled());
    }

    #[tokio::test]
    async fn missed_warning_is_not_retried() {
        let sessions = Arc::new(InMemorySessions::new());
        let gw = CapabilityGateway::new(
            BroadcastGateway::new(sessions.clone()),
            &CapabilityConfig { warning_delay_ms: 10 },
            Handle::current(),
        );
        gw.on_host_ready(RuntimeMode::Singleplayer);
        tokio::time::sleep(Duration::from_millis(100)).await;

        sessions.join("late");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(sessions.inbox("late").is_empty());
    }
}
