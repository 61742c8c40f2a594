//! Host lifecycle tests for the capability gateway.
//!
//! Drives the gateway the way a host does: server ready, operator
//! commands, server stopping. Sessions are in-memory so the broadcasts
//! the gateway emits can be inspected.

use std::sync::Arc;
use std::time::Duration;

use scriptnet_core::admin::{AdminAction, AdminCommands, ScriptReloader};
use scriptnet_core::broadcast::InMemorySessions;
use scriptnet_core::{BroadcastGateway, CapabilityGateway, ReadyOutcome, RuntimeMode};
use scriptnet_types::config::CapabilityConfig;
use tokio::runtime::Handle;

struct NoopReloader;

impl ScriptReloader for NoopReloader {
    fn request_reload(&self) {}
}

fn host(delay_ms: u64) -> (Arc<InMemorySessions>, Arc<CapabilityGateway>) {
    let sessions = Arc::new(InMemorySessions::new());
    let gateway = Arc::new(CapabilityGateway::new(
        BroadcastGateway::new(sessions.clone()),
        &CapabilityConfig {
            warning_delay_ms: delay_ms,
        },
        Handle::current(),
    ));
    (sessions, gateway)
}

#[tokio::test]
async fn singleplayer_session_sees_warning_then_operator_enables() {
    let (sessions, gateway) = host(20);
    let admin = AdminCommands::new(gateway.clone(), Arc::new(NoopReloader));

    assert_eq!(
        gateway.on_host_ready(RuntimeMode::Singleplayer),
        ReadyOutcome::WarningScheduled
    );
    // The player attaches inside the delay window.
    sessions.join("steve");
    tokio::time::sleep(Duration::from_millis(150)).await;

    let inbox = sessions.inbox("steve");
    assert_eq!(inbox.len(), 1);
    assert!(inbox[0].starts_with('\u{00A7}'), "color directive translated: {inbox:?}");

    let reply = admin.execute(AdminAction::Enable, 4);
    assert!(reply.success);
    assert!(gateway.is_enabled());
    assert_eq!(sessions.inbox("steve").len(), 3);

    gateway.on_host_stopping();
    assert!(!gateway.is_enabled());
}

#[tokio::test]
async fn dedicated_lifecycle_enables_then_disables_on_stop() {
    let (sessions, gateway) = host(20);
    sessions.join("alex");

    assert_eq!(
        gateway.on_host_ready(RuntimeMode::DedicatedMultiplayer),
        ReadyOutcome::AutoEnabled
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(sessions.inbox("alex").is_empty());

    gateway.on_host_stopping();
    gateway.on_host_stopping();
    assert!(!gateway.is_enabled());
}

#[test]
fn lifecycle_hooks_from_a_host_thread() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let sessions = Arc::new(InMemorySessions::new());
    sessions.join("op");
    let gateway = CapabilityGateway::new(
        BroadcastGateway::new(sessions.clone()),
        &CapabilityConfig { warning_delay_ms: 10 },
        rt.handle().clone(),
    );

    // Called from a plain thread, not inside the runtime.
    std::thread::scope(|s| {
        s.spawn(|| gateway.on_host_ready(RuntimeMode::Singleplayer));
    });
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(sessions.inbox("op").len(), 1);
}
