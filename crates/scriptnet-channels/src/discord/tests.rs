//! Tests for the Discord bridge send paths and inbound dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use tokio::runtime::Handle;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scriptnet_types::config::BridgeConfig;
use scriptnet_types::error::ChannelError;
use scriptnet_types::event::{EmbedFields, InboundMessageEvent, OutboundMessage};

use super::bridge::{BridgeState, ChatBridge};

// ── Helpers ──────────────────────────────────────────────────────────────

fn make_config(api_base_url: &str) -> BridgeConfig {
    BridgeConfig {
        token: "test-bot-token".into(),
        channels: HashMap::from([
            ("chat".to_string(), "100".to_string()),
            ("voice".to_string(), "101".to_string()),
            ("gone".to_string(), "999".to_string()),
        ]),
        api_base_url: api_base_url.into(),
        ..Default::default()
    }
}

/// A bridge whose cache has seen one guild with a text and a voice channel.
fn seeded_bridge(config: BridgeConfig) -> Arc<ChatBridge> {
    let bridge = ChatBridge::new(config, Handle::current()).unwrap();
    bridge.handle_dispatch(
        "READY",
        json!({
            "v": 10,
            "user": { "id": "1", "username": "bot", "bot": true },
            "guilds": [{ "id": "900", "unavailable": true }],
            "session_id": "session-1"
        }),
    );
    bridge.handle_dispatch(
        "GUILD_CREATE",
        json!({
            "id": "900",
            "owner_id": "42",
            "roles": [
                { "id": "3", "name": "Member", "color": 0, "position": 1 },
                { "id": "7", "name": "Admin", "color": 16711680, "position": 5 }
            ],
            "channels": [
                { "id": "100", "type": 0, "name": "general" },
                { "id": "101", "type": 2, "name": "lounge" }
            ],
            "members": [
                { "user": { "id": "123456", "username": "ann", "global_name": "Ann" }, "roles": [] }
            ]
        }),
    );
    bridge
}

fn created() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "id": "m1", "channel_id": "100" }))
}

/// Wait until the mock server has seen `n` requests (sends are spawned).
async fn wait_for_requests(server: &MockServer, n: usize) {
    for _ in 0..100 {
        if server.received_requests().await.unwrap_or_default().len() >= n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("expected {n} requests");
}

fn message_create(channel_id: &str, bot: bool) -> serde_json::Value {
    json!({
        "id": "m9",
        "channel_id": channel_id,
        "guild_id": "900",
        "content": "hello <@123456>",
        "author": { "id": "42", "username": "owner", "global_name": "Owner", "bot": bot },
        "member": { "nick": "boss", "roles": ["3", "7"], "joined_at": "2024-01-01T00:00:00+00:00" },
        "mentions": [{ "id": "123456", "username": "ann", "global_name": "Ann" }]
    })
}

// ── Construction ─────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_token_fails_construction() {
    let config = BridgeConfig::default();
    let err = ChatBridge::new(config, Handle::current()).unwrap_err();
    assert!(matches!(err, ChannelError::MissingToken));
}

#[tokio::test]
async fn token_can_come_from_env() {
    let var = "SCRIPTNET_TEST_BRIDGE_TOKEN_FROM_ENV";
    // SAFETY: test-local variable name, not read by any other test.
    unsafe { std::env::set_var(var, "env-token") };
    let config = BridgeConfig {
        token_env: Some(var.into()),
        ..Default::default()
    };
    assert!(ChatBridge::new(config, Handle::current()).is_ok());
}

#[tokio::test]
async fn ready_waits_for_announced_guilds() {
    let bridge = ChatBridge::new(make_config("http://unused"), Handle::current()).unwrap();
    assert_eq!(bridge.state(), BridgeState::Connecting);

    bridge.handle_dispatch(
        "READY",
        json!({
            "v": 10,
            "user": { "id": "1", "username": "bot" },
            "guilds": [{ "id": "900", "unavailable": true }],
            "session_id": "s"
        }),
    );
    assert_eq!(bridge.state(), BridgeState::SessionReady);

    bridge.handle_dispatch("GUILD_CREATE", json!({ "id": "900" }));
    assert_eq!(bridge.state(), BridgeState::Ready);
}

// ── Send paths ───────────────────────────────────────────────────────────

#[tokio::test]
async fn send_posts_sanitized_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/100/messages"))
        .and(header("authorization", "Bot test-bot-token"))
        .and(body_json(json!({ "content": "hey @\u{200B}everyone check @\u{200B}Ann" })))
        .respond_with(created())
        .expect(1)
        .mount(&server)
        .await;

    let bridge = seeded_bridge(make_config(&server.uri()));
    assert!(bridge.send("chat", "hey @everyone check <@123456>"));
    wait_for_requests(&server, 1).await;
}

#[tokio::test]
async fn send_without_sanitizing_passes_text_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({ "content": "@everyone raw" })))
        .respond_with(created())
        .expect(1)
        .mount(&server)
        .await;

    let config = BridgeConfig {
        sanitize_messages: false,
        ..make_config(&server.uri())
    };
    let bridge = seeded_bridge(config);
    assert!(bridge.send("chat", "@everyone raw"));
    wait_for_requests(&server, 1).await;
}

#[tokio::test]
async fn outbound_message_flag_overrides_bridge_setting() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({ "content": "@\u{200B}here raw" })))
        .respond_with(created())
        .expect(1)
        .mount(&server)
        .await;

    let config = BridgeConfig {
        sanitize_messages: false,
        ..make_config(&server.uri())
    };
    let bridge = seeded_bridge(config);
    bridge
        .send_message(OutboundMessage::new("chat", "@here raw", true))
        .unwrap();
    wait_for_requests(&server, 1).await;
}

#[tokio::test]
async fn unknown_channel_key_is_not_dispatched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(created())
        .expect(0)
        .mount(&server)
        .await;

    let bridge = seeded_bridge(make_config(&server.uri()));
    assert!(!bridge.send("announcements", "hello"));
    assert!(matches!(
        bridge.try_send("announcements", "hello"),
        Err(ChannelError::UnknownChannelKey(key)) if key == "announcements"
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn unreachable_channel_is_not_dispatched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(created())
        .expect(0)
        .mount(&server)
        .await;

    let bridge = seeded_bridge(make_config(&server.uri()));
    // Voice channels cannot take text; 999 was never announced.
    assert!(!bridge.send("voice", "hello"));
    assert!(matches!(
        bridge.try_send("gone", "hello"),
        Err(ChannelError::ChannelNotFound(id)) if id == "999"
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn delivery_failure_still_reports_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Missing Access"))
        .expect(1)
        .mount(&server)
        .await;

    let bridge = seeded_bridge(make_config(&server.uri()));
    assert!(bridge.send("chat", "hello"));
    wait_for_requests(&server, 1).await;
}

#[tokio::test]
async fn embed_description_is_sanitized_and_unset_fields_omitted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/100/messages"))
        .and(body_json(json!({
            "embeds": [{
                "title": "@everyone stays",
                "description": "@\u{200B}here now",
                "color": 65280
            }]
        })))
        .respond_with(created())
        .expect(1)
        .mount(&server)
        .await;

    let bridge = seeded_bridge(make_config(&server.uri()));
    let fields = EmbedFields {
        title: Some("@everyone stays".into()),
        description: Some("@here now".into()),
        color: Some(65280),
        footer: None,
    };
    assert!(bridge.send_embed("chat", fields));
    wait_for_requests(&server, 1).await;
}

#[tokio::test]
async fn empty_embed_is_refused() {
    let bridge = seeded_bridge(make_config("http://unused"));
    assert!(!bridge.send_embed("chat", EmbedFields::default()));
}

#[tokio::test]
async fn shutdown_is_idempotent_and_stops_sends() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(created())
        .expect(0)
        .mount(&server)
        .await;

    let bridge = seeded_bridge(make_config(&server.uri()));
    bridge.shutdown();
    bridge.shutdown();
    assert!(bridge.is_shut_down());
    assert_eq!(bridge.state(), BridgeState::Stopped);
    assert!(matches!(bridge.try_send("chat", "late"), Err(ChannelError::NotConnected)));
    assert!(bridge.start().await.is_err());
}

// ── Inbound dispatch ─────────────────────────────────────────────────────

#[tokio::test]
async fn message_create_reaches_observers_in_order() {
    let bridge = seeded_bridge(make_config("http://unused"));
    let seen: Arc<Mutex<Vec<(usize, InboundMessageEvent)>>> = Arc::new(Mutex::new(Vec::new()));

    for index in 0..2 {
        let seen = seen.clone();
        bridge.on_message(move |event| {
            seen.lock().push((index, event.clone()));
            Ok(())
        });
    }

    bridge.handle_dispatch("MESSAGE_CREATE", message_create("100", false));

    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0, 0);
    assert_eq!(seen[1].0, 1);

    let event = &seen[0].1;
    assert_eq!(event.content, "hello @Ann");
    assert_eq!(event.author_display_name, "Owner");
    assert_eq!(event.origin_channel_name, "general");
    assert!(event.is_from_configured_channel);
    assert_eq!(event.role_names(), vec!["Admin", "Member"]);

    let value = event.to_script_value();
    assert_eq!(value["user"]["highestRole"], "Admin");
    assert_eq!(value["user"]["isOwner"], true);
    assert_eq!(value["user"]["colorRaw"], 0xFF0000);
}

#[tokio::test]
async fn unconfigured_channel_is_flagged() {
    let bridge = seeded_bridge(make_config("http://unused"));
    let flags = Arc::new(Mutex::new(Vec::new()));
    let sink = flags.clone();
    bridge.on_message(move |event| {
        sink.lock().push(event.is_from_configured_channel);
        Ok(())
    });

    bridge.handle_dispatch("MESSAGE_CREATE", message_create("555", false));
    assert_eq!(*flags.lock(), vec![false]);
}

#[tokio::test]
async fn bot_messages_do_not_reach_observers() {
    let bridge = seeded_bridge(make_config("http://unused"));
    let count = Arc::new(Mutex::new(0));
    let sink = count.clone();
    bridge.on_message(move |_| {
        *sink.lock() += 1;
        Ok(())
    });

    bridge.handle_dispatch("MESSAGE_CREATE", message_create("100", true));
    assert_eq!(*count.lock(), 0);
}

#[tokio::test]
async fn failing_observer_does_not_block_later_ones() {
    let bridge = seeded_bridge(make_config("http://unused"));
    let reached = Arc::new(Mutex::new(false));
    let sink = reached.clone();

    bridge.on_message(|_| anyhow::bail!("observer broke"));
    bridge.on_message(|_| panic!("observer panicked"));
    bridge.on_message(move |_| {
        *sink.lock() = true;
        Ok(())
    });

    bridge.handle_dispatch("MESSAGE_CREATE", message_create("100", false));
    assert!(*reached.lock());
}

#[tokio::test]
async fn mentioned_users_resolve_in_later_sanitize() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({ "content": "hi @\u{200B}Bo" })))
        .respond_with(created())
        .expect(1)
        .mount(&server)
        .await;

    let bridge = seeded_bridge(make_config(&server.uri()));
    let mut msg = message_create("100", false);
    msg["mentions"] = json!([{ "id": "77", "username": "bo", "global_name": "Bo" }]);
    bridge.handle_dispatch("MESSAGE_CREATE", msg);

    assert!(bridge.send("chat", "hi <@77>"));
    wait_for_requests(&server, 1).await;
}

#[tokio::test]
async fn channel_events_change_reachability() {
    let bridge = seeded_bridge(make_config("http://unused"));
    bridge.handle_dispatch("CHANNEL_DELETE", json!({ "id": "100", "type": 0 }));
    assert!(matches!(bridge.try_send("chat", "x"), Err(ChannelError::ChannelNotFound(_))));

    bridge.handle_dispatch(
        "CHANNEL_CREATE",
        json!({ "id": "100", "type": 0, "name": "general", "guild_id": "900" }),
    );
    assert!(bridge.cache().is_messageable("100"));
}
