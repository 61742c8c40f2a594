//! [`ChatBridge`] -- one long-lived Discord bot connection.
//!
//! Inbound traffic arrives over the Gateway WebSocket and is delivered to
//! registered observers; outbound messages go through the REST API as
//! fire-and-forget tasks on the bridge's runtime.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use scriptnet_core::Sanitizer;
use scriptnet_types::config::BridgeConfig;
use scriptnet_types::error::ChannelError;
use scriptnet_types::event::{EmbedFields, InboundMessageEvent, OutboundMessage};
use scriptnet_types::token::BotToken;

use super::api::DiscordApiClient;
use super::cache::EntityCache;
use super::events::{
    Channel, ConnectionProperties, FATAL_CLOSE_CODES, GatewayPayload, Guild, GuildRoleDelete,
    GuildRoleEvent, HelloData, IdentifyPayload, MessageCreate, OP_DISPATCH, OP_HEARTBEAT,
    OP_HEARTBEAT_ACK, OP_HELLO, OP_IDENTIFY, OP_INVALID_SESSION, OP_PRESENCE_UPDATE,
    OP_RECONNECT, OP_RESUME, PresenceUpdate, ReadyEvent, ResumePayload, UnavailableGuild,
};
use super::inbound::{self, MessageObserver};

/// Delay before reconnecting after a connection failure.
const RECONNECT_DELAY_SECS: u64 = 5;

/// Connection lifecycle as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeState {
    /// Connecting or reconnecting to the gateway.
    Connecting,
    /// READY received; announced guilds still arriving.
    SessionReady,
    /// READY received and every announced guild cached.
    Ready,
    /// The gateway closed the session with a code that rules out reconnecting.
    Failed { code: u16, reason: String },
    /// Shut down.
    Stopped,
}

impl BridgeState {
    fn is_settled(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed { .. } | Self::Stopped)
    }
}

/// Commands forwarded into the connection loop.
#[derive(Debug)]
pub(crate) enum GatewayCommand {
    Presence(PresenceUpdate),
}

enum SessionEnd {
    Reconnect,
    Cancelled,
    Fatal { code: u16, reason: String },
}

/// A bot connection to the chat platform.
///
/// Channel bindings are fixed at construction. All send paths resolve a
/// logical key to a channel id, check the channel against the entity cache,
/// and hand the REST call to a background task.
pub struct ChatBridge {
    config: BridgeConfig,
    token: BotToken,
    api: DiscordApiClient,
    cache: EntityCache,
    sanitizer: Sanitizer,
    observers: RwLock<Vec<MessageObserver>>,
    runtime: Handle,
    cancel: CancellationToken,
    state: watch::Sender<BridgeState>,
    commands: mpsc::UnboundedSender<GatewayCommand>,
    pending_commands: Mutex<Option<mpsc::UnboundedReceiver<GatewayCommand>>>,
    /// Re-sent with every Identify so reconnects keep the activity.
    presence: Mutex<Option<PresenceUpdate>>,
    /// Last received sequence number for heartbeats and resuming.
    sequence: AtomicU64,
    /// Session ID from the READY event (for resuming).
    session_id: Mutex<Option<String>>,
    /// Resume gateway URL from the READY event.
    resume_url: Mutex<Option<String>>,
}

impl std::fmt::Debug for ChatBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatBridge")
            .field("channels", &self.config.channels)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl ChatBridge {
    /// Build a bridge without connecting.
    ///
    /// Fails with [`ChannelError::MissingToken`] when neither `token` nor
    /// the `token_env` variable supplies a token.
    pub fn new(config: BridgeConfig, runtime: Handle) -> Result<Arc<Self>, ChannelError> {
        let token = config.resolved_token();
        if token.is_empty() {
            return Err(ChannelError::MissingToken);
        }

        let (commands, pending) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(BridgeState::Connecting);
        Ok(Arc::new(Self {
            api: DiscordApiClient::new(token.clone(), config.api_base_url.clone()),
            token,
            cache: EntityCache::new(),
            sanitizer: Sanitizer::new(),
            observers: RwLock::new(Vec::new()),
            runtime,
            cancel: CancellationToken::new(),
            state,
            commands,
            pending_commands: Mutex::new(Some(pending)),
            presence: Mutex::new(None),
            sequence: AtomicU64::new(0),
            session_id: Mutex::new(None),
            resume_url: Mutex::new(None),
            config,
        }))
    }

    /// Build a bridge and wait until it is ready to use.
    pub async fn connect(config: BridgeConfig, runtime: Handle) -> Result<Arc<Self>, ChannelError> {
        let bridge = Self::new(config, runtime)?;
        bridge.start().await?;
        Ok(bridge)
    }

    /// Spawn the gateway loop and wait for READY plus every announced guild.
    ///
    /// If READY arrived but some guilds did not within `ready_timeout_secs`,
    /// the bridge is returned usable with a warning. If READY never arrived
    /// the bridge is shut down and an error returned.
    pub async fn start(self: &Arc<Self>) -> Result<(), ChannelError> {
        let Some(commands) = self.pending_commands.lock().take() else {
            return Err(ChannelError::Other("chat bridge already started".into()));
        };
        if self.cancel.is_cancelled() {
            return Err(ChannelError::NotConnected);
        }

        let mut watcher = self.state.subscribe();
        self.runtime.spawn(Arc::clone(self).run(commands));

        let timeout = self.config.ready_timeout();
        let current = match tokio::time::timeout(timeout, watcher.wait_for(BridgeState::is_settled)).await {
            Ok(Ok(settled)) => settled.clone(),
            Ok(Err(_)) => BridgeState::Stopped,
            Err(_) => self.state(),
        };

        match current {
            BridgeState::Ready => Ok(()),
            BridgeState::SessionReady => {
                warn!(
                    timeout_secs = timeout.as_secs(),
                    "not every guild arrived before the ready timeout; continuing"
                );
                Ok(())
            }
            BridgeState::Failed { code: 4004, reason } => Err(ChannelError::AuthFailed(reason)),
            BridgeState::Failed { code, reason } => Err(ChannelError::ConnectionFailed(format!(
                "gateway closed with {code}: {reason}"
            ))),
            BridgeState::Stopped => Err(ChannelError::NotConnected),
            BridgeState::Connecting => {
                self.shutdown();
                Err(ChannelError::ConnectionFailed(format!(
                    "no READY from gateway within {}s",
                    timeout.as_secs()
                )))
            }
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state.borrow().clone()
    }

    /// Entities seen on the gateway.
    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    // ── Outbound ────────────────────────────────────────────────────────

    /// Send `text` to the channel bound to `channel_key`.
    ///
    /// Returns whether the request was dispatched; delivery failures are
    /// logged by the background task.
    pub fn send(&self, channel_key: &str, text: &str) -> bool {
        self.try_send(channel_key, text).is_ok()
    }

    /// Like [`send`](Self::send), reporting why dispatch was refused.
    pub fn try_send(&self, channel_key: &str, text: &str) -> Result<(), ChannelError> {
        self.send_message(OutboundMessage::new(
            channel_key,
            text,
            self.config.sanitize_messages,
        ))
    }

    /// Dispatch one outbound message, sanitizing it when `message.sanitize`
    /// is set regardless of the bridge-wide flag.
    pub fn send_message(&self, message: OutboundMessage) -> Result<(), ChannelError> {
        let OutboundMessage {
            channel_key: key,
            raw_text,
            sanitize,
        } = message;
        let channel_id = self.resolve_channel(&key)?;
        let content = if sanitize {
            self.sanitizer.sanitize(&raw_text, &self.cache)
        } else {
            raw_text
        };

        let api = self.api.clone();
        self.runtime.spawn(async move {
            match api.create_message(&channel_id, &content).await {
                Ok(message_id) => debug!(channel_key = %key, message_id = %message_id, "message delivered"),
                Err(e) => error!(channel_key = %key, error = %e, "failed to deliver chat message"),
            }
        });
        Ok(())
    }

    /// Send an embed to the channel bound to `channel_key`.
    ///
    /// The description is sanitized under the same flag as plain sends.
    pub fn send_embed(&self, channel_key: &str, fields: EmbedFields) -> bool {
        self.try_send_embed(channel_key, fields).is_ok()
    }

    pub fn try_send_embed(&self, channel_key: &str, mut fields: EmbedFields) -> Result<(), ChannelError> {
        if fields.is_empty() {
            warn!(channel_key = %channel_key, "refusing to send an embed with no fields");
            return Err(ChannelError::Other("embed has no fields".into()));
        }
        let channel_id = self.resolve_channel(channel_key)?;
        if self.config.sanitize_messages
            && let Some(description) = fields.description.take()
        {
            fields.description = Some(self.sanitizer.sanitize(&description, &self.cache));
        }

        let api = self.api.clone();
        let key = channel_key.to_owned();
        self.runtime.spawn(async move {
            if let Err(e) = api.create_embed(&channel_id, &fields).await {
                error!(channel_key = %key, error = %e, "failed to deliver chat embed");
            }
        });
        Ok(())
    }

    fn resolve_channel(&self, channel_key: &str) -> Result<String, ChannelError> {
        if self.cancel.is_cancelled() {
            debug!(channel_key = %channel_key, "send after shutdown ignored");
            return Err(ChannelError::NotConnected);
        }
        let Some(channel_id) = self.config.channels.get(channel_key) else {
            warn!(channel_key = %channel_key, "channel key not found in configuration");
            return Err(ChannelError::UnknownChannelKey(channel_key.to_owned()));
        };
        if !self.cache.is_messageable(channel_id) {
            warn!(channel_key = %channel_key, channel_id = %channel_id, "chat channel not found");
            return Err(ChannelError::ChannelNotFound(channel_id.clone()));
        }
        Ok(channel_id.clone())
    }

    /// Show "Playing {text}" on the bot. Best-effort.
    pub fn set_presence(&self, text: &str) {
        let presence = PresenceUpdate::playing(text);
        *self.presence.lock() = Some(presence.clone());
        if self.commands.send(GatewayCommand::Presence(presence)).is_err() {
            debug!("gateway loop has ended; presence not sent");
        }
    }

    // ── Inbound ─────────────────────────────────────────────────────────

    /// Register an observer for inbound messages.
    pub fn on_message<F>(&self, observer: F)
    where
        F: Fn(&InboundMessageEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.add_observer(Arc::new(observer));
    }

    pub fn add_observer(&self, observer: MessageObserver) {
        let mut observers = self.observers.write();
        observers.push(observer);
        debug!(count = observers.len(), "chat observer registered");
    }

    /// Release the gateway connection. Idempotent; in-flight sends finish.
    pub fn shutdown(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        info!("chat bridge shutting down");
        self.cancel.cancel();
        self.state.send_replace(BridgeState::Stopped);
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    // ── Gateway loop ────────────────────────────────────────────────────

    async fn run(self: Arc<Self>, mut commands: mpsc::UnboundedReceiver<GatewayCommand>) {
        info!("chat bridge gateway starting");

        loop {
            let gateway_url = self
                .resume_url
                .lock()
                .as_deref()
                .map(versioned_url)
                .unwrap_or_else(|| self.config.gateway_url.clone());

            let connected = tokio::select! {
                _ = self.cancel.cancelled() => break,
                result = tokio_tungstenite::connect_async(&gateway_url) => result,
            };

            let end = match connected {
                Ok((stream, _)) => {
                    info!("chat gateway connected");
                    self.session(stream, &mut commands).await
                }
                Err(e) => {
                    error!(error = %e, "failed to connect chat gateway");
                    SessionEnd::Reconnect
                }
            };

            match end {
                SessionEnd::Cancelled => break,
                SessionEnd::Fatal { code, reason } => {
                    error!(code, reason = %reason, "chat gateway closed the session for good");
                    self.cancel.cancel();
                    self.state.send_replace(BridgeState::Failed { code, reason });
                    return;
                }
                SessionEnd::Reconnect => {
                    self.state.send_if_modified(|s| {
                        let changed = !matches!(s, BridgeState::Connecting | BridgeState::Stopped);
                        if changed {
                            *s = BridgeState::Connecting;
                        }
                        changed
                    });
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_secs(RECONNECT_DELAY_SECS)) => {
                    info!("reconnecting chat gateway...");
                }
            }
        }

        self.state.send_replace(BridgeState::Stopped);
        info!("chat bridge gateway stopped");
    }

    /// One WebSocket session, from Hello until it drops.
    async fn session<S>(
        &self,
        stream: S,
        commands: &mut mpsc::UnboundedReceiver<GatewayCommand>,
    ) -> SessionEnd
    where
        S: futures_util::Stream<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>>
            + Sink<WsMessage, Error = tokio_tungstenite::tungstenite::Error>
            + Unpin,
    {
        let (mut ws_write, mut ws_read) = stream.split();

        // Wait for Hello (opcode 10).
        let heartbeat_interval = loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    let _ = ws_write.close().await;
                    return SessionEnd::Cancelled;
                }
                msg = ws_read.next() => match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        if let Ok(payload) = serde_json::from_str::<GatewayPayload>(&text)
                            && payload.op == OP_HELLO
                            && let Some(d) = payload.d
                            && let Ok(hello) = serde_json::from_value::<HelloData>(d)
                        {
                            break hello.heartbeat_interval;
                        }
                    }
                    Some(Ok(WsMessage::Close(frame))) => return close_outcome(frame),
                    Some(Err(e)) => {
                        error!(error = %e, "WebSocket error waiting for Hello");
                        return SessionEnd::Reconnect;
                    }
                    None => return SessionEnd::Reconnect,
                    _ => {}
                }
            }
        };

        debug!(interval_ms = heartbeat_interval, "received Hello");

        if let Err(e) = send_payload(&mut ws_write, &self.auth_payload()).await {
            error!(error = %e, "failed to send Resume/Identify");
            return SessionEnd::Reconnect;
        }

        let mut heartbeat_timer = tokio::time::interval(Duration::from_millis(heartbeat_interval));
        // First tick fires immediately; skip it and wait for the
        // first real interval.
        heartbeat_timer.tick().await;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("chat gateway received cancellation");
                    let _ = ws_write.close().await;
                    return SessionEnd::Cancelled;
                }
                _ = heartbeat_timer.tick() => {
                    let seq = self.sequence.load(Ordering::SeqCst);
                    if let Err(e) = send_payload(&mut ws_write, &GatewayPayload::heartbeat(seq)).await {
                        warn!(error = %e, "failed to send heartbeat");
                        return SessionEnd::Reconnect;
                    }
                    debug!(seq = seq, "sent heartbeat");
                }
                Some(command) = commands.recv() => match command {
                    GatewayCommand::Presence(presence) => {
                        let payload = GatewayPayload::command(
                            OP_PRESENCE_UPDATE,
                            serde_json::to_value(&presence).ok(),
                        );
                        if let Err(e) = send_payload(&mut ws_write, &payload).await {
                            warn!(error = %e, "failed to update presence");
                        }
                    }
                },
                msg = ws_read.next() => match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        match serde_json::from_str::<GatewayPayload>(&text) {
                            Ok(payload) => {
                                if let Some(end) = self.handle_payload(payload, &mut ws_write).await {
                                    return end;
                                }
                            }
                            Err(e) => warn!(error = %e, "failed to parse gateway payload"),
                        }
                    }
                    Some(Ok(WsMessage::Close(frame))) => return close_outcome(frame),
                    Some(Ok(WsMessage::Ping(data))) => {
                        let _ = ws_write.send(WsMessage::Pong(data)).await;
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "chat gateway WebSocket error");
                        return SessionEnd::Reconnect;
                    }
                    None => {
                        info!("chat gateway stream ended");
                        return SessionEnd::Reconnect;
                    }
                    _ => {} // Binary, Pong, Frame -- ignore
                }
            }
        }
    }

    /// Resume (op 6) when a session exists, else Identify (op 2).
    fn auth_payload(&self) -> GatewayPayload {
        if let Some(session_id) = self.session_id.lock().clone() {
            let seq = self.sequence.load(Ordering::SeqCst);
            info!(seq = seq, "attempting Resume (OP 6)");
            let resume = ResumePayload {
                token: self.token.gateway_value().to_owned(),
                session_id,
                seq,
            };
            GatewayPayload::command(OP_RESUME, serde_json::to_value(resume).ok())
        } else {
            debug!("no session_id available, sending Identify (OP 2)");
            let identify = IdentifyPayload {
                token: self.token.gateway_value().to_owned(),
                intents: self.config.intents,
                properties: ConnectionProperties {
                    os: std::env::consts::OS.to_owned(),
                    browser: "scriptnet".into(),
                    device: "scriptnet".into(),
                },
                presence: self.presence.lock().clone(),
            };
            GatewayPayload::command(OP_IDENTIFY, serde_json::to_value(identify).ok())
        }
    }

    async fn handle_payload<S>(&self, payload: GatewayPayload, ws_write: &mut S) -> Option<SessionEnd>
    where
        S: Sink<WsMessage> + Unpin,
        S::Error: std::fmt::Display,
    {
        if let Some(s) = payload.s {
            self.sequence.store(s, Ordering::SeqCst);
        }

        match payload.op {
            OP_DISPATCH => {
                if let Some(event) = payload.t.as_deref() {
                    self.handle_dispatch(event, payload.d.unwrap_or(Value::Null));
                }
            }
            OP_HEARTBEAT_ACK => debug!("heartbeat acknowledged"),
            OP_HEARTBEAT => {
                // Server requesting immediate heartbeat.
                let seq = self.sequence.load(Ordering::SeqCst);
                let _ = send_payload(ws_write, &GatewayPayload::heartbeat(seq)).await;
            }
            OP_RECONNECT => {
                info!("server requested reconnect");
                return Some(SessionEnd::Reconnect);
            }
            OP_INVALID_SESSION => {
                let resumable = payload.d.as_ref().and_then(Value::as_bool).unwrap_or(false);
                if resumable {
                    // Session state is kept so the next connection resumes.
                    let jitter_ms = 1000
                        + (std::time::SystemTime::now()
                            .duration_since(std::time::UNIX_EPOCH)
                            .unwrap_or_default()
                            .subsec_millis()
                            % 4000);
                    warn!(jitter_ms, "invalid session (resumable), retrying");
                    tokio::time::sleep(Duration::from_millis(jitter_ms.into())).await;
                } else {
                    warn!("invalid session (not resumable), clearing state for fresh Identify");
                    *self.session_id.lock() = None;
                    *self.resume_url.lock() = None;
                    self.sequence.store(0, Ordering::SeqCst);
                }
                return Some(SessionEnd::Reconnect);
            }
            op => debug!(op, "unhandled opcode"),
        }
        None
    }

    /// Apply one dispatch event to the cache and observers.
    pub(crate) fn handle_dispatch(&self, event: &str, d: Value) {
        match event {
            "READY" => {
                if let Some(ready) = parse::<ReadyEvent>(event, d) {
                    info!(
                        bot_id = %ready.user.id,
                        bot_name = %ready.user.username,
                        guilds = ready.guilds.len(),
                        "chat bridge authenticated"
                    );
                    self.cache.apply_ready(&ready);
                    *self.session_id.lock() = Some(ready.session_id);
                    *self.resume_url.lock() = ready.resume_gateway_url;
                    self.state.send_replace(BridgeState::SessionReady);
                    self.mark_ready_if_complete();
                }
            }
            "RESUMED" => {
                info!("session resumed successfully");
                self.mark_ready_if_complete();
            }
            "GUILD_CREATE" => {
                if let Some(guild) = parse::<Guild>(event, d) {
                    self.cache.apply_guild_create(guild);
                    self.mark_ready_if_complete();
                }
            }
            "GUILD_DELETE" => {
                if let Some(guild) = parse::<UnavailableGuild>(event, d) {
                    self.cache.apply_guild_delete(&guild);
                    self.mark_ready_if_complete();
                }
            }
            "CHANNEL_CREATE" | "CHANNEL_UPDATE" => {
                if let Some(channel) = parse::<Channel>(event, d) {
                    self.cache.upsert_channel(channel);
                }
            }
            "CHANNEL_DELETE" => {
                if let Some(channel) = parse::<Channel>(event, d) {
                    self.cache.remove_channel(&channel.id);
                }
            }
            "GUILD_ROLE_CREATE" | "GUILD_ROLE_UPDATE" => {
                if let Some(role) = parse::<GuildRoleEvent>(event, d) {
                    self.cache.upsert_role(role);
                }
            }
            "GUILD_ROLE_DELETE" => {
                if let Some(role) = parse::<GuildRoleDelete>(event, d) {
                    self.cache.remove_role(&role);
                }
            }
            "MESSAGE_CREATE" => {
                if let Some(msg) = parse::<MessageCreate>(event, d) {
                    self.process_message_create(&msg);
                }
            }
            other => debug!(event = %other, "unhandled dispatch event"),
        }
    }

    fn mark_ready_if_complete(&self) {
        if !self.cache.is_ready() {
            return;
        }
        let became_ready = self.state.send_if_modified(|s| {
            let changed = matches!(s, BridgeState::SessionReady | BridgeState::Connecting);
            if changed {
                *s = BridgeState::Ready;
            }
            changed
        });
        if became_ready {
            info!("chat bridge ready");
        }
    }

    fn process_message_create(&self, msg: &MessageCreate) {
        self.cache.remember_user(&msg.author);
        for user in &msg.mentions {
            self.cache.remember_user(user);
        }

        let Some(event) = inbound::build_event(msg, &self.cache, &self.config) else {
            return;
        };

        let observers = self.observers.read().clone();
        if observers.is_empty() {
            debug!(channel_id = %msg.channel_id, "inbound message with no observers");
            return;
        }
        let delivered = inbound::dispatch(&observers, &event);
        debug!(
            channel_id = %msg.channel_id,
            delivered,
            observers = observers.len(),
            "inbound message dispatched"
        );
    }
}

fn parse<T: DeserializeOwned>(event: &str, d: Value) -> Option<T> {
    serde_json::from_value(d)
        .inspect_err(|e| warn!(event = %event, error = %e, "failed to parse dispatch event"))
        .ok()
}

async fn send_payload<S>(sink: &mut S, payload: &GatewayPayload) -> Result<(), ChannelError>
where
    S: Sink<WsMessage> + Unpin,
    S::Error: std::fmt::Display,
{
    let json = serde_json::to_string(payload).map_err(|e| ChannelError::Other(e.to_string()))?;
    sink.send(WsMessage::Text(json))
        .await
        .map_err(|e| ChannelError::ConnectionFailed(e.to_string()))
}

fn close_outcome(frame: Option<CloseFrame<'_>>) -> SessionEnd {
    let Some(frame) = frame else {
        info!("chat gateway closed by server");
        return SessionEnd::Reconnect;
    };
    let code = u16::from(frame.code);
    if FATAL_CLOSE_CODES.contains(&code) {
        SessionEnd::Fatal {
            code,
            reason: frame.reason.into_owned(),
        }
    } else {
        info!(code, reason = %frame.reason, "chat gateway closed by server");
        SessionEnd::Reconnect
    }
}

/// The resume URL with the gateway version and encoding query.
fn versioned_url(url: &str) -> String {
    if url.contains('?') {
        url.to_owned()
    } else {
        format!("{}/?v=10&encoding=json", url.trim_end_matches('/'))
    }
}
