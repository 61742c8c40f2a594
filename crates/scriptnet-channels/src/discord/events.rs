//! Discord Gateway event types and opcodes.
//!
//! These types model the subset of the Discord Gateway v10 WebSocket
//! protocol the bridge uses: session management, the guild/channel/role
//! events that feed the entity cache, and `MESSAGE_CREATE`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Gateway opcodes ─────────────────────────────────────────────────────

/// Opcode 0: Dispatch -- an event was dispatched.
pub const OP_DISPATCH: u8 = 0;

/// Opcode 1: Heartbeat -- fired periodically to keep the connection alive.
pub const OP_HEARTBEAT: u8 = 1;

/// Opcode 2: Identify -- start a new session.
pub const OP_IDENTIFY: u8 = 2;

/// Opcode 3: Presence Update -- update the bot's activity.
pub const OP_PRESENCE_UPDATE: u8 = 3;

/// Opcode 6: Resume -- resume a previous session.
pub const OP_RESUME: u8 = 6;

/// Opcode 7: Reconnect -- server is going away, client should reconnect.
pub const OP_RECONNECT: u8 = 7;

/// Opcode 9: Invalid Session -- the session has been invalidated.
pub const OP_INVALID_SESSION: u8 = 9;

/// Opcode 10: Hello -- sent on connection, contains heartbeat_interval.
pub const OP_HELLO: u8 = 10;

/// Opcode 11: Heartbeat ACK -- sent in response to receiving a heartbeat.
pub const OP_HEARTBEAT_ACK: u8 = 11;

// ── Close codes ─────────────────────────────────────────────────────────

/// Close codes after which reconnecting cannot succeed.
///
/// 4004 authentication failed, 4010 invalid shard, 4011 sharding required,
/// 4012 invalid API version, 4013 invalid intents, 4014 disallowed intents.
pub const FATAL_CLOSE_CODES: [u16; 6] = [4004, 4010, 4011, 4012, 4013, 4014];

/// Activity type 0: "Playing {name}".
pub const ACTIVITY_PLAYING: u8 = 0;

// ── Payload types ───────────────────────────────────────────────────────

/// A Gateway payload (incoming or outgoing).
///
/// All Gateway communication uses this envelope format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayload {
    /// The opcode for this payload.
    pub op: u8,

    /// Event data (the `d` field). May be `null` for heartbeats.
    pub d: Option<Value>,

    /// Sequence number, used for resuming sessions and heartbeats.
    /// Only present for opcode 0 (Dispatch).
    pub s: Option<u64>,

    /// Event name (e.g., `"MESSAGE_CREATE"`, `"READY"`).
    /// Only present for opcode 0 (Dispatch).
    pub t: Option<String>,
}

impl GatewayPayload {
    /// An outgoing payload with no sequence or event name.
    pub fn command(op: u8, d: Option<Value>) -> Self {
        Self {
            op,
            d,
            s: None,
            t: None,
        }
    }

    /// A heartbeat carrying the last received sequence number.
    pub fn heartbeat(seq: u64) -> Self {
        Self::command(
            OP_HEARTBEAT,
            if seq > 0 { Some(Value::from(seq)) } else { None },
        )
    }
}

/// The `d` field of an opcode 10 (Hello) payload.
#[derive(Debug, Clone, Deserialize)]
pub struct HelloData {
    /// Interval (in milliseconds) between sending heartbeats.
    pub heartbeat_interval: u64,
}

/// The `d` field of an opcode 2 (Identify) payload.
#[derive(Debug, Clone, Serialize)]
pub struct IdentifyPayload {
    /// Authentication token.
    pub token: String,

    /// Gateway intents bitmask.
    pub intents: u32,

    /// Connection properties (OS, browser, device).
    pub properties: ConnectionProperties,

    /// Initial presence, re-applied after reconnects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence: Option<PresenceUpdate>,
}

/// Connection properties sent in the Identify payload.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionProperties {
    /// Operating system.
    pub os: String,

    /// Library / browser name.
    pub browser: String,

    /// Device name.
    pub device: String,
}

/// The `d` field of an opcode 6 (Resume) payload.
#[derive(Debug, Clone, Serialize)]
pub struct ResumePayload {
    /// Authentication token.
    pub token: String,

    /// Session ID from the READY event.
    pub session_id: String,

    /// Last sequence number received.
    pub seq: u64,
}

/// The `d` field of an opcode 3 (Presence Update) payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresenceUpdate {
    pub since: Option<u64>,
    pub activities: Vec<Activity>,
    pub status: String,
    pub afk: bool,
}

impl PresenceUpdate {
    /// Online, "Playing {name}".
    pub fn playing(name: impl Into<String>) -> Self {
        Self {
            since: None,
            activities: vec![Activity {
                name: name.into(),
                kind: ACTIVITY_PLAYING,
            }],
            status: "online".into(),
            afk: false,
        }
    }
}

/// A bot activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

// ── Dispatch event types ────────────────────────────────────────────────

/// A Discord user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Unique user ID (snowflake).
    pub id: String,

    /// The user's unique username.
    pub username: String,

    /// The user's display name, if set.
    #[serde(default)]
    pub global_name: Option<String>,

    /// Legacy discriminator; `"0"` for migrated accounts.
    #[serde(default = "default_discriminator")]
    pub discriminator: String,

    /// Avatar hash.
    #[serde(default)]
    pub avatar: Option<String>,

    /// Whether this user is a bot.
    #[serde(default)]
    pub bot: bool,

    /// Whether this is an official Discord system user.
    #[serde(default)]
    pub system: bool,
}

fn default_discriminator() -> String {
    "0".into()
}

impl User {
    /// Display name, falling back to the username.
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }

    /// CDN URL of the avatar, if the user has one.
    pub fn avatar_url(&self) -> Option<String> {
        let hash = self.avatar.as_deref()?;
        let ext = if hash.starts_with("a_") { "gif" } else { "png" };
        Some(format!(
            "https://cdn.discordapp.com/avatars/{}/{hash}.{ext}",
            self.id
        ))
    }
}

/// Guild membership as attached to `MESSAGE_CREATE` (no nested user).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialMember {
    /// Guild nickname.
    #[serde(default)]
    pub nick: Option<String>,

    /// Role ids, in no particular order.
    #[serde(default)]
    pub roles: Vec<String>,

    /// ISO-8601 join timestamp.
    #[serde(default)]
    pub joined_at: Option<String>,

    /// ISO-8601 timestamp of when the member started boosting.
    #[serde(default)]
    pub premium_since: Option<String>,

    /// Whether the member has not passed membership screening.
    #[serde(default)]
    pub pending: bool,

    /// Present on `GUILD_CREATE` member lists.
    #[serde(default)]
    pub user: Option<User>,
}

/// A `MESSAGE_CREATE` event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageCreate {
    /// Unique message ID.
    pub id: String,

    /// Channel ID where the message was sent.
    pub channel_id: String,

    /// Text content of the message.
    #[serde(default)]
    pub content: String,

    /// The author of the message.
    pub author: User,

    /// Guild (server) ID, if applicable.
    #[serde(default)]
    pub guild_id: Option<String>,

    /// The author's membership, for guild messages.
    #[serde(default)]
    pub member: Option<PartialMember>,

    /// Users mentioned in the message.
    #[serde(default)]
    pub mentions: Vec<User>,
}

/// A guild role.
#[derive(Debug, Clone, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    /// RGB color; 0 means "no color".
    #[serde(default)]
    pub color: u32,
    /// Higher positions take precedence.
    #[serde(default)]
    pub position: i64,
}

/// A guild or DM channel.
#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub guild_id: Option<String>,
}

/// Channel types a bot can post plain messages to: guild text,
/// announcement, and the three thread kinds.
pub const MESSAGEABLE_CHANNEL_KINDS: [u8; 5] = [0, 5, 10, 11, 12];

impl Channel {
    pub fn is_messageable(&self) -> bool {
        MESSAGEABLE_CHANNEL_KINDS.contains(&self.kind)
    }
}

/// A `GUILD_CREATE` event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Guild {
    pub id: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub members: Vec<PartialMember>,
}

/// A guild entry in READY, or a `GUILD_DELETE` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UnavailableGuild {
    pub id: String,
    #[serde(default)]
    pub unavailable: bool,
}

/// `GUILD_ROLE_CREATE` / `GUILD_ROLE_UPDATE` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildRoleEvent {
    pub guild_id: String,
    pub role: Role,
}

/// `GUILD_ROLE_DELETE` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildRoleDelete {
    pub guild_id: String,
    pub role_id: String,
}

/// The `d` field of a READY event.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyEvent {
    /// Gateway version.
    pub v: u32,

    /// The bot user object.
    pub user: User,

    /// Guilds the bot is in; each arrives later as `GUILD_CREATE`.
    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,

    /// Session ID for resuming.
    pub session_id: String,

    /// The gateway URL for resuming.
    #[serde(default)]
    pub resume_gateway_url: Option<String>,
}

/// Rate limit information parsed from Discord REST API response headers.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Number of remaining requests in the current window.
    pub remaining: Option<u32>,

    /// Time in seconds until the rate limit resets.
    pub reset_after: Option<f64>,

    /// The rate limit bucket identifier.
    pub bucket: Option<String>,
}

impl RateLimitInfo {
    /// Parse rate limit information from HTTP response headers.
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Self {
        let text = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        Self {
            remaining: text("x-ratelimit-remaining").and_then(|v| v.parse().ok()),
            reset_after: text("x-ratelimit-reset-after").and_then(|v| v.parse().ok()),
            bucket: text("x-ratelimit-bucket").map(String::from),
        }
    }

    /// Check if we are rate limited (remaining == 0).
    pub fn is_limited(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Get the number of milliseconds to wait before retrying.
    pub fn retry_after_ms(&self) -> Option<u64> {
        self.reset_after.map(|s| (s * 1000.0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_hello() {
        let json = r#"{"op": 10, "d": {"heartbeat_interval": 41250}, "s": null, "t": null}"#;
        let payload: GatewayPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.op, OP_HELLO);
        let hello: HelloData = serde_json::from_value(payload.d.unwrap()).unwrap();
        assert_eq!(hello.heartbeat_interval, 41250);
    }

    #[test]
    fn deserialize_message_create_with_member_and_mentions() {
        let json = r#"{
            "id": "1",
            "channel_id": "100",
            "content": "hi <@55>",
            "guild_id": "900",
            "author": {
                "id": "42", "username": "ann", "global_name": "Ann",
                "discriminator": "0", "avatar": "a_abc"
            },
            "member": {
                "nick": "annie", "roles": ["7", "3"],
                "joined_at": "2024-01-01T00:00:00+00:00", "pending": false
            },
            "mentions": [{ "id": "55", "username": "bo" }]
        }"#;
        let msg: MessageCreate = serde_json::from_str(json).unwrap();
        assert_eq!(msg.author.display_name(), "Ann");
        assert_eq!(
            msg.author.avatar_url().as_deref(),
            Some("https://cdn.discordapp.com/avatars/42/a_abc.gif")
        );
        let member = msg.member.unwrap();
        assert_eq!(member.nick.as_deref(), Some("annie"));
        assert_eq!(member.roles, vec!["7", "3"]);
        assert_eq!(msg.mentions[0].display_name(), "bo");
    }

    #[test]
    fn dm_message_has_no_member() {
        let json = r#"{
            "id": "1", "channel_id": "2", "content": "dm",
            "author": {"id": "3", "username": "u"}
        }"#;
        let msg: MessageCreate = serde_json::from_str(json).unwrap();
        assert!(msg.member.is_none());
        assert!(msg.mentions.is_empty());
        assert_eq!(msg.author.discriminator, "0");
        assert!(msg.author.avatar_url().is_none());
    }

    #[test]
    fn serialize_identify_with_presence() {
        let identify = IdentifyPayload {
            token: "my-token".into(),
            intents: 37377,
            properties: ConnectionProperties {
                os: "linux".into(),
                browser: "scriptnet".into(),
                device: "scriptnet".into(),
            },
            presence: Some(PresenceUpdate::playing("Minecraft")),
        };
        let json = serde_json::to_value(&identify).unwrap();
        assert_eq!(json["intents"], 37377);
        assert_eq!(json["presence"]["activities"][0]["name"], "Minecraft");
        assert_eq!(json["presence"]["activities"][0]["type"], 0);
    }

    #[test]
    fn serialize_identify_without_presence_omits_field() {
        let identify = IdentifyPayload {
            token: "t".into(),
            intents: 1,
            properties: ConnectionProperties {
                os: "linux".into(),
                browser: "b".into(),
                device: "d".into(),
            },
            presence: None,
        };
        let json = serde_json::to_value(&identify).unwrap();
        assert!(json.get("presence").is_none());
    }

    #[test]
    fn heartbeat_carries_sequence() {
        let json = serde_json::to_value(GatewayPayload::heartbeat(42)).unwrap();
        assert_eq!(json["op"], 1);
        assert_eq!(json["d"], 42);
        let json = serde_json::to_value(GatewayPayload::heartbeat(0)).unwrap();
        assert!(json["d"].is_null());
    }

    #[test]
    fn deserialize_ready_with_guilds() {
        let json = r#"{
            "v": 10,
            "user": {"id": "123", "username": "bot", "bot": true},
            "guilds": [{"id": "900", "unavailable": true}],
            "session_id": "abc-def"
        }"#;
        let ready: ReadyEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ready.guilds.len(), 1);
        assert!(ready.guilds[0].unavailable);
        assert!(ready.resume_gateway_url.is_none());
    }

    #[test]
    fn deserialize_guild_create() {
        let json = r#"{
            "id": "900", "owner_id": "42",
            "roles": [{"id": "7", "name": "Admin", "color": 16711680, "position": 5}],
            "channels": [
                {"id": "100", "type": 0, "name": "general"},
                {"id": "101", "type": 2, "name": "voice"}
            ],
            "members": [{"user": {"id": "42", "username": "ann"}, "roles": ["7"]}]
        }"#;
        let guild: Guild = serde_json::from_str(json).unwrap();
        assert_eq!(guild.roles[0].color, 0xFF0000);
        assert!(guild.channels[0].is_messageable());
        assert!(!guild.channels[1].is_messageable());
        assert_eq!(guild.members[0].user.as_ref().unwrap().id, "42");
    }

    #[test]
    fn rate_limit_info_is_limited() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
        headers.insert("x-ratelimit-reset-after", "2.0".parse().unwrap());

        let info = RateLimitInfo::from_headers(&headers);
        assert!(info.is_limited());
        assert_eq!(info.retry_after_ms(), Some(2000));
    }

    #[test]
    fn rate_limit_info_malformed_headers() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-ratelimit-remaining", "not-a-number".parse().unwrap());
        let info = RateLimitInfo::from_headers(&headers);
        assert!(info.remaining.is_none());
        assert!(!info.is_limited());
    }
}
