//! Message event types crossing the chat bridge.
//!
//! [`InboundMessageEvent`] is what scripts observe when someone posts in a
//! chat channel the bot can see; [`OutboundMessage`] and [`EmbedFields`]
//! describe what scripts send back out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Sentinel `colorRaw` for a member with no colored role.
pub const DEFAULT_COLOR_RAW: u32 = 0x1FFF_FFFF;

/// A role the message author holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub id: String,
    pub name: String,
}

/// Identity and display attributes of a message author.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorAttributes {
    /// Platform user id (snowflake).
    pub id: String,

    /// Username.
    pub name: String,

    /// Global display name, falling back to the username.
    pub display_name: String,

    /// Legacy discriminator (`"0"` for migrated accounts).
    pub discriminator: String,

    /// CDN URL of the avatar, if the user has one.
    pub avatar_url: Option<String>,

    pub is_bot: bool,
    pub is_system: bool,
}

/// Guild membership attributes, present only for guild messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAttributes {
    /// Guild nickname, if set.
    pub nickname: Option<String>,

    /// Color of the highest colored role, or [`DEFAULT_COLOR_RAW`].
    pub color_raw: u32,

    /// Whether the author owns the guild.
    pub is_owner: bool,

    /// Whether the member has not yet passed membership screening.
    pub is_pending: bool,

    /// ISO-8601 join timestamp as reported by the platform.
    pub joined_at: Option<String>,

    /// ISO-8601 timestamp of when the member started boosting.
    pub boosted_at: Option<String>,

    /// Roles ordered by precedence, highest first.
    pub roles: Vec<RoleRef>,
}

impl MemberAttributes {
    /// The highest-precedence role, if any.
    pub fn highest_role(&self) -> Option<&RoleRef> {
        self.roles.first()
    }
}

/// A message received from the chat platform, after bot filtering.
///
/// Immutable once constructed; observers receive it by shared reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessageEvent {
    /// Display form of the message text (mentions rendered by name).
    pub content: String,

    /// Display name of the author.
    pub author_display_name: String,

    /// Platform id of the channel the message was posted in.
    pub origin_channel_id: String,

    /// Name of that channel, or empty if unknown (e.g. DMs).
    pub origin_channel_name: String,

    /// `true` iff `origin_channel_id` is one of the configured binding values.
    pub is_from_configured_channel: bool,

    /// Whether the author is an automated account.
    pub is_automated: bool,

    pub author: AuthorAttributes,

    /// Membership context; `None` outside guilds.
    #[serde(default)]
    pub member: Option<MemberAttributes>,

    /// When the bridge received the message.
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl InboundMessageEvent {
    /// Role names, highest precedence first. Empty without membership.
    pub fn role_names(&self) -> Vec<&str> {
        self.roles().iter().map(|r| r.name.as_str()).collect()
    }

    /// Role ids, highest precedence first. Empty without membership.
    pub fn role_ids(&self) -> Vec<&str> {
        self.roles().iter().map(|r| r.id.as_str()).collect()
    }

    /// Number of roles the author holds.
    pub fn role_count(&self) -> usize {
        self.roles().len()
    }

    fn roles(&self) -> &[RoleRef] {
        self.member.as_ref().map(|m| m.roles.as_slice()).unwrap_or(&[])
    }

    /// Flatten into the JSON object scripts receive.
    ///
    /// The `user` object carries author attributes plus role attributes;
    /// membership-only keys (`colorRaw`, `isOwner`, ...) are present only
    /// for guild messages.
    pub fn to_script_value(&self) -> Value {
        let a = &self.author;
        let mut user = json!({
            "id": a.id,
            "name": a.name,
            "displayName": a.display_name,
            "discriminator": a.discriminator,
            "avatarUrl": a.avatar_url,
            "isBot": a.is_bot,
            "isSystem": a.is_system,
            "roles": self.role_names(),
            "roleIds": self.role_ids(),
            "roleCount": self.role_count(),
        });

        let highest = self.member.as_ref().and_then(MemberAttributes::highest_role);
        user["highestRole"] = json!(highest.map(|r| &r.name));
        user["highestRoleId"] = json!(highest.map(|r| &r.id));
        user["nickname"] = json!(self.member.as_ref().and_then(|m| m.nickname.as_ref()));

        if let Some(m) = &self.member {
            user["colorRaw"] = json!(m.color_raw);
            user["isOwner"] = json!(m.is_owner);
            user["isPending"] = json!(m.is_pending);
            user["joinedAt"] = json!(m.joined_at);
            user["boostedAt"] = json!(m.boosted_at);
        }

        json!({
            "content": self.content,
            "author": self.author_display_name,
            "channelId": self.origin_channel_id,
            "channelName": self.origin_channel_name,
            "isFromConfiguredChannel": self.is_from_configured_channel,
            "isBot": self.is_automated,
            "user": user,
        })
    }
}

/// A plain-text message a script asked to send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Logical channel key.
    pub channel_key: String,

    /// Text as supplied by the script.
    pub raw_text: String,

    /// Whether the sanitization pipeline runs before sending.
    pub sanitize: bool,
}

impl OutboundMessage {
    pub fn new(channel_key: impl Into<String>, raw_text: impl Into<String>, sanitize: bool) -> Self {
        Self {
            channel_key: channel_key.into(),
            raw_text: raw_text.into(),
            sanitize,
        }
    }
}

/// Optional fields of a structured embed. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl EmbedFields {
    /// Build from a loosely-typed script object.
    ///
    /// String fields are taken only when they are strings; `color` only when
    /// it is a number. Anything else is ignored.
    pub fn from_script_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_owned);
        let color = value.get("color").and_then(|c| {
            c.as_u64()
                .or_else(|| c.as_i64().map(|i| i as u64))
                .or_else(|| c.as_f64().map(|f| f as u64))
                .map(|c| (c & 0xFF_FFFF) as u32)
        });
        Self {
            title: text("title"),
            description: text("description"),
            color,
            footer: text("footer"),
        }
    }

    /// `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.footer.is_none()
    }
}
