//! Discord REST API client.
//!
//! [`DiscordApiClient`] provides typed methods for the subset of the
//! Discord REST API the bridge uses: posting plain messages and embeds.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio::time::Instant;
use tracing::{debug, warn};

use scriptnet_types::error::ChannelError;
use scriptnet_types::event::EmbedFields;
use scriptnet_types::token::BotToken;

use super::events::RateLimitInfo;

/// Response from creating a message.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DiscordMessage {
    /// Unique message ID.
    pub id: String,

    /// Channel where the message lives.
    pub channel_id: String,
}

/// HTTP client for the Discord REST API.
///
/// Wraps a [`reqwest::Client`] with Bot token authentication and
/// rate limit tracking. Clones share the connection pool and the
/// rate limit deadline, so every send task waits out an exhausted bucket.
#[derive(Clone)]
pub struct DiscordApiClient {
    /// Shared HTTP client.
    http: Client,
    /// Bot token for API authorization.
    token: BotToken,
    /// Base URL for API calls.
    base_url: String,
    /// No request may start before this instant.
    blocked_until: Arc<Mutex<Option<Instant>>>,
}

impl std::fmt::Debug for DiscordApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl DiscordApiClient {
    /// Create a client for `base_url` (e.g. `https://discord.com/api/v10`).
    pub fn new(token: BotToken, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            token,
            base_url: base_url.trim_end_matches('/').to_owned(),
            blocked_until: Arc::new(Mutex::new(None)),
        }
    }

    /// Return the base URL used for API requests.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a plain-text message to a channel.
    ///
    /// Returns the message ID on success.
    pub async fn create_message(
        &self,
        channel_id: &str,
        content: &str,
    ) -> Result<String, ChannelError> {
        debug!(channel_id = %channel_id, "creating message");
        self.post_message(channel_id, &json!({ "content": content }))
            .await
    }

    /// Send a single embed to a channel. Unset fields are omitted.
    pub async fn create_embed(
        &self,
        channel_id: &str,
        fields: &EmbedFields,
    ) -> Result<String, ChannelError> {
        debug!(channel_id = %channel_id, "creating embed");
        self.post_message(channel_id, &json!({ "embeds": [embed_json(fields)] }))
            .await
    }

    async fn post_message(&self, channel_id: &str, body: &Value) -> Result<String, ChannelError> {
        let url = format!("{}/channels/{channel_id}/messages", self.base_url);

        self.wait_for_rate_limit().await;
        let resp = self
            .http
            .post(&url)
            .header("Authorization", self.token.authorization_header())
            .json(body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))?;

        // Check rate limit headers.
        let rate_limit = RateLimitInfo::from_headers(resp.headers());
        if rate_limit.is_limited() || resp.status() == StatusCode::TOO_MANY_REQUESTS {
            let wait_ms = rate_limit.retry_after_ms().unwrap_or(1000);
            warn!(
                wait_ms = wait_ms,
                bucket = ?rate_limit.bucket,
                "Discord rate limit reached, delaying next request"
            );
            self.block_for(Duration::from_millis(wait_ms));
        }

        let status = resp.status();
        if !status.is_success() {
            let err_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".into());
            return Err(ChannelError::SendFailed(format!(
                "Discord API returned {status}: {err_body}"
            )));
        }

        let msg: DiscordMessage = resp
            .json()
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))?;

        Ok(msg.id)
    }

    /// Sleep until the shared rate limit deadline, if one is pending.
    async fn wait_for_rate_limit(&self) {
        let deadline = *self.blocked_until.lock();
        if let Some(deadline) = deadline
            && deadline > Instant::now()
        {
            debug!(
                wait_ms = deadline.saturating_duration_since(Instant::now()).as_millis() as u64,
                "waiting for Discord rate limit reset"
            );
            tokio::time::sleep_until(deadline).await;
        }
    }

    /// Push the shared deadline out to at least `wait` from now.
    fn block_for(&self, wait: Duration) {
        let until = Instant::now() + wait;
        let mut blocked = self.blocked_until.lock();
        if blocked.is_none_or(|current| current < until) {
            *blocked = Some(until);
        }
    }
}

/// The Discord embed object for `fields`.
pub(crate) fn embed_json(fields: &EmbedFields) -> Value {
    let mut embed = serde_json::Map::new();
    if let Some(title) = &fields.title {
        embed.insert("title".into(), json!(title));
    }
    if let Some(description) = &fields.description {
        embed.insert("description".into(), json!(description));
    }
    if let Some(color) = fields.color {
        embed.insert("color".into(), json!(color));
    }
    if let Some(footer) = &fields.footer {
        embed.insert("footer".into(), json!({ "text": footer }));
    }
    Value::Object(embed)
}
