//! [`BotToken`]: the chat bridge credential.
//!
//! The raw value leaves this type in two shapes only: the REST
//! `Authorization` header and the token field of gateway Identify/Resume
//! payloads. Logs, `Debug` output and `scriptnet config show` see a
//! redacted placeholder.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Scheme prefix Discord expects on bot credentials.
const AUTH_SCHEME: &str = "Bot ";

/// A Discord bot token.
///
/// Surrounding whitespace and a pasted `Bot ` prefix are dropped on
/// construction, so `"Bot abc\n"` and `"abc"` are the same token.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        let bare = trimmed.strip_prefix(AUTH_SCHEME).unwrap_or(trimmed).trim_start();
        Self(bare.to_owned())
    }

    /// Read a token from the environment variable `var`. `None` when the
    /// variable is unset or blank.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .map(Self::new)
            .filter(|token| !token.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value for the REST `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("{AUTH_SCHEME}{}", self.0)
    }

    /// Value for the `token` field of gateway Identify and Resume payloads.
    pub fn gateway_value(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("BotToken(unset)")
        } else {
            f.write_str("BotToken([REDACTED])")
        }
    }
}

impl fmt::Display for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_empty() {
            f.write_str("[REDACTED]")?;
        }
        Ok(())
    }
}

/// Always serializes as an empty string.
impl Serialize for BotToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("")
    }
}

/// Accepts a string or `null`.
impl<'de> Deserialize<'de> for BotToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?
            .map(Self::new)
            .unwrap_or_default())
    }
}

impl From<&str> for BotToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BotToken {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
