//! Text sanitization for messages crossing the chat trust boundary.
//!
//! [`Sanitizer::sanitize`] runs a fixed sequence of passes over the input,
//! each pass operating on the previous pass's output:
//!
//! 1. `@everyone` / `@here` get a zero-width space after the `@`.
//! 2. Role mentions (`@&<id>`) become `@\u{200B}role`.
//! 3. Triple backticks are escaped so they cannot open a code fence.
//! 4. User mentions (`<@id>` / `<@!id>`) become `@\u{200B}<name>` when the
//!    [`UserDirectory`] resolves the id, else `@\u{200B}user`.
//! 5. Channel mentions (`<#id>`) become `#\u{200B}channel`.
//! 6. The result is truncated to [`MAX_MESSAGE_LEN`] characters.
//!
//! Sanitization never fails; overlong input is cut, not rejected.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, NoExpand, Regex};

/// Maximum message length accepted by the chat platform, in characters.
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Zero-width space used to break mention syntax without changing how
/// the text looks.
pub const ZWSP: char = '\u{200B}';

static ROLE_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@&\d+").expect("role mention pattern is valid"));
static USER_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@!?(\d+)>").expect("user mention pattern is valid"));
static CHANNEL_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<#\d+>").expect("channel mention pattern is valid"));

/// Resolves platform user ids to display names at sanitize time.
///
/// Lookups are best-effort: `None` covers both "unknown user" and any
/// transient lookup failure.
pub trait UserDirectory {
    fn display_name(&self, user_id: &str) -> Option<String>;
}

/// A directory that never resolves anyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDirectory;

impl UserDirectory for NoDirectory {
    fn display_name(&self, _user_id: &str) -> Option<String> {
        None
    }
}

impl UserDirectory for HashMap<String, String> {
    fn display_name(&self, user_id: &str) -> Option<String> {
        self.get(user_id).cloned()
    }
}

/// The sanitization pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer;

impl Sanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Run every pass over `text` and return the neutralized result.
    pub fn sanitize(&self, text: &str, users: &dyn UserDirectory) -> String {
        let out = text
            .replace("@everyone", "@\u{200B}everyone")
            .replace("@here", "@\u{200B}here");

        let out = replace_all(&ROLE_MENTION, out, "@\u{200B}role");
        let out = out.replace("```", "\\`\\`\\`");

        let out = USER_MENTION
            .replace_all(&out, |caps: &Captures<'_>| {
                let name = users.display_name(&caps[1]);
                format!("@{ZWSP}{}", name.as_deref().unwrap_or("user"))
            })
            .into_owned();

        let out = replace_all(&CHANNEL_MENTION, out, "#\u{200B}channel");
        truncate_chars(out, MAX_MESSAGE_LEN)
    }
}

/// Literal (non-expanding) replacement.
fn replace_all(re: &Regex, text: String, with: &str) -> String {
    re.replace_all(&text, NoExpand(with)).into_owned()
}

/// Cut `text` to at most `max` characters, never splitting a character.
pub fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max) {
        text.truncate(idx);
    }
    text
}
