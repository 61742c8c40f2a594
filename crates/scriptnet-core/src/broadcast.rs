//! In-process broadcast messaging to the host's live user sessions.
//!
//! [`BroadcastGateway`] is deliberately *not* capability-gated: it is the
//! channel the capability gateway itself uses to announce state changes,
//! so it has to work while network capabilities are disabled.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// Native formatting prefix the host renders color directives with.
pub const FORMAT_PREFIX: char = '\u{00A7}';

/// The host's registry of connected user sessions.
pub trait SessionRegistry: Send + Sync {
    /// Names of every session currently online.
    fn online_names(&self) -> Vec<String>;

    /// Deliver `text` to the named session. Returns `false` if that
    /// session is not online.
    fn send(&self, name: &str, text: &str) -> bool;
}

/// Sends text to all (or one) of the host's live sessions.
#[derive(Clone)]
pub struct BroadcastGateway {
    sessions: Arc<dyn SessionRegistry>,
}

impl std::fmt::Debug for BroadcastGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastGateway").finish_non_exhaustive()
    }
}

impl BroadcastGateway {
    pub fn new(sessions: Arc<dyn SessionRegistry>) -> Self {
        Self { sessions }
    }

    /// Deliver `text` (with color directives translated) to every online
    /// session. Returns how many sessions received it.
    pub fn send_to_all(&self, text: &str) -> usize {
        let names = self.sessions.online_names();
        if names.is_empty() {
            info!("no sessions online, broadcast not delivered");
            return 0;
        }

        let rendered = translate_color_codes(text);
        let delivered = names
            .iter()
            .filter(|name| self.sessions.send(name, &rendered))
            .count();
        debug!(delivered, online = names.len(), "broadcast delivered");
        delivered
    }

    /// Deliver `text` to one session by name.
    pub fn send_to_player(&self, name: &str, text: &str) -> bool {
        let sent = self.sessions.send(name, &translate_color_codes(text));
        if !sent {
            warn!(player = %name, "player not online, message not delivered");
        }
        sent
    }

    pub fn online_count(&self) -> usize {
        self.sessions.online_names().len()
    }

    pub fn online_names(&self) -> Vec<String> {
        self.sessions.online_names()
    }

    /// Operator-visible system announcement. Never fails to the caller.
    pub fn system_message(&self, text: &str) {
        let delivered = self.send_to_all(text);
        info!(delivered, message = %text, "system message broadcast");
    }
}

/// Translate `&`-prefixed color directives into the host's native prefix.
///
/// `&` followed by a hex digit or one of `k l m n o r` (either case)
/// becomes [`FORMAT_PREFIX`] plus that character. Any other `&` is kept.
pub fn translate_color_codes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '&'
            && let Some(&next) = chars.peek()
            && is_format_code(next)
        {
            out.push(FORMAT_PREFIX);
            out.push(next);
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

fn is_format_code(c: char) -> bool {
    c.is_ascii_hexdigit() || matches!(c.to_ascii_lowercase(), 'k'..='o' | 'r')
}

/// A [`SessionRegistry`] backed by an in-memory inbox per session.
///
/// Useful for console hosts and tests: sessions join and leave by name,
/// and every delivered line is kept in that session's inbox.
#[derive(Debug, Default)]
pub struct InMemorySessions {
    inboxes: Mutex<BTreeMap<String, Vec<String>>>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, name: impl Into<String>) {
        self.inboxes.lock().entry(name.into()).or_default();
    }

    pub fn leave(&self, name: &str) {
        self.inboxes.lock().remove(name);
    }

    /// Messages delivered to `name` so far (empty if not online).
    pub fn inbox(&self, name: &str) -> Vec<String> {
        self.inboxes.lock().get(name).cloned().unwrap_or_default()
    }
}

impl SessionRegistry for InMemorySessions {
    fn online_names(&self) -> Vec<String> {
        self.inboxes.lock().keys().cloned().collect()
    }

    fn send(&self, name: &str, text: &str) -> bool {
        match self.inboxes.lock().get_mut(name) {
            Some(inbox) => {
                inbox.push(text.to_string());
                true
            }
            None => false,
        }
    }
}
