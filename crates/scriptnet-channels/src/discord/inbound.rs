//! Mapping `MESSAGE_CREATE` to [`InboundMessageEvent`] and observer dispatch.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use tracing::{debug, error};

use scriptnet_types::config::BridgeConfig;
use scriptnet_types::event::{AuthorAttributes, InboundMessageEvent, MemberAttributes};

use super::cache::{EntityCache, member_color, role_refs};
use super::events::MessageCreate;

/// A registered inbound-message callback.
///
/// Errors and panics are caught per observer and logged.
pub type MessageObserver = Arc<dyn Fn(&InboundMessageEvent) -> anyhow::Result<()> + Send + Sync>;

static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(@!?|@&|#)(\d+)>").expect("mention pattern is valid")
});

/// Build the event for `msg`, or `None` when a bot wrote it.
pub fn build_event(
    msg: &MessageCreate,
    cache: &EntityCache,
    config: &BridgeConfig,
) -> Option<InboundMessageEvent> {
    if msg.author.bot {
        debug!(author = %msg.author.username, "skipping bot message");
        return None;
    }

    let author = AuthorAttributes {
        id: msg.author.id.clone(),
        name: msg.author.username.clone(),
        display_name: msg.author.display_name().to_owned(),
        discriminator: msg.author.discriminator.clone(),
        avatar_url: msg.author.avatar_url(),
        is_bot: msg.author.bot,
        is_system: msg.author.system,
    };

    let member = match (&msg.member, &msg.guild_id) {
        (Some(member), Some(guild_id)) => {
            let roles = cache.resolve_roles(guild_id, &member.roles);
            Some(MemberAttributes {
                nickname: member.nick.clone(),
                color_raw: member_color(&roles),
                is_owner: cache.guild_owner(guild_id).as_deref() == Some(msg.author.id.as_str()),
                is_pending: member.pending,
                joined_at: member.joined_at.clone(),
                boosted_at: member.premium_since.clone(),
                roles: role_refs(&roles),
            })
        }
        _ => None,
    };

    Some(InboundMessageEvent {
        content: display_content(msg, cache),
        author_display_name: author.display_name.clone(),
        origin_channel_id: msg.channel_id.clone(),
        origin_channel_name: cache.channel_name(&msg.channel_id).unwrap_or_default(),
        is_from_configured_channel: config.is_bound_channel(&msg.channel_id),
        is_automated: msg.author.bot,
        author,
        member,
        received_at: chrono::Utc::now(),
    })
}

/// Render mention tokens the way a chat client shows them.
///
/// Users resolve from the message's own mention list, then the cache;
/// roles and channels from the cache. Unknown tokens stay as written.
pub fn display_content(msg: &MessageCreate, cache: &EntityCache) -> String {
    MENTION
        .replace_all(&msg.content, |caps: &Captures<'_>| {
            let id = &caps[2];
            let resolved = match &caps[1] {
                "#" => cache.channel_name(id).map(|n| format!("#{n}")),
                "@&" => cache.role_name(id).map(|n| format!("@{n}")),
                _ => msg
                    .mentions
                    .iter()
                    .find(|u| u.id == id)
                    .map(|u| u.display_name().to_owned())
                    .or_else(|| scriptnet_core::UserDirectory::display_name(cache, id))
                    .map(|n| format!("@{n}")),
            };
            resolved.unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}

/// Deliver `event` to every observer in order. Returns how many succeeded.
pub fn dispatch(observers: &[MessageObserver], event: &InboundMessageEvent) -> usize {
    let mut delivered = 0;
    for (index, observer) in observers.iter().enumerate() {
        match catch_unwind(AssertUnwindSafe(|| observer(event))) {
            Ok(Ok(())) => delivered += 1,
            Ok(Err(e)) => {
                error!(observer = index, error = %e, "error in chat message observer");
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_owned())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".into());
                error!(observer = index, panic = %reason, "chat message observer panicked");
            }
        }
    }
    delivered
}
