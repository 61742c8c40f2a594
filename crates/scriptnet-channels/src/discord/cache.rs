//! In-memory entity cache fed by gateway events.
//!
//! The bridge resolves channel handles, role precedence and user display
//! names against this cache. All lookups are synchronous and never touch
//! the network; an entity the gateway has not announced is simply unknown.

use std::collections::{HashMap, HashSet, VecDeque};

use parking_lot::RwLock;
use tracing::debug;

use scriptnet_core::UserDirectory;
use scriptnet_types::event::{DEFAULT_COLOR_RAW, RoleRef};

use super::events::{
    Channel, Guild, GuildRoleDelete, GuildRoleEvent, ReadyEvent, Role, UnavailableGuild, User,
};

/// Upper bound on users remembered from message traffic alone.
pub const MAX_RECENT_USERS: usize = 4096;

#[derive(Debug, Default)]
struct GuildEntry {
    owner_id: Option<String>,
    roles: HashMap<String, Role>,
}

/// Message authors and mentions outside the member lists, oldest evicted
/// first.
#[derive(Debug, Default)]
struct RecentUsers {
    users: HashMap<String, User>,
    order: VecDeque<String>,
}

impl RecentUsers {
    fn insert(&mut self, user: User) {
        if let Some(known) = self.users.get_mut(&user.id) {
            *known = user;
            return;
        }
        if self.order.len() >= MAX_RECENT_USERS
            && let Some(oldest) = self.order.pop_front()
        {
            self.users.remove(&oldest);
        }
        self.order.push_back(user.id.clone());
        self.users.insert(user.id.clone(), user);
    }

    fn remove(&mut self, user_id: &str) {
        if self.users.remove(user_id).is_some() {
            self.order.retain(|id| id != user_id);
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    self_user: Option<User>,
    /// Guild members announced in `GUILD_CREATE`.
    members: HashMap<String, User>,
    recent: RecentUsers,
    channels: HashMap<String, Channel>,
    guilds: HashMap<String, GuildEntry>,
    /// Guilds announced in READY that have not arrived yet.
    pending_guilds: HashSet<String>,
    ready_seen: bool,
}

/// Users, channels, guilds and roles seen on the gateway.
#[derive(Debug, Default)]
pub struct EntityCache {
    state: RwLock<CacheState>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Gateway event intake ────────────────────────────────────────────

    /// Record the bot user and the guilds that will follow as `GUILD_CREATE`.
    pub fn apply_ready(&self, ready: &ReadyEvent) {
        let mut state = self.state.write();
        state.self_user = Some(ready.user.clone());
        state.pending_guilds = ready.guilds.iter().map(|g| g.id.clone()).collect();
        state.ready_seen = true;
    }

    pub fn apply_guild_create(&self, guild: Guild) {
        let mut state = self.state.write();
        state.pending_guilds.remove(&guild.id);

        for mut channel in guild.channels {
            channel.guild_id.get_or_insert_with(|| guild.id.clone());
            state.channels.insert(channel.id.clone(), channel);
        }
        for member in guild.members {
            if let Some(user) = member.user {
                state.recent.remove(&user.id);
                state.members.insert(user.id.clone(), user);
            }
        }

        debug!(guild_id = %guild.id, roles = guild.roles.len(), "guild cached");
        state.guilds.insert(
            guild.id,
            GuildEntry {
                owner_id: guild.owner_id,
                roles: guild.roles.into_iter().map(|r| (r.id.clone(), r)).collect(),
            },
        );
    }

    /// Drop a guild and its channels. An outage (`unavailable`) still
    /// clears the pending entry so readiness is not held up.
    pub fn apply_guild_delete(&self, guild: &UnavailableGuild) {
        let mut state = self.state.write();
        state.pending_guilds.remove(&guild.id);
        state.guilds.remove(&guild.id);
        state
            .channels
            .retain(|_, c| c.guild_id.as_deref() != Some(guild.id.as_str()));
    }

    pub fn upsert_channel(&self, channel: Channel) {
        self.state.write().channels.insert(channel.id.clone(), channel);
    }

    pub fn remove_channel(&self, channel_id: &str) {
        self.state.write().channels.remove(channel_id);
    }

    pub fn upsert_role(&self, event: GuildRoleEvent) {
        let mut state = self.state.write();
        let guild = state.guilds.entry(event.guild_id).or_default();
        guild.roles.insert(event.role.id.clone(), event.role);
    }

    pub fn remove_role(&self, event: &GuildRoleDelete) {
        if let Some(guild) = self.state.write().guilds.get_mut(&event.guild_id) {
            guild.roles.remove(&event.role_id);
        }
    }

    /// Record a user seen in message traffic. Known members are updated in
    /// place; anyone else goes to a bounded recent set.
    pub fn remember_user(&self, user: &User) {
        let mut guard = self.state.write();
        let state = &mut *guard;
        if let Some(member) = state.members.get_mut(&user.id) {
            *member = user.clone();
        } else {
            state.recent.insert(user.clone());
        }
    }

    // ── Lookups ─────────────────────────────────────────────────────────

    /// `true` once READY arrived and every announced guild has been received.
    pub fn is_ready(&self) -> bool {
        let state = self.state.read();
        state.ready_seen && state.pending_guilds.is_empty()
    }

    pub fn self_user_id(&self) -> Option<String> {
        self.state.read().self_user.as_ref().map(|u| u.id.clone())
    }

    pub fn channel(&self, channel_id: &str) -> Option<Channel> {
        self.state.read().channels.get(channel_id).cloned()
    }

    pub fn channel_name(&self, channel_id: &str) -> Option<String> {
        self.state
            .read()
            .channels
            .get(channel_id)
            .and_then(|c| c.name.clone())
    }

    /// `true` if the channel is known and accepts plain messages.
    pub fn is_messageable(&self, channel_id: &str) -> bool {
        self.state
            .read()
            .channels
            .get(channel_id)
            .is_some_and(Channel::is_messageable)
    }

    pub fn role_name(&self, role_id: &str) -> Option<String> {
        let state = self.state.read();
        state
            .guilds
            .values()
            .find_map(|g| g.roles.get(role_id))
            .map(|r| r.name.clone())
    }

    pub fn guild_owner(&self, guild_id: &str) -> Option<String> {
        self.state
            .read()
            .guilds
            .get(guild_id)
            .and_then(|g| g.owner_id.clone())
    }

    /// Resolve `role_ids` in `guild_id`, highest position first, ties by id.
    /// Unknown ids are skipped.
    pub fn resolve_roles(&self, guild_id: &str, role_ids: &[String]) -> Vec<Role> {
        let state = self.state.read();
        let Some(guild) = state.guilds.get(guild_id) else {
            return Vec::new();
        };
        let mut roles: Vec<Role> = role_ids
            .iter()
            .filter_map(|id| guild.roles.get(id).cloned())
            .collect();
        roles.sort_by(|a, b| {
            b.position
                .cmp(&a.position)
                .then_with(|| snowflake_cmp(&a.id, &b.id))
        });
        roles
    }
}

/// Snowflakes compare numerically; shorter ids are older.
fn snowflake_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// The color of the first colored role in precedence order, else the
/// "no color" sentinel.
pub fn member_color(roles: &[Role]) -> u32 {
    roles
        .iter()
        .find(|r| r.color != 0)
        .map_or(DEFAULT_COLOR_RAW, |r| r.color)
}

pub fn role_refs(roles: &[Role]) -> Vec<RoleRef> {
    roles
        .iter()
        .map(|r| RoleRef {
            id: r.id.clone(),
            name: r.name.clone(),
        })
        .collect()
}

impl UserDirectory for EntityCache {
    fn display_name(&self, user_id: &str) -> Option<String> {
        let state = self.state.read();
        state
            .members
            .get(user_id)
            .or_else(|| state.recent.users.get(user_id))
            .map(|u| u.display_name().to_owned())
    }
}
