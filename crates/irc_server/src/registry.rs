//! The entity model (§3): `User`, `Channel`, and the `Registry` that owns
//! both. Grounded in the teacher's `channels_models.rs`/`user_state.rs`
//! shapes (the same fields: `topic`, `modes`, `members`, `operators`,
//! `ban_list` on the channel side; `nick`, `user`, `modes`, `registered`
//! on the user side) but behind one coarse lock instead of the teacher's
//! per-field `DashMap`/`DashSet`/`RwLock` — §5 names a single
//! process-wide mutex as the concurrency model, and the teacher's
//! fine-grained concurrent collections would let a fan-out observe a
//! torn snapshot of a channel's membership mid-iteration. This departure
//! is recorded in `DESIGN.md`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::{mpsc, Mutex};

use crate::config::{Config, LivenessConfig};
use crate::replies::IrcReply;

/// An item on a user's outbound FIFO (§3, §4.2). The spec's
/// `(payload, source_prefix)` pair collapses here into a single
/// [`IrcReply`], since every variant already knows how to render its own
/// prefix; `Disconnect` is the sentinel `payload = absent`.
///
/// `Identify` is a side channel, never written to the socket: it tells
/// the writer task which registry key now addresses this connection, so
/// disconnect cleanup (§4.2) looks the user up under the right key even
/// when the rename that produced it (the first NICK, or a later one sent
/// before the welcome burst) never itself produced a `NICK` line on this
/// user's own queue.
#[derive(Debug, Clone)]
pub enum OutboundItem {
    Line(IrcReply),
    Identify(String),
    Disconnect { reason: String },
}

/// Case-folds a nickname or channel name for use as a registry key.
/// The spec only says "case-folded"; ASCII lowercasing is the casemapping
/// used throughout (an Open Question resolution, see `DESIGN.md`).
pub fn casefold(s: &str) -> String {
    s.to_ascii_lowercase()
}

/// One live TCP connection (§3). Lives in `Registry::users` once `nick`
/// leaves the `"*"` sentinel.
#[derive(Debug)]
pub struct User {
    pub nick: String,
    pub user_name: Option<String>,
    pub real_name: Option<String>,
    pub host: String,
    pub away: Option<String>,
    pub user_modes: HashSet<char>,
    pub cap_list: HashSet<String>,
    pub capneg_in_progress: bool,
    pub motd_sent: bool,
    pub pong_received: bool,
    pub outbound: mpsc::UnboundedSender<OutboundItem>,
}

impl User {
    pub fn new(host: String, outbound: mpsc::UnboundedSender<OutboundItem>) -> Self {
        let mut user_modes = HashSet::new();
        user_modes.insert('i');
        Self {
            nick: "*".to_owned(),
            user_name: None,
            real_name: None,
            host,
            away: None,
            user_modes,
            cap_list: HashSet::new(),
            capneg_in_progress: false,
            motd_sent: false,
            pong_received: false,
            outbound,
        }
    }

    /// `true` once both NICK and USER have completed (§3 lifecycle).
    pub fn is_identified(&self) -> bool {
        self.nick != "*" && self.user_name.is_some()
    }

    /// Ready for the welcome sequence: identified, and CAP negotiation
    /// (if any) has ended (§4.3).
    pub fn is_ready_for_welcome(&self) -> bool {
        self.is_identified() && !self.capneg_in_progress
    }

    /// The rendering `nick!user_name@host` used as a source-prefix (§3).
    pub fn user_mask(&self) -> String {
        format!(
            "{}!{}@{}",
            self.nick,
            self.user_name.as_deref().unwrap_or("*"),
            self.host
        )
    }

    pub fn enqueue(&self, reply: IrcReply) {
        let _ = self.outbound.send(OutboundItem::Line(reply));
    }

    pub fn enqueue_disconnect(&self, reason: impl Into<String>) {
        let _ = self.outbound.send(OutboundItem::Disconnect {
            reason: reason.into(),
        });
    }
}

/// A named room (§3). `operators ⊆ members` and a channel with empty
/// `members` is destroyed — both invariants are enforced by the handlers
/// that mutate a [`Registry`], not by `Channel` itself.
#[derive(Debug)]
pub struct Channel {
    pub name: String,
    pub topic: Option<(String, String)>,
    pub modes: HashSet<char>,
    pub operators: HashSet<String>,
    pub members: HashSet<String>,
    pub ban_list: HashMap<String, String>,
}

impl Channel {
    /// Creates a channel with `founder` (case-folded nick key) as its
    /// sole member and operator, and `t` (topic-locked) set (§3).
    pub fn new(name: String, founder: String) -> Self {
        let mut modes = HashSet::new();
        modes.insert('t');
        let mut operators = HashSet::new();
        operators.insert(founder.clone());
        let mut members = HashSet::new();
        members.insert(founder);
        Self {
            name,
            topic: None,
            modes,
            operators,
            members,
            ban_list: HashMap::new(),
        }
    }

    pub fn is_operator(&self, nick_key: &str) -> bool {
        self.operators.contains(nick_key)
    }

    pub fn is_member(&self, nick_key: &str) -> bool {
        self.members.contains(nick_key)
    }
}

/// Which channel mode letters take a parameter, per §3
/// (`supported_modes`).
pub fn mode_takes_param(letter: char) -> bool {
    matches!(letter, 'b' | 'o')
}

/// All channel mode letters this server recognises (§4.4 MODE handler).
pub fn is_known_channel_mode(letter: char) -> bool {
    matches!(letter, 'b' | 'o' | 't')
}

/// The process-wide shared authority (§3): every channel, every
/// registered user, and server-wide configuration echoed into replies.
pub struct Registry {
    pub channels: HashMap<String, Channel>,
    pub users: HashMap<String, User>,
    pub motd_lines: Option<Vec<String>>,
    pub server_name: String,
    pub server_version: String,
    /// Rendered once at startup for the 003 `RPL_CREATED` reply (§6); this
    /// server has no persistence, so "created" just means "process start".
    pub server_created: String,
    pub liveness: LivenessConfig,
}

impl Registry {
    pub fn new(config: &Config, motd_lines: Option<Vec<String>>) -> Self {
        let started = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            channels: HashMap::new(),
            users: HashMap::new(),
            motd_lines,
            server_name: config.server.name.clone(),
            server_version: config.server.version.clone(),
            server_created: format!("unix {started}"),
            liveness: config.liveness.clone(),
        }
    }

    pub fn user(&self, nick: &str) -> Option<&User> {
        self.users.get(&casefold(nick))
    }

    pub fn user_mut(&mut self, nick: &str) -> Option<&mut User> {
        self.users.get_mut(&casefold(nick))
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&casefold(name))
    }

    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.get_mut(&casefold(name))
    }

    /// `true` if any currently-registered nick case-folds to `nick`.
    pub fn nick_in_use(&self, nick: &str) -> bool {
        self.users.contains_key(&casefold(nick))
    }

    /// Sends `reply` to every member of `channel_key`, logging the fan-out
    /// the way the teacher's `channels_models.rs::broadcast_message` does.
    pub fn broadcast_to_channel(&self, channel_key: &str, reply: IrcReply) {
        let Some(channel) = self.channels.get(channel_key) else {
            return;
        };
        debug!(
            "broadcasting to #{}: {} members",
            channel.name,
            channel.members.len()
        );
        for member_key in &channel.members {
            if let Some(user) = self.users.get(member_key) {
                user.enqueue(reply.clone());
            }
        }
    }

    /// Sends `reply` to every member of `channel_key` except `except_key`.
    pub fn broadcast_to_channel_except(
        &self,
        channel_key: &str,
        except_key: &str,
        reply: IrcReply,
    ) {
        let Some(channel) = self.channels.get(channel_key) else {
            return;
        };
        for member_key in &channel.members {
            if member_key != except_key {
                if let Some(user) = self.users.get(member_key) {
                    user.enqueue(reply.clone());
                }
            }
        }
    }

    /// Removes `channel_key` from the registry if it now has no members
    /// (§3, §5 resource invariants).
    pub fn destroy_channel_if_empty(&mut self, channel_key: &str) {
        let empty = self
            .channels
            .get(channel_key)
            .map(|c| c.members.is_empty())
            .unwrap_or(false);
        if empty {
            if let Some(channel) = self.channels.remove(channel_key) {
                info!("channel #{} destroyed (empty)", channel.name);
            }
        }
    }

    /// Every channel-key the user (by case-folded nick) is currently a
    /// member of.
    pub fn channels_of(&self, nick_key: &str) -> Vec<String> {
        self.channels
            .iter()
            .filter(|(_, channel)| channel.members.contains(nick_key))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// Shared handle to the [`Registry`], cloned into every session task
/// (§5: "true parallel threads ... Each User owns two long-lived tasks").
#[derive(Clone)]
pub struct ServerState(pub Arc<Mutex<Registry>>);

impl ServerState {
    pub fn new(config: &Config, motd_lines: Option<Vec<String>>) -> Self {
        Self(Arc::new(Mutex::new(Registry::new(config, motd_lines))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn test_user(nick: &str) -> User {
        let (tx, _rx) = unbounded_channel();
        let mut user = User::new("host.example".to_owned(), tx);
        user.nick = nick.to_owned();
        user.user_name = Some("u".to_owned());
        user
    }

    #[test]
    fn new_channel_has_founder_as_sole_member_and_operator() {
        let channel = Channel::new("#chan".to_owned(), "alice".to_owned());
        assert!(channel.is_member("alice"));
        assert!(channel.is_operator("alice"));
        assert!(channel.modes.contains(&'t'));
    }

    #[test]
    fn user_mask_renders_nick_bang_user_at_host() {
        let user = test_user("alice");
        assert_eq!(user.user_mask(), "alice!u@host.example");
    }

    #[test]
    fn is_identified_requires_nick_and_user_name() {
        let (tx, _rx) = unbounded_channel();
        let user = User::new("h".to_owned(), tx);
        assert!(!user.is_identified());
    }

    #[test]
    fn destroy_channel_if_empty_removes_only_when_empty() {
        let config = Config::default();
        let mut registry = Registry::new(&config, None);
        registry
            .channels
            .insert("#chan".to_owned(), Channel::new("#chan".to_owned(), "alice".to_owned()));
        registry.destroy_channel_if_empty("#chan");
        assert!(registry.channels.contains_key("#chan"));

        registry.channels.get_mut("#chan").unwrap().members.clear();
        registry.destroy_channel_if_empty("#chan");
        assert!(!registry.channels.contains_key("#chan"));
    }

    #[test]
    fn nick_in_use_is_case_folded() {
        let config = Config::default();
        let mut registry = Registry::new(&config, None);
        registry.users.insert(casefold("Alice"), test_user("Alice"));
        assert!(registry.nick_in_use("alice"));
        assert!(registry.nick_in_use("ALICE"));
    }
}
