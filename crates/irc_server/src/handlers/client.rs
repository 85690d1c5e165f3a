//! PING/PONG liveness replies and AWAY (§4.4). PING and PONG never touch
//! the registry beyond the invoking user's own fields — grounded in the
//! same "operate on a bare `&mut User`" idiom as
//! [`super::registration::process_cap`], since both are reachable before
//! full registration ([`crate::session`] routes them there directly) and
//! after it ([`super::dispatch`] routes them here).

use crate::registry::{Registry, User};
use crate::replies::IrcReply;

/// `PING [:tok]`: replies `PONG <server> :tok`; no token is 409 (§4.4).
pub fn process_ping(user: &User, params: &[String]) -> Option<IrcReply> {
    match params.first() {
        Some(tok) => Some(IrcReply::Pong { tok: tok.clone() }),
        None => Some(IrcReply::ErrNoOrigin {
            nick: user.nick.clone(),
        }),
    }
}

/// `PONG [:tok]`: marks the watchdog satisfied if `tok` equals
/// `server_name`; else 409 (§4.4).
pub fn process_pong(user: &mut User, server_name: &str, params: &[String]) -> Option<IrcReply> {
    match params.first() {
        Some(tok) if tok == server_name => {
            user.pong_received = true;
            None
        }
        _ => Some(IrcReply::ErrNoOrigin {
            nick: user.nick.clone(),
        }),
    }
}

/// `AWAY [:text]` (§4.4): post-registration only, so this version takes
/// the registry directly rather than a bare `&mut User` — it needs the
/// invoker's shared channels to fan out to `away-notify` subscribers.
pub fn handle_away(registry: &mut Registry, nick_key: &str, params: &[String]) {
    let Some(user) = registry.user_mut(nick_key) else {
        return;
    };
    let text = params.first().cloned();
    let reply = match &text {
        Some(msg) => {
            user.away = Some(msg.clone());
            IrcReply::NowAway {
                nick: user.nick.clone(),
            }
        }
        None => {
            user.away = None;
            IrcReply::UnAway {
                nick: user.nick.clone(),
            }
        }
    };
    let mask = registry.user(nick_key).unwrap().user_mask();
    registry.user(nick_key).unwrap().enqueue(reply);

    let notify = IrcReply::AwayNotify {
        mask,
        message: text.unwrap_or_default(),
    };
    let mut notified = std::collections::HashSet::new();
    for channel_key in registry.channels_of(nick_key) {
        if let Some(channel) = registry.channels.get(&channel_key) {
            for member_key in &channel.members {
                if member_key != nick_key && notified.insert(member_key.clone()) {
                    if let Some(peer) = registry.users.get(member_key) {
                        if peer.cap_list.contains("away-notify") {
                            peer.enqueue(notify.clone());
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tokio::sync::mpsc::unbounded_channel;

    fn test_user() -> User {
        let (tx, _rx) = unbounded_channel();
        let mut user = User::new("h".to_owned(), tx);
        user.nick = "alice".to_owned();
        user.user_name = Some("a".to_owned());
        user
    }

    #[test]
    fn ping_with_token_replies_pong() {
        let user = test_user();
        let reply = process_ping(&user, &["tok123".to_owned()]);
        assert!(matches!(reply, Some(IrcReply::Pong { tok }) if tok == "tok123"));
    }

    #[test]
    fn ping_without_token_is_no_origin() {
        let user = test_user();
        let reply = process_ping(&user, &[]);
        assert!(matches!(reply, Some(IrcReply::ErrNoOrigin { .. })));
    }

    #[test]
    fn pong_matching_server_name_sets_flag() {
        let mut user = test_user();
        let reply = process_pong(&mut user, "mantatail", &["mantatail".to_owned()]);
        assert!(reply.is_none());
        assert!(user.pong_received);
    }

    #[test]
    fn pong_mismatched_token_is_no_origin() {
        let mut user = test_user();
        let reply = process_pong(&mut user, "mantatail", &["wrong".to_owned()]);
        assert!(matches!(reply, Some(IrcReply::ErrNoOrigin { .. })));
        assert!(!user.pong_received);
    }

    #[test]
    fn away_notifies_only_cap_negotiated_peers() {
        let config = Config::default();
        let mut registry = Registry::new(&config, None);
        registry.users.insert("alice".to_owned(), test_user());

        let (tx_b, mut rx_b) = unbounded_channel();
        let mut bob = User::new("h".to_owned(), tx_b);
        bob.nick = "bob".to_owned();
        bob.user_name = Some("b".to_owned());
        bob.cap_list.insert("away-notify".to_owned());
        registry.users.insert("bob".to_owned(), bob);

        let mut channel = crate::registry::Channel::new("#chan".to_owned(), "alice".to_owned());
        channel.members.insert("bob".to_owned());
        registry.channels.insert("#chan".to_owned(), channel);

        handle_away(&mut registry, "alice", &["brb".to_owned()]);
        assert_eq!(registry.user("alice").unwrap().away.as_deref(), Some("brb"));
        assert!(rx_b.try_recv().is_ok());
    }
}
