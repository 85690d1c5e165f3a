//! Command handlers (§4.4), one module per command family, wired
//! together by [`dispatch`]. Grounded in the teacher's
//! `handlers/request.rs`, which tries each family's handler table in
//! turn; this version is a single `match` over the uppercased verb
//! instead of a chain of `Result`-returning attempts, since this spec's
//! gate (§4.3) already decides *before* dispatch whether a verb is even
//! reachable.
//!
//! NICK, USER, CAP, PONG, and QUIT are not reached through here — they
//! are the pre-registration-capable subset (§4.3, §9) and
//! [`crate::session`] routes them directly so the same logic runs
//! whether or not the invoking user is in the registry yet.

mod channels;
pub mod client;
mod messages;
mod miscellaneous;
pub mod registration;

use crate::registry::Registry;
use crate::replies::IrcReply;

/// Routes one already-gated command to its handler, under the registry
/// lock (§4.3: "Post-registration dispatch acquires the registry lock,
/// looks up a handler for the lowercase command, invokes it, releases
/// the lock").
pub fn dispatch(registry: &mut Registry, nick_key: &str, command: &str, params: &[String]) {
    match command {
        "JOIN" => channels::handle_join(registry, nick_key, params),
        "PART" => channels::handle_part(registry, nick_key, params),
        "MODE" => channels::handle_mode(registry, nick_key, params),
        "KICK" => channels::handle_kick(registry, nick_key, params),
        "TOPIC" => channels::handle_topic(registry, nick_key, params),
        "PRIVMSG" => messages::handle_privmsg(registry, nick_key, params),
        "AWAY" => client::handle_away(registry, nick_key, params),
        "WHO" => miscellaneous::handle_who(registry, nick_key, params),
        "WHOIS" => miscellaneous::handle_whois(registry, nick_key, params),
        "PING" => {
            let reply = registry.user(nick_key).and_then(|u| client::process_ping(u, params));
            if let Some(reply) = reply {
                registry.user(nick_key).unwrap().enqueue(reply);
            }
        }
        other => {
            if let Some(user) = registry.user(nick_key) {
                let nick = user.nick.clone();
                user.enqueue(IrcReply::ErrUnknownCommand {
                    nick,
                    command: other.to_owned(),
                });
            }
        }
    }
}
