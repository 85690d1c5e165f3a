//! NICK, USER, and CAP negotiation (§4.3, §4.4). These three verbs (plus
//! PONG and QUIT, handled in [`super::client`]) are the only ones accepted
//! before full registration, so the field-mutation logic here is written
//! against a bare `&mut User` — it runs identically whether that `User`
//! is still a pre-insertion draft (held locally by
//! [`crate::session`]) or already living in `registry.users`. Grounded in
//! the teacher's `registration.rs`, generalised from its single
//! always-already-registered `User` to also cover the pre-insertion case
//! this spec's lifecycle requires (§3: "a User is in `registry.users` iff
//! its `nick != \"*\"`").

use crate::registry::{casefold, Registry, User};
use crate::replies::IrcReply;
use crate::wire::is_valid_nickname;

/// Sets `user_name`/`real_name` from a `USER <user> <mode> <unused>
/// :<realname>` line. The spec's data model only says these are
/// "supplied by the USER command"; the four-token shape is the classic
/// one the wire grammar in §6 implies by listing `user_message` as a
/// single opaque field.
pub fn process_user(user: &mut User, params: &[String]) -> Option<IrcReply> {
    if params.len() < 4 {
        return Some(IrcReply::ErrNeedMoreParams {
            nick: user.nick.clone(),
            command: "USER".to_owned(),
        });
    }
    user.user_name = Some(params[0].clone());
    user.real_name = Some(params[3].clone());
    None
}

/// `CAP <subcommand> [...]` (§4.4). Operates purely on `user` — no other
/// session's state is ever consulted.
pub fn process_cap(user: &mut User, server_caps: &[&str], params: &[String]) -> Vec<IrcReply> {
    let Some(subcommand) = params.first() else {
        return Vec::new();
    };
    match subcommand.to_ascii_uppercase().as_str() {
        "LS" => {
            user.capneg_in_progress = true;
            if let Some(ver) = params.get(1).and_then(|v| v.parse::<u32>().ok()) {
                if ver >= 302 {
                    user.cap_list.insert("cap-notify".to_owned());
                }
            }
            vec![IrcReply::CapLs {
                nick: user.nick.clone(),
                caps: server_caps.join(" "),
            }]
        }
        "LIST" => {
            let mut caps: Vec<String> = user.cap_list.iter().cloned().collect();
            caps.sort();
            vec![IrcReply::CapList {
                nick: user.nick.clone(),
                caps: caps.join(" "),
            }]
        }
        "REQ" => {
            let requested: Vec<&str> = params
                .get(1)
                .map(|s| s.split_whitespace().collect())
                .unwrap_or_default();
            if requested.iter().all(|tok| server_caps.contains(tok)) {
                for tok in &requested {
                    user.cap_list.insert((*tok).to_owned());
                }
                vec![IrcReply::CapAck {
                    nick: user.nick.clone(),
                    caps: requested.join(" "),
                }]
            } else {
                vec![IrcReply::CapNak {
                    nick: user.nick.clone(),
                    caps: requested.join(" "),
                }]
            }
        }
        "END" => {
            user.capneg_in_progress = false;
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Outcome of a NICK command issued while still unregistered (§3
/// lifecycle: "it enters the registry when NICK succeeds").
pub enum FirstNickOutcome {
    /// `draft` now lives in `registry.users` under the returned key.
    Inserted(String),
    /// Rejected; the error reply has already been enqueued on `draft`,
    /// which the caller keeps holding since it was never consumed.
    Rejected(User),
}

fn validate_nick_text(nick_for_error: &str, new_nick: Option<&String>) -> Result<&str, IrcReply> {
    let Some(new_nick) = new_nick else {
        return Err(IrcReply::ErrNoNicknameGiven {
            nick: nick_for_error.to_owned(),
        });
    };
    if !is_valid_nickname(new_nick) {
        return Err(IrcReply::ErrErroneusNickname {
            nick: nick_for_error.to_owned(),
            attempted: new_nick.clone(),
        });
    }
    Ok(new_nick.as_str())
}

/// The first NICK a connection sends: validates, checks the registry for
/// a case-fold collision, and — on success — moves `draft` into
/// `registry.users`.
pub fn register_first_nick(
    registry: &mut Registry,
    mut draft: User,
    params: &[String],
) -> FirstNickOutcome {
    let new_nick = match validate_nick_text("*", params.first()) {
        Ok(n) => n.to_owned(),
        Err(reply) => {
            draft.enqueue(reply);
            return FirstNickOutcome::Rejected(draft);
        }
    };
    if registry.nick_in_use(&new_nick) {
        draft.enqueue(IrcReply::ErrNicknameInUse {
            nick: "*".to_owned(),
            attempted: new_nick,
        });
        return FirstNickOutcome::Rejected(draft);
    }
    draft.nick = new_nick;
    let key = casefold(&draft.nick);
    registry.users.insert(key.clone(), draft);
    FirstNickOutcome::Inserted(key)
}

/// A NICK command from an already-registered user (rename, §4.4):
/// validates, checks collision, and if accepted, broadcasts `NICK
/// :newnick` (prefixed with the *old* mask) to every peer sharing a
/// channel plus the invoker itself, then re-keys the registry. Returns
/// the new key if the nick actually changed.
pub fn rename_nick(registry: &mut Registry, nick_key: &str, params: &[String]) -> Option<String> {
    let current_nick = registry.user(nick_key)?.nick.clone();
    let new_nick = match validate_nick_text(&current_nick, params.first()) {
        Ok(n) => n.to_owned(),
        Err(reply) => {
            registry.user(nick_key)?.enqueue(reply);
            return None;
        }
    };
    let new_key = casefold(&new_nick);
    if new_key == nick_key {
        // Case-fold equal to current nick: silently dropped (§4.4).
        return None;
    }
    if registry.nick_in_use(&new_nick) {
        registry.user(nick_key)?.enqueue(IrcReply::ErrNicknameInUse {
            nick: current_nick,
            attempted: new_nick,
        });
        return None;
    }

    let old_mask = registry.user(nick_key)?.user_mask();
    let nick_reply = IrcReply::Nick {
        mask: old_mask,
        new_nick: new_nick.clone(),
    };

    // Every peer sharing a channel gets exactly one copy, even across
    // multiple shared channels.
    let mut notified = std::collections::HashSet::new();
    for channel_key in registry.channels_of(nick_key) {
        if let Some(channel) = registry.channels.get(&channel_key) {
            for member_key in channel.members.clone() {
                if member_key != nick_key && notified.insert(member_key.clone()) {
                    if let Some(user) = registry.users.get(&member_key) {
                        user.enqueue(nick_reply.clone());
                    }
                }
            }
        }
    }

    let mut user = registry.users.remove(nick_key)?;
    if user.is_ready_for_welcome() {
        user.enqueue(nick_reply);
    }
    user.nick = new_nick;
    registry.users.insert(new_key.clone(), user);

    for channel in registry.channels.values_mut() {
        if channel.members.remove(nick_key) {
            channel.members.insert(new_key.clone());
        }
        if channel.operators.remove(nick_key) {
            channel.operators.insert(new_key.clone());
        }
    }

    Some(new_key)
}
