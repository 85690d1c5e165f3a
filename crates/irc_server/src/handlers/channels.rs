//! JOIN, PART, MODE, KICK, and TOPIC (§4.4). Grounded in the teacher's
//! `channels.rs` join skeleton: channels are created implicitly on first
//! JOIN, the first joiner becomes operator, and the post-join sequence is
//! topic-then-names — this file fills in the todo!()s that skeleton left,
//! against the registry model in [`crate::registry`] rather than the
//! teacher's `ServerState`/`UserState` pair.

use crate::mask::{canonicalize_ban_mask, is_banned};
use crate::registry::{is_known_channel_mode, mode_takes_param, Channel, Registry};
use crate::replies::IrcReply;
use crate::wire::is_valid_channel_name;

pub fn handle_join(registry: &mut Registry, nick_key: &str, params: &[String]) {
    let Some(channel_arg) = params.first() else {
        enqueue_need_more_params(registry, nick_key, "JOIN");
        return;
    };
    let channel_name = channel_arg.clone();
    if !is_valid_channel_name(&channel_name) {
        enqueue(registry, nick_key, IrcReply::ErrNoSuchChannel {
            nick: nick_of(registry, nick_key),
            channel: channel_name,
        });
        return;
    }
    let channel_key = channel_name.to_ascii_lowercase();

    if registry.channels.contains_key(&channel_key) {
        let user_mask = registry.user(nick_key).unwrap().user_mask();
        let channel = registry.channels.get(&channel_key).unwrap();
        if channel.is_member(nick_key) {
            return;
        }
        if is_banned(&user_mask, channel.ban_list.keys()) {
            enqueue(registry, nick_key, IrcReply::ErrBannedFromChan {
                nick: nick_of(registry, nick_key),
                channel: channel_name.clone(),
            });
            return;
        }
    } else {
        registry.channels.insert(
            channel_key.clone(),
            Channel::new(channel_name.clone(), nick_key.to_owned()),
        );
    }

    let channel = registry.channels.get_mut(&channel_key).unwrap();
    channel.members.insert(nick_key.to_owned());
    let user_mask = registry.user(nick_key).unwrap().user_mask();

    registry.broadcast_to_channel(
        &channel_key,
        IrcReply::Join {
            mask: user_mask,
            channel: channel_name.clone(),
        },
    );

    let channel = registry.channels.get(&channel_key).unwrap();
    let nick = nick_of(registry, nick_key);
    if let Some((text, author)) = &channel.topic {
        let user = registry.user(nick_key).unwrap();
        user.enqueue(IrcReply::Topic {
            nick: nick.clone(),
            channel: channel_name.clone(),
            topic: text.clone(),
        });
        user.enqueue(IrcReply::TopicWhoTime {
            nick: nick.clone(),
            channel: channel_name.clone(),
            author: author.clone(),
        });
    }
    let mut names: Vec<String> = channel
        .members
        .iter()
        .map(|member_key| {
            let prefix = if channel.is_operator(member_key) { "@" } else { "" };
            let member_nick = registry
                .users
                .get(member_key)
                .map(|u| u.nick.clone())
                .unwrap_or_else(|| member_key.clone());
            format!("{prefix}{member_nick}")
        })
        .collect();
    names.sort();
    let user = registry.user(nick_key).unwrap();
    user.enqueue(IrcReply::NamReply {
        nick: nick.clone(),
        channel: channel_name.clone(),
        names,
    });
    user.enqueue(IrcReply::EndOfNames {
        nick,
        channel: channel_name,
    });

    // If the joiner is AWAY, members who negotiated away-notify learn
    // about it as part of the join rather than waiting for their next
    // PRIVMSG attempt to them (§4.4).
    let away_message = registry.user(nick_key).and_then(|u| u.away.clone());
    if let Some(message) = away_message {
        let mask = registry.user(nick_key).unwrap().user_mask();
        let notify = IrcReply::AwayNotify { mask, message };
        let channel = registry.channels.get(&channel_key).unwrap();
        let member_keys: Vec<String> = channel.members.iter().cloned().collect();
        for member_key in member_keys {
            if member_key == nick_key {
                continue;
            }
            if let Some(peer) = registry.users.get(&member_key) {
                if peer.cap_list.contains("away-notify") {
                    peer.enqueue(notify.clone());
                }
            }
        }
    }
}

pub fn handle_part(registry: &mut Registry, nick_key: &str, params: &[String]) {
    let Some(channel_name) = params.first() else {
        enqueue_need_more_params(registry, nick_key, "PART");
        return;
    };
    let channel_key = channel_name.to_ascii_lowercase();
    let Some(channel) = registry.channels.get(&channel_key) else {
        enqueue(registry, nick_key, IrcReply::ErrNoSuchChannel {
            nick: nick_of(registry, nick_key),
            channel: channel_name.clone(),
        });
        return;
    };
    if !channel.is_member(nick_key) {
        enqueue(registry, nick_key, IrcReply::ErrNotOnChannel {
            nick: nick_of(registry, nick_key),
            channel: channel_name.clone(),
        });
        return;
    }

    let user_mask = registry.user(nick_key).unwrap().user_mask();
    registry.broadcast_to_channel(
        &channel_key,
        IrcReply::Part {
            mask: user_mask,
            channel: channel_name.clone(),
        },
    );
    let channel = registry.channels.get_mut(&channel_key).unwrap();
    channel.operators.remove(nick_key);
    channel.members.remove(nick_key);
    registry.destroy_channel_if_empty(&channel_key);
}

pub fn handle_topic(registry: &mut Registry, nick_key: &str, params: &[String]) {
    let Some(channel_name) = params.first() else {
        enqueue_need_more_params(registry, nick_key, "TOPIC");
        return;
    };
    let channel_key = channel_name.to_ascii_lowercase();
    let Some(channel) = registry.channels.get(&channel_key) else {
        enqueue(registry, nick_key, IrcReply::ErrNoSuchChannel {
            nick: nick_of(registry, nick_key),
            channel: channel_name.clone(),
        });
        return;
    };

    match params.get(1) {
        None => {
            let nick = nick_of(registry, nick_key);
            match &channel.topic {
                Some((text, author)) => {
                    enqueue(registry, nick_key, IrcReply::Topic {
                        nick: nick.clone(),
                        channel: channel_name.clone(),
                        topic: text.clone(),
                    });
                    enqueue(registry, nick_key, IrcReply::TopicWhoTime {
                        nick,
                        channel: channel_name.clone(),
                        author: author.clone(),
                    });
                }
                None => {
                    enqueue(registry, nick_key, IrcReply::NoTopic {
                        nick,
                        channel: channel_name.clone(),
                    });
                }
            };
        }
        Some(text) => {
            if channel.modes.contains(&'t') && !channel.is_operator(nick_key) {
                enqueue(registry, nick_key, IrcReply::ErrChanOPrivsNeeded {
                    nick: nick_of(registry, nick_key),
                    channel: channel_name.clone(),
                });
                return;
            }
            let nick = nick_of(registry, nick_key);
            let topic_text = text.clone();
            let channel = registry.channels.get_mut(&channel_key).unwrap();
            channel.topic = if topic_text.is_empty() {
                None
            } else {
                Some((topic_text.clone(), nick))
            };
            let mask = registry.user(nick_key).unwrap().user_mask();
            registry.broadcast_to_channel(
                &channel_key,
                IrcReply::TopicChanged {
                    mask,
                    channel: channel_name.clone(),
                    topic: topic_text,
                },
            );
        }
    }
}

pub fn handle_kick(registry: &mut Registry, nick_key: &str, params: &[String]) {
    if params.len() < 2 {
        enqueue_need_more_params(registry, nick_key, "KICK");
        return;
    }
    let channel_name = params[0].clone();
    let victim_nick = params[1].clone();
    let reason = params.get(2).cloned().unwrap_or_else(|| victim_nick.clone());
    let channel_key = channel_name.to_ascii_lowercase();
    let victim_key = victim_nick.to_ascii_lowercase();

    let Some(channel) = registry.channels.get(&channel_key) else {
        enqueue(registry, nick_key, IrcReply::ErrNoSuchChannel {
            nick: nick_of(registry, nick_key),
            channel: channel_name,
        });
        return;
    };
    if !registry.nick_in_use(&victim_nick) {
        enqueue(registry, nick_key, IrcReply::ErrNoSuchNick {
            nick: nick_of(registry, nick_key),
            target: victim_nick,
        });
        return;
    }
    if !channel.is_operator(nick_key) {
        enqueue(registry, nick_key, IrcReply::ErrChanOPrivsNeeded {
            nick: nick_of(registry, nick_key),
            channel: channel_name,
        });
        return;
    }
    if !channel.is_member(&victim_key) {
        enqueue(registry, nick_key, IrcReply::ErrUserNotInChannel {
            nick: nick_of(registry, nick_key),
            target: victim_nick,
            channel: channel_name,
        });
        return;
    }

    let mask = registry.user(nick_key).unwrap().user_mask();
    registry.broadcast_to_channel(
        &channel_key,
        IrcReply::Kick {
            mask,
            channel: channel_name.clone(),
            victim: victim_nick,
            reason,
        },
    );
    let channel = registry.channels.get_mut(&channel_key).unwrap();
    channel.members.remove(&victim_key);
    channel.operators.remove(&victim_key);
    registry.destroy_channel_if_empty(&channel_key);
}

pub fn handle_mode(registry: &mut Registry, nick_key: &str, params: &[String]) {
    let Some(target) = params.first() else {
        enqueue_need_more_params(registry, nick_key, "MODE");
        return;
    };

    if !target.starts_with('#') {
        // A nickname target: only the invoker may query/modify its own
        // modes; any other target is 403, a deliberate stand-in for the
        // more correct 502 once user modes grow (§9 open question).
        if target.to_ascii_lowercase() != nick_key {
            enqueue(registry, nick_key, IrcReply::ErrNoSuchChannel {
                nick: nick_of(registry, nick_key),
                channel: target.clone(),
            });
        }
        return;
    }

    let channel_name = target.clone();
    let channel_key = channel_name.to_ascii_lowercase();
    let Some(channel) = registry.channels.get(&channel_key) else {
        enqueue(registry, nick_key, IrcReply::ErrNoSuchChannel {
            nick: nick_of(registry, nick_key),
            channel: channel_name,
        });
        return;
    };

    let Some(change_spec) = params.get(1) else {
        let modes: String = {
            let mut letters: Vec<char> = channel.modes.iter().copied().collect();
            letters.sort();
            letters.into_iter().collect()
        };
        enqueue(registry, nick_key, IrcReply::ChannelModeIs {
            nick: nick_of(registry, nick_key),
            channel: channel_name,
            modes: format!("+{modes}"),
        });
        return;
    };

    let mut chars = change_spec.chars();
    let Some(sign) = chars.next() else {
        return;
    };
    if sign != '+' && sign != '-' {
        enqueue(registry, nick_key, IrcReply::ErrUnknownMode {
            nick: nick_of(registry, nick_key),
            letter: sign,
        });
        return;
    }
    let adding = sign == '+';

    let mut param_idx = 2;
    for letter in chars {
        if !is_known_channel_mode(letter) {
            enqueue(registry, nick_key, IrcReply::ErrUnknownMode {
                nick: nick_of(registry, nick_key),
                letter,
            });
            return;
        }
        debug_assert_eq!(mode_takes_param(letter), letter == 'o' || letter == 'b');
        match letter {
            'o' => {
                let Some(target_nick) = params.get(param_idx) else {
                    enqueue_need_more_params(registry, nick_key, "MODE");
                    return;
                };
                param_idx += 1;
                apply_operator_mode(registry, nick_key, &channel_key, &channel_name, adding, target_nick);
            }
            'b' => {
                if let Some(ban_target) = params.get(param_idx) {
                    param_idx += 1;
                    apply_ban_mode(registry, nick_key, &channel_key, &channel_name, adding, ban_target);
                } else {
                    list_bans(registry, nick_key, &channel_key, &channel_name);
                }
            }
            't' => {
                apply_topic_lock_mode(registry, nick_key, &channel_key, &channel_name, adding);
            }
            _ => unreachable!("is_known_channel_mode guards this"),
        }
    }
}

fn apply_operator_mode(
    registry: &mut Registry,
    nick_key: &str,
    channel_key: &str,
    channel_name: &str,
    adding: bool,
    target_nick: &str,
) {
    let target_key = target_nick.to_ascii_lowercase();
    let channel = registry.channels.get(channel_key).unwrap();
    if !channel.is_operator(nick_key) {
        enqueue(registry, nick_key, IrcReply::ErrChanOPrivsNeeded {
            nick: nick_of(registry, nick_key),
            channel: channel_name.to_owned(),
        });
        return;
    }
    if !channel.is_member(&target_key) {
        enqueue(registry, nick_key, IrcReply::ErrUserNotInChannel {
            nick: nick_of(registry, nick_key),
            target: target_nick.to_owned(),
            channel: channel_name.to_owned(),
        });
        return;
    }
    let already_operator = channel.is_operator(&target_key);
    if adding == already_operator {
        return;
    }
    let channel = registry.channels.get_mut(channel_key).unwrap();
    if adding {
        channel.operators.insert(target_key.clone());
    } else {
        channel.operators.remove(&target_key);
    }
    let mask = registry.user(nick_key).unwrap().user_mask();
    let sign = if adding { '+' } else { '-' };
    registry.broadcast_to_channel(
        channel_key,
        IrcReply::ModeChange {
            mask,
            channel: channel_name.to_owned(),
            change: format!("{sign}o {target_nick}"),
        },
    );
}

fn apply_ban_mode(
    registry: &mut Registry,
    nick_key: &str,
    channel_key: &str,
    channel_name: &str,
    adding: bool,
    ban_target: &str,
) {
    let canonical = canonicalize_ban_mask(ban_target);
    let channel = registry.channels.get(channel_key).unwrap();
    let already_banned = channel.ban_list.contains_key(&canonical);
    if adding == already_banned {
        return;
    }
    let setter_mask = registry.user(nick_key).unwrap().user_mask();
    let channel = registry.channels.get_mut(channel_key).unwrap();
    if adding {
        channel.ban_list.insert(canonical.clone(), setter_mask.clone());
    } else {
        channel.ban_list.remove(&canonical);
    }
    let sign = if adding { '+' } else { '-' };
    registry.broadcast_to_channel(
        channel_key,
        IrcReply::ModeChange {
            mask: setter_mask,
            channel: channel_name.to_owned(),
            change: format!("{sign}b {canonical}"),
        },
    );
}

fn apply_topic_lock_mode(
    registry: &mut Registry,
    nick_key: &str,
    channel_key: &str,
    channel_name: &str,
    adding: bool,
) {
    let channel = registry.channels.get(channel_key).unwrap();
    if !channel.is_operator(nick_key) {
        enqueue(registry, nick_key, IrcReply::ErrChanOPrivsNeeded {
            nick: nick_of(registry, nick_key),
            channel: channel_name.to_owned(),
        });
        return;
    }
    let currently_set = channel.modes.contains(&'t');
    if adding == currently_set {
        return;
    }
    let channel = registry.channels.get_mut(channel_key).unwrap();
    if adding {
        channel.modes.insert('t');
    } else {
        channel.modes.remove(&'t');
    }
    let mask = registry.user(nick_key).unwrap().user_mask();
    let sign = if adding { '+' } else { '-' };
    registry.broadcast_to_channel(
        channel_key,
        IrcReply::ModeChange {
            mask,
            channel: channel_name.to_owned(),
            change: format!("{sign}t"),
        },
    );
}

fn list_bans(registry: &mut Registry, nick_key: &str, channel_key: &str, channel_name: &str) {
    let nick = nick_of(registry, nick_key);
    let masks: Vec<String> = registry
        .channels
        .get(channel_key)
        .map(|c| c.ban_list.keys().cloned().collect())
        .unwrap_or_default();
    let user = registry.user(nick_key).unwrap();
    for mask in masks {
        user.enqueue(IrcReply::BanList {
            nick: nick.clone(),
            channel: channel_name.to_owned(),
            mask,
        });
    }
    user.enqueue(IrcReply::EndOfBanList {
        nick,
        channel: channel_name.to_owned(),
    });
}

fn nick_of(registry: &Registry, nick_key: &str) -> String {
    registry
        .user(nick_key)
        .map(|u| u.nick.clone())
        .unwrap_or_else(|| nick_key.to_owned())
}

fn enqueue(registry: &Registry, nick_key: &str, reply: IrcReply) {
    if let Some(user) = registry.user(nick_key) {
        user.enqueue(reply);
    }
}

fn enqueue_need_more_params(registry: &Registry, nick_key: &str, command: &str) {
    enqueue(
        registry,
        nick_key,
        IrcReply::ErrNeedMoreParams {
            nick: nick_of(registry, nick_key),
            command: command.to_owned(),
        },
    );
}
