//! PRIVMSG (§4.4). Grounded in the teacher's channel-vs-nickname target
//! split in `handle_privmsg`, collapsed to this spec's two target shapes
//! — channel (`#`-prefixed) and nickname — since host/server masks are
//! out of scope here.

use crate::mask::is_banned;
use crate::registry::Registry;
use crate::replies::IrcReply;

pub fn handle_privmsg(registry: &mut Registry, nick_key: &str, params: &[String]) {
    let nick = registry.user(nick_key).map(|u| u.nick.clone()).unwrap_or_default();
    let Some(target) = params.first() else {
        registry.user(nick_key).unwrap().enqueue(IrcReply::ErrNoRecipient {
            nick,
            command: "PRIVMSG".to_owned(),
        });
        return;
    };
    let Some(text) = params.get(1) else {
        registry.user(nick_key).unwrap().enqueue(IrcReply::ErrNoTextToSend { nick });
        return;
    };

    if let Some(channel_name) = target.strip_prefix('#') {
        let channel_name = format!("#{channel_name}");
        let channel_key = channel_name.to_ascii_lowercase();
        let Some(channel) = registry.channels.get(&channel_key) else {
            registry.user(nick_key).unwrap().enqueue(IrcReply::ErrNoSuchChannel {
                nick,
                channel: channel_name,
            });
            return;
        };
        if !channel.is_member(nick_key) {
            registry.user(nick_key).unwrap().enqueue(IrcReply::ErrNotOnChannel {
                nick,
                channel: channel_name,
            });
            return;
        }
        let user_mask = registry.user(nick_key).unwrap().user_mask();
        if is_banned(&user_mask, channel.ban_list.keys()) {
            registry.user(nick_key).unwrap().enqueue(IrcReply::ErrCannotSendToChan {
                nick,
                channel: channel_name,
            });
            return;
        }
        registry.broadcast_to_channel_except(
            &channel_key,
            nick_key,
            IrcReply::PrivMsg {
                mask: user_mask,
                target: channel_name,
                text: text.clone(),
            },
        );
        return;
    }

    let target_key = target.to_ascii_lowercase();
    let Some(recipient) = registry.users.get(&target_key) else {
        registry.user(nick_key).unwrap().enqueue(IrcReply::ErrNoSuchNick {
            nick,
            target: target.clone(),
        });
        return;
    };
    let user_mask = registry.user(nick_key).unwrap().user_mask();
    let recipient = registry.users.get(&target_key).unwrap();
    recipient.enqueue(IrcReply::PrivMsg {
        mask: user_mask,
        target: target.clone(),
        text: text.clone(),
    });
    if let Some(away_message) = recipient.away.clone() {
        registry.user(nick_key).unwrap().enqueue(IrcReply::Away {
            nick,
            target: target.clone(),
            message: away_message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::registry::{Channel, User};
    use tokio::sync::mpsc::unbounded_channel;

    fn registry_with_two() -> (Registry, tokio::sync::mpsc::UnboundedReceiver<crate::registry::OutboundItem>) {
        let config = Config::default();
        let mut registry = Registry::new(&config, None);
        let (tx_a, _rx_a) = unbounded_channel();
        let mut alice = User::new("h".to_owned(), tx_a);
        alice.nick = "alice".to_owned();
        alice.user_name = Some("a".to_owned());
        registry.users.insert("alice".to_owned(), alice);

        let (tx_b, rx_b) = unbounded_channel();
        let mut bob = User::new("h".to_owned(), tx_b);
        bob.nick = "bob".to_owned();
        bob.user_name = Some("b".to_owned());
        registry.users.insert("bob".to_owned(), bob);
        (registry, rx_b)
    }

    #[test]
    fn channel_privmsg_excludes_sender() {
        let (mut registry, mut rx_b) = registry_with_two();
        let mut channel = Channel::new("#foo".to_owned(), "alice".to_owned());
        channel.members.insert("bob".to_owned());
        registry.channels.insert("#foo".to_owned(), channel);

        handle_privmsg(&mut registry, "bob", &["#foo".to_owned(), "Foo".to_owned()]);
        assert!(rx_b.try_recv().is_err(), "sender should receive nothing back");
    }

    #[test]
    fn private_message_to_away_user_replies_rpl_away() {
        let (mut registry, _rx_b) = registry_with_two();
        registry.users.get_mut("bob").unwrap().away = Some("brb".to_owned());
        handle_privmsg(&mut registry, "alice", &["bob".to_owned(), "hi".to_owned()]);
        // alice's own queue carries the RPL_AWAY reply.
    }

    #[test]
    fn ban_blocks_channel_privmsg() {
        let (mut registry, mut rx_b) = registry_with_two();
        let mut channel = Channel::new("#foo".to_owned(), "alice".to_owned());
        channel.members.insert("bob".to_owned());
        channel.ban_list.insert("bob!*@*".to_owned(), "alice!a@h".to_owned());
        registry.channels.insert("#foo".to_owned(), channel);

        handle_privmsg(&mut registry, "bob", &["#foo".to_owned(), "hi".to_owned()]);
        let item = rx_b.try_recv().expect("bob gets the 404 back");
        match item {
            crate::registry::OutboundItem::Line(IrcReply::ErrCannotSendToChan { .. }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}
