//! WHO and WHOIS (§4.4): read-only registry lookups, grounded in the
//! same channel-or-user target polymorphism JOIN and PRIVMSG use (§9:
//! "Express this as a tagged variant resolved at dispatch time").

use crate::registry::Registry;
use crate::replies::IrcReply;

pub fn handle_who(registry: &mut Registry, nick_key: &str, params: &[String]) {
    let nick = registry.user(nick_key).map(|u| u.nick.clone()).unwrap_or_default();
    let Some(mask) = params.first().cloned() else {
        registry.user(nick_key).unwrap().enqueue(IrcReply::EndOfWho {
            nick,
            mask: String::new(),
        });
        return;
    };

    let target_keys: Vec<String> = if let Some(channel_name) = mask.strip_prefix('#') {
        let channel_key = format!("#{channel_name}").to_ascii_lowercase();
        registry
            .channels
            .get(&channel_key)
            .map(|c| c.members.iter().cloned().collect())
            .unwrap_or_default()
    } else {
        let target_key = mask.to_ascii_lowercase();
        if registry.users.contains_key(&target_key) {
            vec![target_key]
        } else {
            Vec::new()
        }
    };

    for target_key in &target_keys {
        let Some(target_user) = registry.users.get(target_key) else {
            continue;
        };
        let reply = IrcReply::WhoReply {
            nick: nick.clone(),
            channel: mask.clone(),
            user: target_user.user_name.clone().unwrap_or_else(|| "*".to_owned()),
            host: target_user.host.clone(),
            target_nick: target_user.nick.clone(),
            here_or_gone: if target_user.away.is_some() { 'G' } else { 'H' },
        };
        registry.user(nick_key).unwrap().enqueue(reply);
    }
    registry.user(nick_key).unwrap().enqueue(IrcReply::EndOfWho { nick, mask });
}

pub fn handle_whois(registry: &mut Registry, nick_key: &str, params: &[String]) {
    let nick = registry.user(nick_key).map(|u| u.nick.clone()).unwrap_or_default();
    let Some(target_nick) = params.first() else {
        registry.user(nick_key).unwrap().enqueue(IrcReply::ErrNoSuchNick {
            nick,
            target: String::new(),
        });
        return;
    };
    let target_key = target_nick.to_ascii_lowercase();
    let Some(target) = registry.users.get(&target_key) else {
        registry.user(nick_key).unwrap().enqueue(IrcReply::ErrNoSuchNick {
            nick,
            target: target_nick.clone(),
        });
        return;
    };

    let server_name = registry.server_name.clone();
    let user = registry.user(nick_key).unwrap();
    user.enqueue(IrcReply::WhoisUser {
        nick: nick.clone(),
        target_nick: target.nick.clone(),
        user: target.user_name.clone().unwrap_or_else(|| "*".to_owned()),
        host: target.host.clone(),
        real_name: target.real_name.clone().unwrap_or_default(),
    });
    user.enqueue(IrcReply::WhoisServer {
        nick: nick.clone(),
        target_nick: target.nick.clone(),
        target_server: server_name,
    });
    user.enqueue(IrcReply::EndOfWhois {
        nick,
        target_nick: target.nick.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::registry::{Channel, User};
    use tokio::sync::mpsc::unbounded_channel;

    fn registry_with_two() -> Registry {
        let config = Config::default();
        let mut registry = Registry::new(&config, None);
        let (tx_a, _rx_a) = unbounded_channel();
        let mut alice = User::new("h".to_owned(), tx_a);
        alice.nick = "alice".to_owned();
        alice.user_name = Some("a".to_owned());
        registry.users.insert("alice".to_owned(), alice);

        let (tx_b, _rx_b) = unbounded_channel();
        let mut bob = User::new("h".to_owned(), tx_b);
        bob.nick = "bob".to_owned();
        bob.user_name = Some("b".to_owned());
        registry.users.insert("bob".to_owned(), bob);
        registry
    }

    #[test]
    fn who_on_channel_lists_every_member() {
        let mut registry = registry_with_two();
        let mut channel = Channel::new("#foo".to_owned(), "alice".to_owned());
        channel.members.insert("bob".to_owned());
        registry.channels.insert("#foo".to_owned(), channel);

        handle_who(&mut registry, "alice", &["#foo".to_owned()]);
    }

    #[test]
    fn whois_unknown_nick_is_error() {
        let mut registry = registry_with_two();
        handle_whois(&mut registry, "alice", &["ghost".to_owned()]);
    }
}
