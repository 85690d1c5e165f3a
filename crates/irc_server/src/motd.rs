//! MOTD file loading and per-user `{user_nick}` templating (§6: "An
//! optional external file whose shape is an ordered sequence of text
//! lines, each possibly containing a `{user_nick}` token expanded
//! per-user. If missing, 422 replaces the 372 block."). The file loader
//! itself is a named non-goal (§1); what's in scope here is the
//! templating `welcome.rs`/`motd.rs`-style helper the reader/dispatcher
//! calls once per newly-registered user.

use std::fs;
use std::path::Path;

use crate::registry::{Registry, User};
use crate::replies::IrcReply;

/// Loads an MOTD file as an ordered sequence of lines. `None` means the
/// file is absent or unreadable, which the welcome sequence turns into
/// `ERR_NOMOTD` (422) instead of the `RPL_MOTD` (372) block.
pub fn load_motd(path: &str) -> Option<Vec<String>> {
    let content = fs::read_to_string(Path::new(path)).ok()?;
    Some(content.lines().map(|l| l.to_owned()).collect())
}

/// Expands the `{user_nick}` token in one MOTD line for `nick` (§6).
pub fn render_motd_line(line: &str, nick: &str) -> String {
    line.replace("{user_nick}", nick)
}

/// The post-registration banner sequence (§4.3): 001-005 then the MOTD
/// block. Ordered so the caller can enqueue each reply in turn — the
/// welcome sequence is defined by the order the frames are sent in, not
/// by any structure richer than a flat list.
pub fn build_welcome_burst(registry: &Registry, user: &User) -> Vec<IrcReply> {
    let nick = user.nick.clone();
    let mut burst = vec![
        IrcReply::Welcome {
            nick: nick.clone(),
            user: user.user_name.clone().unwrap_or_else(|| "*".to_owned()),
            host: user.host.clone(),
        },
        IrcReply::YourHost {
            nick: nick.clone(),
            version: registry.server_version.clone(),
        },
        IrcReply::Created {
            nick: nick.clone(),
            date: registry.server_created.clone(),
        },
        IrcReply::MyInfo {
            nick: nick.clone(),
            version: registry.server_version.clone(),
        },
        IrcReply::ISupport { nick: nick.clone() },
    ];

    match &registry.motd_lines {
        Some(lines) => {
            burst.push(IrcReply::MotdStart { nick: nick.clone() });
            for line in lines {
                burst.push(IrcReply::Motd {
                    nick: nick.clone(),
                    line: render_motd_line(line, &nick),
                });
            }
            burst.push(IrcReply::EndOfMotd { nick });
        }
        None => burst.push(IrcReply::NoMotd { nick }),
    }

    burst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_motd_line_substitutes_token() {
        assert_eq!(
            render_motd_line("Welcome, {user_nick}!", "alice"),
            "Welcome, alice!"
        );
    }

    #[test]
    fn render_motd_line_is_a_no_op_without_the_token() {
        assert_eq!(render_motd_line("plain line", "alice"), "plain line");
    }

    #[test]
    fn load_motd_returns_none_for_missing_file() {
        assert!(load_motd("/nonexistent/path/to/motd.txt").is_none());
    }

    #[test]
    fn welcome_burst_ends_in_nomotd_when_file_absent() {
        let config = crate::config::Config::default();
        let registry = Registry::new(&config, None);
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut user = User::new("host.example".to_owned(), tx);
        user.nick = "alice".to_owned();
        user.user_name = Some("a".to_owned());

        let burst = build_welcome_burst(&registry, &user);
        assert!(matches!(burst[0], IrcReply::Welcome { .. }));
        assert!(matches!(burst.last().unwrap(), IrcReply::NoMotd { .. }));
    }

    #[test]
    fn welcome_burst_templates_motd_lines_per_user() {
        let config = crate::config::Config::default();
        let registry = Registry::new(&config, Some(vec!["hi {user_nick}".to_owned()]));
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut user = User::new("host.example".to_owned(), tx);
        user.nick = "bob".to_owned();
        user.user_name = Some("b".to_owned());

        let burst = build_welcome_burst(&registry, &user);
        let motd_line = burst
            .iter()
            .find_map(|r| match r {
                IrcReply::Motd { line, .. } => Some(line.clone()),
                _ => None,
            })
            .expect("one Motd reply");
        assert_eq!(motd_line, "hi bob");
    }
}
