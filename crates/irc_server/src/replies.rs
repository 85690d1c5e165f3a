//! The `IrcReply` enum: every line this server ever sends (§6), built the
//! way the teacher's `replies.rs` builds them — one variant per shape, one
//! `format` arm per variant — generalised from `&'a str` fields to owned
//! `String`s so a handler can build a reply from data it no longer borrows
//! from the registry once the lock is released.
//!
//! Two families share this enum: numeric replies (prefixed with the
//! server name) and user-originated events (prefixed with the sender's
//! `nick!user@host` mask, §6). [`IrcReply::format`] takes the server name
//! as a parameter rather than a global constant, since it comes from
//! [`crate::config::Config`] rather than being compiled in.

use crate::constants::*;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum IrcReply {
    // --- Welcome block (001-005) ---
    Welcome {
        nick: String,
        user: String,
        host: String,
    },
    YourHost {
        nick: String,
        version: String,
    },
    Created {
        nick: String,
        date: String,
    },
    MyInfo {
        nick: String,
        version: String,
    },
    ISupport {
        nick: String,
    },

    // --- MOTD ---
    MotdStart {
        nick: String,
    },
    Motd {
        nick: String,
        line: String,
    },
    EndOfMotd {
        nick: String,
    },
    NoMotd {
        nick: String,
    },

    // --- Away ---
    Away {
        nick: String,
        target: String,
        message: String,
    },
    UnAway {
        nick: String,
    },
    NowAway {
        nick: String,
    },

    // --- WHO / WHOIS ---
    WhoReply {
        nick: String,
        channel: String,
        user: String,
        host: String,
        target_nick: String,
        here_or_gone: char,
    },
    EndOfWho {
        nick: String,
        mask: String,
    },
    WhoisUser {
        nick: String,
        target_nick: String,
        user: String,
        host: String,
        real_name: String,
    },
    WhoisServer {
        nick: String,
        target_nick: String,
        target_server: String,
    },
    EndOfWhois {
        nick: String,
        target_nick: String,
    },

    // --- Channel mode / topic queries ---
    ChannelModeIs {
        nick: String,
        channel: String,
        modes: String,
    },
    NoTopic {
        nick: String,
        channel: String,
    },
    Topic {
        nick: String,
        channel: String,
        topic: String,
    },
    TopicWhoTime {
        nick: String,
        channel: String,
        author: String,
    },

    // --- NAMES ---
    NamReply {
        nick: String,
        channel: String,
        names: Vec<String>,
    },
    EndOfNames {
        nick: String,
        channel: String,
    },

    // --- Ban list ---
    BanList {
        nick: String,
        channel: String,
        mask: String,
    },
    EndOfBanList {
        nick: String,
        channel: String,
    },

    // --- User-originated protocol events, prefixed by a user-mask ---
    Join {
        mask: String,
        channel: String,
    },
    Part {
        mask: String,
        channel: String,
    },
    PrivMsg {
        mask: String,
        target: String,
        text: String,
    },
    Nick {
        mask: String,
        new_nick: String,
    },
    Quit {
        mask: String,
        reason: String,
    },
    Kick {
        mask: String,
        channel: String,
        victim: String,
        reason: String,
    },
    ModeChange {
        mask: String,
        channel: String,
        change: String,
    },
    AwayNotify {
        mask: String,
        message: String,
    },
    TopicChanged {
        mask: String,
        channel: String,
        topic: String,
    },
    Pong {
        tok: String,
    },
    Ping {
        tok: String,
    },

    // --- CAP negotiation ---
    CapLs {
        nick: String,
        caps: String,
    },
    CapList {
        nick: String,
        caps: String,
    },
    CapAck {
        nick: String,
        caps: String,
    },
    CapNak {
        nick: String,
        caps: String,
    },

    // --- Errors ---
    ErrNoSuchNick {
        nick: String,
        target: String,
    },
    ErrNoSuchChannel {
        nick: String,
        channel: String,
    },
    ErrCannotSendToChan {
        nick: String,
        channel: String,
    },
    ErrNoOrigin {
        nick: String,
    },
    ErrNoRecipient {
        nick: String,
        command: String,
    },
    ErrNoTextToSend {
        nick: String,
    },
    ErrUnknownCommand {
        nick: String,
        command: String,
    },
    ErrNoNicknameGiven {
        nick: String,
    },
    ErrErroneusNickname {
        nick: String,
        attempted: String,
    },
    ErrNicknameInUse {
        nick: String,
        attempted: String,
    },
    ErrUserNotInChannel {
        nick: String,
        target: String,
        channel: String,
    },
    ErrNotOnChannel {
        nick: String,
        channel: String,
    },
    ErrNotRegistered {
        nick: String,
    },
    ErrNeedMoreParams {
        nick: String,
        command: String,
    },
    ErrUnknownMode {
        nick: String,
        letter: char,
    },
    ErrBannedFromChan {
        nick: String,
        channel: String,
    },
    ErrChanOPrivsNeeded {
        nick: String,
        channel: String,
    },
}

impl IrcReply {
    /// Renders the final wire line, without the trailing `\r\n` (added by
    /// the outbound pump, §4.2).
    pub fn format(&self, server_name: &str) -> String {
        match self {
            IrcReply::Welcome { nick, user, host } => format!(
                ":{server_name} {RPL_WELCOME_NB:03} {nick} :{RPL_WELCOME_STR} {nick}!{user}@{host}"
            ),
            IrcReply::YourHost { nick, version } => format!(
                ":{server_name} {RPL_YOURHOST_NB:03} {nick} :Your host is {server_name}, running version {version}"
            ),
            IrcReply::Created { nick, date } => {
                format!(":{server_name} {RPL_CREATED_NB:03} {nick} :This server was created {date}")
            }
            IrcReply::MyInfo { nick, version } => format!(
                ":{server_name} {RPL_MYINFO_NB:03} {nick} {server_name} {version} o o"
            ),
            IrcReply::ISupport { nick } => format!(
                ":{server_name} {RPL_ISUPPORT_NB:03} {nick} {ISUPPORT_TOKENS} :{RPL_ISUPPORT_STR}"
            ),

            IrcReply::MotdStart { nick } => format!(
                ":{server_name} {RPL_MOTDSTART_NB:03} {nick} :- {server_name} {RPL_MOTDSTART_STR}"
            ),
            IrcReply::Motd { nick, line } => {
                format!(":{server_name} {RPL_MOTD_NB:03} {nick} :- {line}")
            }
            IrcReply::EndOfMotd { nick } => {
                format!(":{server_name} {RPL_ENDOFMOTD_NB:03} {nick} :{RPL_ENDOFMOTD_STR}")
            }
            IrcReply::NoMotd { nick } => {
                format!(":{server_name} {ERR_NOMOTD_NB:03} {nick} :{ERR_NOMOTD_STR}")
            }

            IrcReply::Away {
                nick,
                target,
                message,
            } => format!(":{server_name} {RPL_AWAY_NB:03} {nick} {target} :{message}"),
            IrcReply::UnAway { nick } => {
                format!(":{server_name} {RPL_UNAWAY_NB:03} {nick} :{RPL_UNAWAY_STR}")
            }
            IrcReply::NowAway { nick } => {
                format!(":{server_name} {RPL_NOWAWAY_NB:03} {nick} :{RPL_NOWAWAY_STR}")
            }

            IrcReply::WhoReply {
                nick,
                channel,
                user,
                host,
                target_nick,
                here_or_gone,
            } => format!(
                ":{server_name} {RPL_WHOREPLY_NB:03} {nick} {channel} {user} {host} {server_name} {target_nick} {here_or_gone} :0 {target_nick}"
            ),
            IrcReply::EndOfWho { nick, mask } => {
                format!(":{server_name} {RPL_ENDOFWHO_NB:03} {nick} {mask} :{RPL_ENDOFWHO_STR}")
            }
            IrcReply::WhoisUser {
                nick,
                target_nick,
                user,
                host,
                real_name,
            } => format!(
                ":{server_name} {RPL_WHOISUSER_NB:03} {nick} {target_nick} {user} {host} * :{real_name}"
            ),
            IrcReply::WhoisServer {
                nick,
                target_nick,
                target_server,
            } => format!(
                ":{server_name} {RPL_WHOISSERVER_NB:03} {nick} {target_nick} {target_server} :IRC server"
            ),
            IrcReply::EndOfWhois { nick, target_nick } => format!(
                ":{server_name} {RPL_ENDOFWHOIS_NB:03} {nick} {target_nick} :{RPL_ENDOFWHOIS_STR}"
            ),

            IrcReply::ChannelModeIs {
                nick,
                channel,
                modes,
            } => format!(":{server_name} {RPL_CHANNELMODEIS_NB:03} {nick} {channel} {modes}"),
            IrcReply::NoTopic { nick, channel } => {
                format!(":{server_name} {RPL_NOTOPIC_NB:03} {nick} {channel} :{RPL_NOTOPIC_STR}")
            }
            IrcReply::Topic {
                nick,
                channel,
                topic,
            } => format!(":{server_name} {RPL_TOPIC_NB:03} {nick} {channel} :{topic}"),
            IrcReply::TopicWhoTime {
                nick,
                channel,
                author,
            } => format!(":{server_name} {RPL_TOPICWHOTIME_NB:03} {nick} {channel} :{author}"),

            IrcReply::NamReply {
                nick,
                channel,
                names,
            } => format!(
                ":{server_name} {RPL_NAMREPLY_NB:03} {nick} = {channel} :{}",
                names.join(" ")
            ),
            IrcReply::EndOfNames { nick, channel } => format!(
                ":{server_name} {RPL_ENDOFNAMES_NB:03} {nick} {channel} :{RPL_ENDOFNAMES_STR}"
            ),

            IrcReply::BanList {
                nick,
                channel,
                mask,
            } => format!(":{server_name} {RPL_BANLIST_NB:03} {nick} {channel} {mask}"),
            IrcReply::EndOfBanList { nick, channel } => format!(
                ":{server_name} {RPL_ENDOFBANLIST_NB:03} {nick} {channel} :{RPL_ENDOFBANLIST_STR}"
            ),

            IrcReply::Join { mask, channel } => format!(":{mask} JOIN {channel}"),
            IrcReply::Part { mask, channel } => format!(":{mask} PART {channel}"),
            IrcReply::PrivMsg {
                mask,
                target,
                text,
            } => format!(":{mask} PRIVMSG {target} :{text}"),
            IrcReply::Nick { mask, new_nick } => format!(":{mask} NICK :{new_nick}"),
            IrcReply::Quit { mask, reason } => format!(":{mask} QUIT :Quit: {reason}"),
            IrcReply::Kick {
                mask,
                channel,
                victim,
                reason,
            } => format!(":{mask} KICK {channel} {victim} :{reason}"),
            IrcReply::ModeChange {
                mask,
                channel,
                change,
            } => format!(":{mask} MODE {channel} {change}"),
            IrcReply::AwayNotify { mask, message } => format!(":{mask} AWAY :{message}"),
            IrcReply::TopicChanged {
                mask,
                channel,
                topic,
            } => format!(":{mask} TOPIC {channel} :{topic}"),
            IrcReply::Pong { tok } => format!(":{server_name} PONG {server_name} :{tok}"),
            IrcReply::Ping { tok } => format!(":{server_name} PING :{tok}"),

            IrcReply::CapLs { nick, caps } => format!("CAP {nick} LS :{caps}"),
            IrcReply::CapList { nick, caps } => format!("CAP {nick} LIST :{caps}"),
            IrcReply::CapAck { nick, caps } => format!("CAP {nick} ACK :{caps}"),
            IrcReply::CapNak { nick, caps } => format!("CAP {nick} NAK :{caps}"),

            IrcReply::ErrNoSuchNick { nick, target } => format!(
                ":{server_name} {ERR_NOSUCHNICK_NB:03} {nick} {target} :{ERR_NOSUCHNICK_STR}"
            ),
            IrcReply::ErrNoSuchChannel { nick, channel } => format!(
                ":{server_name} {ERR_NOSUCHCHANNEL_NB:03} {nick} {channel} :{ERR_NOSUCHCHANNEL_STR}"
            ),
            IrcReply::ErrCannotSendToChan { nick, channel } => format!(
                ":{server_name} {ERR_CANNOTSENDTOCHAN_NB:03} {nick} {channel} :{ERR_CANNOTSENDTOCHAN_STR}"
            ),
            IrcReply::ErrNoOrigin { nick } => {
                format!(":{server_name} {ERR_NOORIGIN_NB:03} {nick} :{ERR_NOORIGIN_STR}")
            }
            IrcReply::ErrNoRecipient { nick, command } => format!(
                ":{server_name} {ERR_NORECIPIENT_NB:03} {nick} :{ERR_NORECIPIENT_STR} ({command})"
            ),
            IrcReply::ErrNoTextToSend { nick } => {
                format!(":{server_name} {ERR_NOTEXTTOSEND_NB:03} {nick} :{ERR_NOTEXTTOSEND_STR}")
            }
            IrcReply::ErrUnknownCommand { nick, command } => format!(
                ":{server_name} {ERR_UNKNOWNCOMMAND_NB:03} {nick} {command} :{ERR_UNKNOWNCOMMAND_STR}"
            ),
            IrcReply::ErrNoNicknameGiven { nick } => format!(
                ":{server_name} {ERR_NONICKNAMEGIVEN_NB:03} {nick} :{ERR_NONICKNAMEGIVEN_STR}"
            ),
            IrcReply::ErrErroneusNickname { nick, attempted } => format!(
                ":{server_name} {ERR_ERRONEUSNICKNAME_NB:03} {nick} {attempted} :{ERR_ERRONEUSNICKNAME_STR}"
            ),
            IrcReply::ErrNicknameInUse { nick, attempted } => format!(
                ":{server_name} {ERR_NICKNAMEINUSE_NB:03} {nick} {attempted} :{ERR_NICKNAMEINUSE_STR}"
            ),
            IrcReply::ErrUserNotInChannel {
                nick,
                target,
                channel,
            } => format!(
                ":{server_name} {ERR_USERNOTINCHANNEL_NB:03} {nick} {target} {channel} :{ERR_USERNOTINCHANNEL_STR}"
            ),
            IrcReply::ErrNotOnChannel { nick, channel } => format!(
                ":{server_name} {ERR_NOTONCHANNEL_NB:03} {nick} {channel} :{ERR_NOTONCHANNEL_STR}"
            ),
            IrcReply::ErrNotRegistered { nick } => {
                format!(":{server_name} {ERR_NOTREGISTERED_NB:03} {nick} :{ERR_NOTREGISTERED_STR}")
            }
            IrcReply::ErrNeedMoreParams { nick, command } => format!(
                ":{server_name} {ERR_NEEDMOREPARAMS_NB:03} {nick} {command} :{ERR_NEEDMOREPARAMS_STR}"
            ),
            IrcReply::ErrUnknownMode { nick, letter } => format!(
                ":{server_name} {ERR_UNKNOWNMODE_NB:03} {nick} {letter} :{ERR_UNKNOWNMODE_STR}"
            ),
            IrcReply::ErrBannedFromChan { nick, channel } => format!(
                ":{server_name} {ERR_BANNEDFROMCHAN_NB:03} {nick} {channel} :{ERR_BANNEDFROMCHAN_STR}"
            ),
            IrcReply::ErrChanOPrivsNeeded { nick, channel } => format!(
                ":{server_name} {ERR_CHANOPRIVSNEEDED_NB:03} {nick} {channel} :{ERR_CHANOPRIVSNEEDED_STR}"
            ),
        }
    }
}
