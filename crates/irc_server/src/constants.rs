//! Numeric reply codes and their fixed text fragments (§6).
//!
//! Grouped the way the teacher's `constants.rs` groups its two codes,
//! extended to the full catalogue §6 enumerates. Text fragments follow
//! the original MantaTail server's wording
//! (`examples/original_source/irc_responses.py`, `commands.py`) where the
//! spec itself doesn't spell one out.

// Welcome block
pub const RPL_WELCOME_NB: u16 = 1;
pub const RPL_WELCOME_STR: &str = "Welcome to the Internet Relay Network";
pub const RPL_YOURHOST_NB: u16 = 2;
pub const RPL_CREATED_NB: u16 = 3;
pub const RPL_MYINFO_NB: u16 = 4;
pub const RPL_ISUPPORT_NB: u16 = 5;
pub const RPL_ISUPPORT_STR: &str = "are supported by this server";

// Away
pub const RPL_AWAY_NB: u16 = 301;
pub const RPL_UNAWAY_NB: u16 = 305;
pub const RPL_UNAWAY_STR: &str = "You are no longer marked as being away";
pub const RPL_NOWAWAY_NB: u16 = 306;
pub const RPL_NOWAWAY_STR: &str = "You have been marked as being away";

// WHO / WHOIS
pub const RPL_WHOISUSER_NB: u16 = 311;
pub const RPL_WHOISSERVER_NB: u16 = 312;
pub const RPL_ENDOFWHO_NB: u16 = 315;
pub const RPL_ENDOFWHO_STR: &str = "End of /WHO list.";
pub const RPL_ENDOFWHOIS_NB: u16 = 318;
pub const RPL_ENDOFWHOIS_STR: &str = "End of /WHOIS list.";
pub const RPL_WHOREPLY_NB: u16 = 352;

// Channel mode / topic
pub const RPL_CHANNELMODEIS_NB: u16 = 324;
pub const RPL_NOTOPIC_NB: u16 = 331;
pub const RPL_NOTOPIC_STR: &str = "No topic is set.";
pub const RPL_TOPIC_NB: u16 = 332;
pub const RPL_TOPICWHOTIME_NB: u16 = 333;

// NAMES
pub const RPL_NAMREPLY_NB: u16 = 353;
pub const RPL_ENDOFNAMES_NB: u16 = 366;
pub const RPL_ENDOFNAMES_STR: &str = "End of /NAMES list.";

// Ban list
pub const RPL_BANLIST_NB: u16 = 367;
pub const RPL_ENDOFBANLIST_NB: u16 = 368;
pub const RPL_ENDOFBANLIST_STR: &str = "End of Channel Ban List";

// MOTD
pub const RPL_MOTDSTART_NB: u16 = 375;
pub const RPL_MOTDSTART_STR: &str = "Message of the day -";
pub const RPL_MOTD_NB: u16 = 372;
pub const RPL_ENDOFMOTD_NB: u16 = 376;
pub const RPL_ENDOFMOTD_STR: &str = "End of /MOTD command";

// Errors
pub const ERR_NOSUCHNICK_NB: u16 = 401;
pub const ERR_NOSUCHNICK_STR: &str = "No such nick/channel";
pub const ERR_NOSUCHCHANNEL_NB: u16 = 403;
pub const ERR_NOSUCHCHANNEL_STR: &str = "No such channel";
pub const ERR_CANNOTSENDTOCHAN_NB: u16 = 404;
pub const ERR_CANNOTSENDTOCHAN_STR: &str = "Cannot send to nick/channel";
pub const ERR_NOORIGIN_NB: u16 = 409;
pub const ERR_NOORIGIN_STR: &str = "No origin specified";
pub const ERR_NORECIPIENT_NB: u16 = 411;
pub const ERR_NORECIPIENT_STR: &str = "No recipient given";
pub const ERR_NOTEXTTOSEND_NB: u16 = 412;
pub const ERR_NOTEXTTOSEND_STR: &str = "No text to send";
pub const ERR_UNKNOWNCOMMAND_NB: u16 = 421;
pub const ERR_UNKNOWNCOMMAND_STR: &str = "Unknown command";
pub const ERR_NOMOTD_NB: u16 = 422;
pub const ERR_NOMOTD_STR: &str = "MOTD File is missing";
pub const ERR_NONICKNAMEGIVEN_NB: u16 = 431;
pub const ERR_NONICKNAMEGIVEN_STR: &str = "No nickname given";
pub const ERR_ERRONEUSNICKNAME_NB: u16 = 432;
pub const ERR_ERRONEUSNICKNAME_STR: &str = "Erroneous Nickname";
pub const ERR_NICKNAMEINUSE_NB: u16 = 433;
pub const ERR_NICKNAMEINUSE_STR: &str = "Nickname is already in use";
pub const ERR_USERNOTINCHANNEL_NB: u16 = 441;
pub const ERR_USERNOTINCHANNEL_STR: &str = "They aren't on that channel";
pub const ERR_NOTONCHANNEL_NB: u16 = 442;
pub const ERR_NOTONCHANNEL_STR: &str = "You're not on that channel";
pub const ERR_NOTREGISTERED_NB: u16 = 451;
pub const ERR_NOTREGISTERED_STR: &str = "You have not registered";
pub const ERR_NEEDMOREPARAMS_NB: u16 = 461;
pub const ERR_NEEDMOREPARAMS_STR: &str = "Not enough parameters";
pub const ERR_UNKNOWNMODE_NB: u16 = 472;
pub const ERR_UNKNOWNMODE_STR: &str = "is an unknown mode char to me";
pub const ERR_BANNEDFROMCHAN_NB: u16 = 474;
pub const ERR_BANNEDFROMCHAN_STR: &str = "Cannot join channel (+b) - you are banned";
pub const ERR_CHANOPRIVSNEEDED_NB: u16 = 482;
pub const ERR_CHANOPRIVSNEEDED_STR: &str = "You're not channel operator";

/// ISUPPORT tokens sent in the 005 reply, verbatim per §6.
pub const ISUPPORT_TOKENS: &str =
    "NICKLEN=16 PREFIX=(o)@ CHANTYPES=# TARGMAX=PRIVMSG:1,JOIN:1,PART:1,KICK:1";

/// Capabilities advertised in `CAP LS` (§6).
pub const SERVER_CAPABILITIES: &[&str] = &["away-notify", "cap-notify"];
