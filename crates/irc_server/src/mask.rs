//! Ban-mask canonicalisation and shell-glob matching (§4.5). Grounded in
//! the teacher's `parsers.rs` mask-segment combinators, but the shape of
//! the problem here is simpler than RFC 2812's dotted targetmask: a ban
//! target is split on `!` and `@` into three segments, any missing
//! segment defaults to `*`, and matching is plain shell-glob (`*`, `?`)
//! against the rendered `nick!user@host` triple rather than hostmask
//! dot-segments.

/// Splits a ban target into `(nick, user, host)`, defaulting any missing
/// segment to `*`, per the table in §4.5. A bare token with neither `!`
/// nor `@` is a nick (`Foo` → nick); once there is no `!`, the presence
/// of `@` decides whether the token is `user@host` instead (`Bar@Baz`,
/// `@Baz`, `BobUsr@`).
fn split_ban_target(raw: &str) -> (String, String, String) {
    let fill = |s: &str| if s.is_empty() { "*".to_owned() } else { s.to_owned() };

    if let Some((nick, rest)) = raw.split_once('!') {
        let (user, host) = rest.split_once('@').unwrap_or((rest, ""));
        return (fill(nick), fill(user), fill(host));
    }
    if let Some((user, host)) = raw.split_once('@') {
        return (fill(""), fill(user), fill(host));
    }
    (fill(raw), fill(""), fill(""))
}

/// Canonicalises a ban target supplied to `MODE #chan +b` into
/// `nick!user@host`, filling missing segments with `*` (§4.5). Idempotent:
/// canonicalising an already-canonical mask returns it unchanged.
pub fn canonicalize_ban_mask(raw: &str) -> String {
    let (nick, user, host) = split_ban_target(raw);
    format!("{nick}!{user}@{host}")
}

/// `true` if `mask` (containing `*`/`?` wildcards) matches `candidate`
/// under shell-glob semantics: `*` matches any run of characters
/// (including none), `?` matches exactly one character.
pub fn glob_match(mask: &str, candidate: &str) -> bool {
    let mask: Vec<char> = mask.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();
    glob_match_inner(&mask, &candidate)
}

fn glob_match_inner(mask: &[char], candidate: &[char]) -> bool {
    match mask.first() {
        None => candidate.is_empty(),
        Some('*') => {
            glob_match_inner(&mask[1..], candidate)
                || (!candidate.is_empty() && glob_match_inner(mask, &candidate[1..]))
        }
        Some('?') => !candidate.is_empty() && glob_match_inner(&mask[1..], &candidate[1..]),
        Some(c) => {
            candidate.first() == Some(c) && glob_match_inner(&mask[1..], &candidate[1..])
        }
    }
}

/// `true` if the user-mask `nick!user@host` matches any entry in
/// `ban_list` under [`glob_match`] (§4.5).
pub fn is_banned<'a>(user_mask: &str, ban_list: impl IntoIterator<Item = &'a String>) -> bool {
    ban_list
        .into_iter()
        .any(|entry| glob_match(entry, user_mask))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_every_shape_in_the_spec_table() {
        assert_eq!(canonicalize_ban_mask("Foo"), "Foo!*@*");
        assert_eq!(canonicalize_ban_mask("Foo!Bar"), "Foo!Bar@*");
        assert_eq!(canonicalize_ban_mask("Foo!Bar@Baz"), "Foo!Bar@Baz");
        assert_eq!(canonicalize_ban_mask("Bar@Baz"), "*!Bar@Baz");
        assert_eq!(canonicalize_ban_mask("@Baz"), "*!*@Baz");
        assert_eq!(canonicalize_ban_mask("BobUsr@"), "*!BobUsr@*");
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let once = canonicalize_ban_mask("Foo!Bar@Baz");
        assert_eq!(canonicalize_ban_mask(&once), once);
        let wildcarded = canonicalize_ban_mask("*!*@host.example");
        assert_eq!(canonicalize_ban_mask(&wildcarded), wildcarded);
    }

    #[test]
    fn glob_matches_star_and_question_mark() {
        assert!(glob_match("*!*@*", "alice!a@host"));
        assert!(glob_match("alice!*@*", "alice!a@host"));
        assert!(!glob_match("bob!*@*", "alice!a@host"));
        assert!(glob_match("a?ice!*@*", "alice!a@host"));
        assert!(!glob_match("a?ice!*@*", "allice!a@host"));
    }

    #[test]
    fn is_banned_checks_every_entry() {
        let bans = vec!["troll!*@*".to_owned(), "*!*@spammer.example".to_owned()];
        assert!(is_banned("troll!u@h", &bans));
        assert!(is_banned("anyone!u@spammer.example", &bans));
        assert!(!is_banned("alice!a@host", &bans));
    }
}
