//! Nickname and channel-name grammar (§6: "Channel name grammar ...
//! Nick grammar ..."), built with `nom` combinators in the teacher's
//! `parsers.rs` idiom but over this spec's own alphabet — which is not
//! RFC 2812's (no 9-char cap, `|` is a legal nick character) — and
//! driving full-match parsing (`all_consuming`) rather than accepting a
//! valid prefix of a longer invalid string. A previous draft reused the
//! teacher's RFC 2812 `nickname_parser`/`channel_parser` verbatim; it
//! silently truncated `"validnick!withjunk"` to `"validnick"` rather than
//! rejecting it outright, and capped nicks at 9 characters. Both are
//! wrong here — see `DESIGN.md`.

use nom::{
    bytes::complete::{tag, take_while_m_n},
    character::complete::satisfy,
    combinator::{all_consuming, recognize},
    sequence::pair,
    IResult, Parser,
};

fn is_nick_first_char(c: char) -> bool {
    c.is_ascii_alphabetic() || "|\\_[]{}^`-".contains(c)
}

fn is_nick_tail_char(c: char) -> bool {
    is_nick_first_char(c) || c.is_ascii_digit()
}

fn nickname_parser(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(is_nick_first_char),
        take_while_m_n(0, 15, is_nick_tail_char),
    ))
    .parse(input)
}

/// `true` iff `nick` matches the spec's full nickname grammar: first char
/// `[a-zA-Z|\_\[\]{}^`-]`, then up to 15 more of that set plus digits.
pub fn is_valid_nickname(nick: &str) -> bool {
    all_consuming(nickname_parser).parse(nick).is_ok()
}

fn is_channel_char(c: char) -> bool {
    c != ' ' && c != '\u{0007}' && c != ','
}

fn channel_parser(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        tag("#"),
        take_while_m_n(1, 49, is_channel_char),
    ))
    .parse(input)
}

/// `true` iff `channel` matches `#[^ \x07,]{1,49}` in full.
pub fn is_valid_channel_name(channel: &str) -> bool {
    all_consuming(channel_parser).parse(channel).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_nicknames() {
        let cases = ["a", "alice", "A1", "[bot]", "^_^", "nick-name", "x|y"];
        for &case in &cases {
            assert!(is_valid_nickname(case), "should accept: {case}");
        }
    }

    #[test]
    fn rejects_nicknames_starting_with_digit() {
        assert!(!is_valid_nickname("1abc"));
    }

    #[test]
    fn rejects_empty_nickname() {
        assert!(!is_valid_nickname(""));
    }

    #[test]
    fn rejects_nickname_over_sixteen_chars() {
        let too_long = "a123456789012345X";
        assert!(too_long.len() == 17);
        assert!(!is_valid_nickname(too_long));
    }

    #[test]
    fn accepts_nickname_at_max_length_sixteen() {
        let max = "a123456789012345";
        assert!(max.len() == 16);
        assert!(is_valid_nickname(max));
    }

    #[test]
    fn full_match_rejects_trailing_junk_unlike_rfc2812_prefix_parse() {
        // A prefix-match parser (the teacher's RFC 2812 parser) would
        // happily accept "alice" out of this and silently drop "!junk".
        assert!(!is_valid_nickname("alice!junk"));
    }

    #[test]
    fn accepts_valid_channel_names() {
        assert!(is_valid_channel_name("#chan"));
        assert!(is_valid_channel_name("#a"));
    }

    #[test]
    fn rejects_channel_without_hash() {
        assert!(!is_valid_channel_name("chan"));
    }

    #[test]
    fn rejects_channel_with_comma_or_bell_or_space() {
        assert!(!is_valid_channel_name("#a,b"));
        assert!(!is_valid_channel_name("#a\u{0007}b"));
        assert!(!is_valid_channel_name("#a b"));
    }

    #[test]
    fn rejects_channel_over_fifty_chars_total() {
        let too_long = format!("#{}", "a".repeat(50));
        assert!(!is_valid_channel_name(&too_long));
    }

    #[test]
    fn accepts_channel_at_max_length() {
        let max = format!("#{}", "a".repeat(49));
        assert!(is_valid_channel_name(&max));
    }
}
