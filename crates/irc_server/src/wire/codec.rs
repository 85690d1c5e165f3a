//! Latin-1 decoding, `\r\n`/`\n` line framing, and the space-split line
//! parse of §4.1. None of this reaches for `nom` — the grammar in
//! [`crate::wire::grammar`] is the only place combinators earn their keep;
//! this is closer to the teacher's `decode_utf8` + `.lines()` pass in
//! `bin/irc_server.rs`, generalised to the byte model §4.1 actually asks
//! for (Latin-1, never failing, accepting either line ending).

/// Decodes a byte slice as Latin-1 (ISO 8859-1): each byte maps 1:1 to the
/// Unicode code point of the same value. Unlike UTF-8 decoding this never
/// fails, so arbitrary client bytes (including invalid UTF-8) round-trip.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Encodes a `String` built from [`decode_latin1`] output back to bytes,
/// truncating any code point above `0xFF` (the text pipeline is not
/// expected to introduce any, since replies are built from Latin-1 input
/// plus ASCII literals).
pub fn encode_latin1(s: &str) -> Vec<u8> {
    s.chars().map(|c| c as u32 as u8).collect()
}

/// Accumulates bytes across reads and yields complete lines as they
/// become available, splitting on `\r\n` or a lone `\n` (§4.1: "client's
/// choice; both must be accepted").
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Feeds freshly-read bytes in and drains every complete line now
    /// available, in order. Bytes after the last `\n` remain buffered.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut raw: Vec<u8> = self.buf.drain(..=pos).collect();
            raw.pop(); // trailing \n
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            lines.push(decode_latin1(&raw));
        }
        lines
    }
}

/// One parsed protocol line: an uppercased command verb and its parameter
/// list, with the trailing parameter (if any) already unwrapped from its
/// leading `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub command: String,
    pub params: Vec<String>,
}

/// Parses one already-framed line into `(command, params)` per §4.1:
/// split on ASCII space; the first token whose first character is `:`
/// opens the trailing parameter, which absorbs every remaining token
/// (rejoined with single spaces) with that leading `:` stripped. Returns
/// `None` for an empty line (no command token).
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let cmd_end = line.find(' ').unwrap_or(line.len());
    if cmd_end == 0 {
        return None;
    }
    let command = line[..cmd_end].to_ascii_uppercase();

    let mut remainder = &line[cmd_end..];
    let mut params = Vec::new();
    loop {
        remainder = remainder.trim_start_matches(' ');
        if remainder.is_empty() {
            break;
        }
        if let Some(trailing) = remainder.strip_prefix(':') {
            params.push(trailing.to_owned());
            break;
        }
        let next_space = remainder.find(' ').unwrap_or(remainder.len());
        params.push(remainder[..next_space].to_owned());
        remainder = &remainder[next_space..];
    }

    Some(ParsedLine { command, params })
}
