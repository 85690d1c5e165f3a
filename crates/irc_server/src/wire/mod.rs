//! Byte framing, line parsing, and the token grammar for nicknames and
//! channel names (§4.1). Split the way the teacher splits `parsers.rs`
//! from the rest of the protocol: grammar lives in [`grammar`], framing
//! and the simple `(command, params)` line parse live in [`codec`].

pub mod codec;
pub mod grammar;

pub use codec::{decode_latin1, encode_latin1, parse_line, LineBuffer, ParsedLine};
pub use grammar::{is_valid_channel_name, is_valid_nickname};
