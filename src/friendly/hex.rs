//! Reversible text form for arbitrary byte strings.
//!
//! Bytes that are valid UTF-8 are shown as that text. Anything else becomes
//! an uppercase hex dump such as `<hex>0A 0B 0C</hex>`, which survives a
//! trip through JSON and decodes back to the exact bytes.

use bytes::Bytes;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

pub const HEX_PREFIX: &str = "<hex>";
pub const HEX_SUFFIX: &str = "</hex>";

static HEX_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^<hex>([0-9a-f ]+)</hex>$").expect("hex literal pattern is valid")
});

/// Render `data` as text if it is valid UTF-8, otherwise as a hex literal.
pub fn encode_hex_string(data: &[u8]) -> Cow<'_, str> {
    encode_hex_string_with(data, false)
}

/// Like [`encode_hex_string`]. With `escape_lookalikes`, UTF-8 text that
/// would itself parse as a hex literal is hex-escaped too, so that it reads
/// back as the same bytes.
pub fn encode_hex_string_with(data: &[u8], escape_lookalikes: bool) -> Cow<'_, str> {
    match std::str::from_utf8(data) {
        Ok(text) if !(escape_lookalikes && looks_like_hex_literal(text)) => Cow::Borrowed(text),
        _ => Cow::Owned(hex_literal(data)),
    }
}

/// Inverse of [`encode_hex_string`]. Never fails: text that is not a
/// well-formed hex literal is taken as its UTF-8 bytes.
pub fn decode_hex_string(text: &str) -> Bytes {
    match parse_hex_literal(text) {
        Some(data) => Bytes::from(data),
        None => Bytes::copy_from_slice(text.as_bytes()),
    }
}

/// Whether `text` would be decoded as binary rather than taken literally
pub fn looks_like_hex_literal(text: &str) -> bool {
    parse_hex_literal(text).is_some()
}

/// `<hex>` + space separated uppercase byte pairs + `</hex>`
pub fn hex_literal(data: &[u8]) -> String {
    let digits = hex::encode_upper(data);
    let mut out =
        String::with_capacity(HEX_PREFIX.len() + data.len() * 3 + HEX_SUFFIX.len());

    out.push_str(HEX_PREFIX);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && i % 2 == 0 {
            out.push(' ');
        }
        out.push(digit);
    }
    out.push_str(HEX_SUFFIX);
    out
}

fn parse_hex_literal(text: &str) -> Option<Vec<u8>> {
    let body = HEX_LITERAL.captures(text)?.get(1)?.as_str();
    let digits: String = body.chars().filter(|c| *c != ' ').collect();
    if digits.is_empty() {
        return None;
    }
    hex::decode(digits).ok()
}
