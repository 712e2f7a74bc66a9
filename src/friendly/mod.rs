mod bridge;
pub mod hex;

pub use bridge::Bridge;
pub use self::hex::{decode_hex_string, encode_hex_string, encode_hex_string_with, looks_like_hex_literal};
