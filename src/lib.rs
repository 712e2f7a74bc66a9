//! Bencode codec with a JSON-friendly view of torrent metainfo.
//!
//! Byte strings that are valid UTF-8 appear as plain JSON strings, anything
//! else as `<hex>..</hex>` literals, so a `.torrent` file can be edited as
//! JSON and encoded back to the same bytes.

pub mod bencode;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod friendly;
pub mod torrent;

pub use bencode::{
    byte_length, decode, decode_bytes, decode_prefix, encode, encode_into, BencodeValue, Decoder,
    Dictionary,
};
pub use codec::{decode_to_friendly_object, encode_friendly_object, Codec};
pub use config::{BridgeOptions, CodecConfig, DecoderConfig, ShapePolicy, DEFAULT_MAX_DEPTH};
pub use error::{BridgeError, DecodeError, Error, Result};
pub use friendly::{decode_hex_string, encode_hex_string, Bridge};
pub use torrent::{info_hash_v1, info_hash_v2, InfoHashes};
