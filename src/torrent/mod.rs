mod info_hash;

pub use info_hash::{info_dict, info_hash_v1, info_hash_v2, InfoHashes};

use crate::bencode::{BencodeValue, Decoder};
use crate::error::Result;
use bytes::Bytes;
use std::path::Path;
use tokio::fs;

/// Load and decode a .torrent (or any bencoded) file
pub async fn load_torrent_file<P: AsRef<Path>>(path: P, decoder: &Decoder) -> Result<BencodeValue> {
    let data = fs::read(path).await?;
    parse_torrent(Bytes::from(data), decoder)
}

/// Decode torrent data; byte strings in the result share `data`'s buffer
pub fn parse_torrent(data: Bytes, decoder: &Decoder) -> Result<BencodeValue> {
    Ok(decoder.decode_bytes(data)?)
}
