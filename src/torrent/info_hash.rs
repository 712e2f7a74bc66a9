use crate::bencode::{encode, BencodeValue};
use crate::error::{Error, Result};
use sha1::{Digest, Sha1};
use sha2::Sha256;
use std::fmt;

/// The `info` dictionary of a decoded torrent
pub fn info_dict(torrent: &BencodeValue) -> Result<&BencodeValue> {
    let info = torrent
        .as_dict()
        .ok_or_else(|| Error::InvalidTorrent("Torrent must be a dict".to_string()))?
        .get(b"info".as_ref())
        .ok_or_else(|| Error::InvalidTorrent("Missing 'info' field".to_string()))?;

    if info.as_dict().is_none() {
        return Err(Error::InvalidTorrent("Info must be a dict".to_string()));
    }
    Ok(info)
}

/// SHA-1 of the canonical encoding of the info dictionary (BEP 3)
pub fn info_hash_v1(torrent: &BencodeValue) -> Result<[u8; 20]> {
    let mut hasher = Sha1::new();
    hasher.update(encode(info_dict(torrent)?));
    let hash = hasher.finalize();

    let mut result = [0u8; 20];
    result.copy_from_slice(&hash);
    Ok(result)
}

/// SHA-256 of the canonical encoding of the info dictionary (BEP 52)
pub fn info_hash_v2(torrent: &BencodeValue) -> Result<[u8; 32]> {
    let mut hasher = Sha256::new();
    hasher.update(encode(info_dict(torrent)?));
    let hash = hasher.finalize();

    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    Ok(result)
}

/// Info hashes of a torrent. `v2` is only computed for torrents that
/// declare `meta version` 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHashes {
    pub v1: [u8; 20],
    pub v2: Option<[u8; 32]>,
}

impl InfoHashes {
    pub fn from_torrent(torrent: &BencodeValue) -> Result<Self> {
        let info = info_dict(torrent)?;
        let v1 = info_hash_v1(torrent)?;
        let v2 = match info.get(b"meta version").and_then(|v| v.as_integer()) {
            Some(2) => Some(info_hash_v2(torrent)?),
            _ => None,
        };
        Ok(Self { v1, v2 })
    }

    pub fn v1_hex(&self) -> String {
        hex::encode(self.v1)
    }

    pub fn v2_hex(&self) -> Option<String> {
        self.v2.map(hex::encode)
    }
}

impl fmt::Display for InfoHashes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v1: {}", self.v1_hex())?;
        if let Some(v2) = self.v2_hex() {
            write!(f, "\nv2: {}", v2)?;
        }
        Ok(())
    }
}
