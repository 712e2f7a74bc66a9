use crate::bencode::{encode, BencodeValue, Decoder};
use crate::config::CodecConfig;
use crate::error::Result;
use crate::friendly::Bridge;
use bytes::Bytes;
use serde_json::Value as JsonValue;
use tracing::debug;

/// Bencode friendly JSON tree with the default settings
pub fn encode_friendly_object(tree: &JsonValue) -> Result<Vec<u8>> {
    Codec::default().encode_friendly_object(tree)
}

/// Decode bencoded bytes into a friendly JSON tree with the default settings
pub fn decode_to_friendly_object(data: &[u8]) -> Result<JsonValue> {
    Codec::default().decode_to_friendly_object(data)
}

/// Decoder and bridge configured together.
///
/// This is what the command-line layer talks to: the decoder and encoder
/// never see JSON, and the bridge never sees raw bencode.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    decoder: Decoder,
    bridge: Bridge,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            decoder: Decoder::new(config.decoder),
            bridge: Bridge::new(config.bridge),
        }
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn encode_friendly_object(&self, tree: &JsonValue) -> Result<Vec<u8>> {
        let value = self.bridge.to_value(tree)?;
        let encoded = encode(&value);
        debug!("Encoded friendly object into {} bytes", encoded.len());
        Ok(encoded)
    }

    pub fn decode_to_friendly_object(&self, data: &[u8]) -> Result<JsonValue> {
        self.decode_bytes_to_friendly_object(Bytes::copy_from_slice(data))
    }

    /// Same as [`Codec::decode_to_friendly_object`] without copying `data`
    pub fn decode_bytes_to_friendly_object(&self, data: Bytes) -> Result<JsonValue> {
        let value = self.decoder.decode_bytes(data)?;
        Ok(self.bridge.to_friendly(&value))
    }

    pub fn decode(&self, data: Bytes) -> Result<BencodeValue> {
        Ok(self.decoder.decode_bytes(data)?)
    }
}
