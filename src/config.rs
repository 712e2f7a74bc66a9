use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// Default bound on container nesting accepted by the decoder.
pub const DEFAULT_MAX_DEPTH: usize = 2048;

/// Decoder settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Maximum number of nested lists/dictionaries
    pub max_depth: usize,
    /// Reject dictionaries whose keys are not in strictly ascending order
    pub require_sorted_keys: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            require_sorted_keys: false,
        }
    }
}

/// What the bridge does with JSON values bencode cannot represent
/// (floats, booleans, null, integers outside `i64`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapePolicy {
    /// Fail with `BridgeError::UnsupportedShape`
    #[default]
    Strict,
    /// Drop the value from its parent container and log a warning
    Lenient,
}

/// Friendly-object bridge settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeOptions {
    pub unsupported_shapes: ShapePolicy,
    /// Hex-escape UTF-8 text that would otherwise be read back as a hex literal
    pub escape_hex_lookalikes: bool,
}

/// Combined codec configuration, loadable from a JSON file.
///
/// Every field is optional in the file:
///
/// ```json
/// { "decoder": { "max_depth": 512 }, "bridge": { "unsupported_shapes": "lenient" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub decoder: DecoderConfig,
    pub bridge: BridgeOptions,
}

impl CodecConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_json(&text)
    }
}
