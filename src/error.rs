use thiserror::Error;

/// Errors raised while decoding bencoded bytes.
///
/// Every variant records the byte offset at which the problem was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed integer at offset {offset}: {reason}")]
    MalformedInteger { offset: usize, reason: &'static str },

    #[error("malformed byte string length at offset {offset}")]
    MalformedLength { offset: usize },

    #[error("byte string at offset {offset} declares {declared} bytes but only {available} remain")]
    TruncatedByteString {
        offset: usize,
        declared: usize,
        available: usize,
    },

    #[error("unexpected token {byte:#04x} at offset {offset}")]
    UnexpectedToken { byte: u8, offset: usize },

    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEnd { offset: usize },

    #[error("list starting at offset {offset} is not terminated")]
    UnterminatedList { offset: usize },

    #[error("dictionary starting at offset {offset} is not terminated")]
    UnterminatedDictionary { offset: usize },

    #[error("dictionary key at offset {offset} is not a byte string")]
    NonStringKey { offset: usize },

    #[error("duplicate dictionary key at offset {offset}")]
    DuplicateKey { offset: usize },

    #[error("dictionary key at offset {offset} is out of order")]
    UnsortedKey { offset: usize },

    #[error("nesting deeper than {limit} levels at offset {offset}")]
    NestingTooDeep { limit: usize, offset: usize },

    #[error("trailing data after value at offset {offset}")]
    TrailingData { offset: usize },
}

impl DecodeError {
    /// Byte offset into the input where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            DecodeError::MalformedInteger { offset, .. }
            | DecodeError::MalformedLength { offset }
            | DecodeError::TruncatedByteString { offset, .. }
            | DecodeError::UnexpectedToken { offset, .. }
            | DecodeError::UnexpectedEnd { offset }
            | DecodeError::UnterminatedList { offset }
            | DecodeError::UnterminatedDictionary { offset }
            | DecodeError::NonStringKey { offset }
            | DecodeError::DuplicateKey { offset }
            | DecodeError::UnsortedKey { offset }
            | DecodeError::NestingTooDeep { offset, .. }
            | DecodeError::TrailingData { offset } => *offset,
        }
    }
}

/// Errors raised while converting a friendly JSON tree into bencode values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("unsupported {kind} at '{path}'")]
    UnsupportedShape { path: String, kind: &'static str },

    #[error("object key at '{path}' collides with another key after hex decoding")]
    DuplicateKey { path: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Bencode decoding error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Friendly object error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Invalid torrent file: {0}")]
    InvalidTorrent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
