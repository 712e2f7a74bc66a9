use super::hex::{decode_hex_string, encode_hex_string_with};
use crate::bencode::{BencodeValue, Dictionary};
use crate::config::{BridgeOptions, ShapePolicy};
use crate::error::BridgeError;
use bytes::Bytes;
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::btree_map;
use std::iter::Enumerate;
use std::slice;
use tracing::warn;

/// Converts between bencode values and JSON-safe "friendly" trees.
///
/// Every byte string, whether a dictionary key or a leaf, goes through the
/// hex-escape transcoder. Integers, lists and dictionaries keep their shape.
/// Both directions walk the tree with an explicit stack, so nesting depth is
/// bounded by memory rather than by the call stack.
#[derive(Debug, Clone, Default)]
pub struct Bridge {
    options: BridgeOptions,
}

/// An open container while building a friendly tree
enum FriendlyFrame<'a> {
    List {
        rest: slice::Iter<'a, BencodeValue>,
        done: Vec<JsonValue>,
    },
    Dict {
        rest: btree_map::Iter<'a, Bytes, BencodeValue>,
        done: Map<String, JsonValue>,
        key: String,
    },
}

impl<'a> FriendlyFrame<'a> {
    fn next_child(&mut self, bridge: &Bridge) -> Option<&'a BencodeValue> {
        match self {
            FriendlyFrame::List { rest, .. } => rest.next(),
            FriendlyFrame::Dict { rest, key, .. } => {
                let (raw, value) = rest.next()?;
                *key = bridge.escape(raw);
                Some(value)
            }
        }
    }

    fn accept(&mut self, value: JsonValue) {
        match self {
            FriendlyFrame::List { done, .. } => done.push(value),
            FriendlyFrame::Dict { done, key, .. } => {
                done.insert(std::mem::take(key), value);
            }
        }
    }

    fn finish(self) -> JsonValue {
        match self {
            FriendlyFrame::List { done, .. } => JsonValue::Array(done),
            FriendlyFrame::Dict { done, .. } => JsonValue::Object(done),
        }
    }
}

/// An open container while building a bencode value. `path_len` is the
/// length of the container's own JSON pointer.
enum ValueFrame<'a> {
    Array {
        rest: Enumerate<slice::Iter<'a, JsonValue>>,
        done: Vec<BencodeValue>,
        path_len: usize,
    },
    Object {
        rest: serde_json::map::Iter<'a>,
        done: Dictionary,
        key: Bytes,
        path_len: usize,
    },
}

impl<'a> ValueFrame<'a> {
    /// Point `path` at the next child and return it
    fn next_child(&mut self, path: &mut String) -> Option<&'a JsonValue> {
        match self {
            ValueFrame::Array { rest, path_len, .. } => {
                let (index, item) = rest.next()?;
                path.truncate(*path_len);
                push_segment(path, &index.to_string());
                Some(item)
            }
            ValueFrame::Object {
                rest,
                key,
                path_len,
                ..
            } => {
                let (name, item) = rest.next()?;
                path.truncate(*path_len);
                push_segment(path, name);
                *key = decode_hex_string(name);
                Some(item)
            }
        }
    }

    fn accept(
        &mut self,
        value: BencodeValue,
        path: &str,
        policy: ShapePolicy,
    ) -> Result<(), BridgeError> {
        match self {
            ValueFrame::Array { done, .. } => done.push(value),
            ValueFrame::Object { done, key, .. } => {
                let key = std::mem::take(key);
                if done.contains_key(&key) {
                    match policy {
                        ShapePolicy::Strict => {
                            return Err(BridgeError::DuplicateKey {
                                path: path.to_owned(),
                            })
                        }
                        ShapePolicy::Lenient => {
                            warn!("Key at '{}' collides with an earlier key, replacing it", path)
                        }
                    }
                }
                done.insert(key, value);
            }
        }
        Ok(())
    }

    /// Close the container and restore `path` to point at it
    fn finish(self, path: &mut String) -> BencodeValue {
        match self {
            ValueFrame::Array { done, path_len, .. } => {
                path.truncate(path_len);
                BencodeValue::List(done)
            }
            ValueFrame::Object { done, path_len, .. } => {
                path.truncate(path_len);
                BencodeValue::Dict(done)
            }
        }
    }
}

impl Bridge {
    pub fn new(options: BridgeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    pub fn to_friendly(&self, value: &BencodeValue) -> JsonValue {
        let mut stack: Vec<FriendlyFrame<'_>> = Vec::new();
        let mut finished = self.open_friendly(value, &mut stack);

        loop {
            let Some(frame) = stack.last_mut() else {
                return finished.unwrap_or_default();
            };
            if let Some(json) = finished.take() {
                frame.accept(json);
            }

            match frame.next_child(self) {
                Some(child) => finished = self.open_friendly(child, &mut stack),
                None => finished = stack.pop().map(FriendlyFrame::finish),
            }
        }
    }

    pub fn to_value(&self, tree: &JsonValue) -> Result<BencodeValue, BridgeError> {
        let mut path = String::new();
        let mut stack: Vec<ValueFrame<'_>> = Vec::new();
        let mut finished = self.open_value(tree, &path, &mut stack)?;

        loop {
            let Some(frame) = stack.last_mut() else {
                // Lenient mode has no parent to drop an unsupported root from.
                return finished.ok_or_else(|| BridgeError::UnsupportedShape {
                    path,
                    kind: unsupported_kind(tree),
                });
            };
            if let Some(value) = finished.take() {
                frame.accept(value, &path, self.options.unsupported_shapes)?;
            }

            match frame.next_child(&mut path) {
                Some(child) => finished = self.open_value(child, &path, &mut stack)?,
                None => finished = stack.pop().map(|done| done.finish(&mut path)),
            }
        }
    }

    fn escape(&self, data: &[u8]) -> String {
        encode_hex_string_with(data, self.options.escape_hex_lookalikes).into_owned()
    }

    /// Convert a leaf, or push a frame for a container and return `None`
    fn open_friendly<'a>(
        &self,
        value: &'a BencodeValue,
        stack: &mut Vec<FriendlyFrame<'a>>,
    ) -> Option<JsonValue> {
        match value {
            BencodeValue::Integer(i) => Some(JsonValue::from(*i)),
            BencodeValue::ByteString(s) => Some(JsonValue::String(self.escape(s))),
            BencodeValue::List(items) => {
                stack.push(FriendlyFrame::List {
                    rest: items.iter(),
                    done: Vec::with_capacity(items.len()),
                });
                None
            }
            BencodeValue::Dict(entries) => {
                stack.push(FriendlyFrame::Dict {
                    rest: entries.iter(),
                    done: Map::new(),
                    key: String::new(),
                });
                None
            }
        }
    }

    /// Convert a leaf, or push a frame for a container. `Ok(None)` means a
    /// container was opened or the node was dropped under the lenient policy.
    fn open_value<'a>(
        &self,
        tree: &'a JsonValue,
        path: &str,
        stack: &mut Vec<ValueFrame<'a>>,
    ) -> Result<Option<BencodeValue>, BridgeError> {
        let value = match tree {
            JsonValue::String(s) => BencodeValue::ByteString(decode_hex_string(s)),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => BencodeValue::Integer(i),
                None => return self.unsupported(path, unsupported_kind(tree)),
            },
            JsonValue::Array(items) => {
                stack.push(ValueFrame::Array {
                    rest: items.iter().enumerate(),
                    done: Vec::with_capacity(items.len()),
                    path_len: path.len(),
                });
                return Ok(None);
            }
            JsonValue::Object(map) => {
                stack.push(ValueFrame::Object {
                    rest: map.iter(),
                    done: Dictionary::new(),
                    key: Bytes::new(),
                    path_len: path.len(),
                });
                return Ok(None);
            }
            JsonValue::Bool(_) | JsonValue::Null => {
                return self.unsupported(path, unsupported_kind(tree))
            }
        };

        Ok(Some(value))
    }

    fn unsupported(
        &self,
        path: &str,
        kind: &'static str,
    ) -> Result<Option<BencodeValue>, BridgeError> {
        match self.options.unsupported_shapes {
            ShapePolicy::Strict => Err(BridgeError::UnsupportedShape {
                path: path.to_owned(),
                kind,
            }),
            ShapePolicy::Lenient => {
                warn!("Dropping {} at '{}': bencode cannot represent it", kind, path);
                Ok(None)
            }
        }
    }
}

fn unsupported_kind(tree: &JsonValue) -> &'static str {
    match tree {
        JsonValue::Number(n) => number_kind(n),
        JsonValue::Bool(_) => "boolean",
        JsonValue::Null => "null",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn number_kind(n: &Number) -> &'static str {
    if n.is_f64() {
        "floating-point number"
    } else {
        "integer outside the 64-bit signed range"
    }
}

/// Append one JSON pointer segment (RFC 6901 escaping)
fn push_segment(path: &mut String, segment: &str) {
    path.push('/');
    for c in segment.chars() {
        match c {
            '~' => path.push_str("~0"),
            '/' => path.push_str("~1"),
            c => path.push(c),
        }
    }
}
