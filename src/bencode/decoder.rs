use super::value::{BencodeValue, Dictionary};
use crate::config::DecoderConfig;
use crate::error::{DecodeError, DecodeResult};
use bytes::Bytes;
use tracing::debug;

/// Decode a single complete bencoded document with the default settings
pub fn decode(data: &[u8]) -> DecodeResult<BencodeValue> {
    Decoder::default().decode(data)
}

/// Like [`decode`], but byte strings in the result share `data`'s buffer
pub fn decode_bytes(data: Bytes) -> DecodeResult<BencodeValue> {
    Decoder::default().decode_bytes(data)
}

/// Decode the first value in `data` and report how many bytes it used.
/// Anything after the value is left alone.
pub fn decode_prefix(data: &[u8]) -> DecodeResult<(BencodeValue, usize)> {
    Decoder::default().decode_prefix(data)
}

/// An open container on the decode stack
enum Frame {
    List {
        start: usize,
        items: Vec<BencodeValue>,
    },
    Dict {
        start: usize,
        entries: Dictionary,
        pending_key: Option<Bytes>,
    },
}

impl Frame {
    fn awaiting_key(&self) -> bool {
        match self {
            Frame::List { .. } => true,
            Frame::Dict { pending_key, .. } => pending_key.is_none(),
        }
    }

    fn unterminated(&self) -> DecodeError {
        match self {
            Frame::List { start, .. } => DecodeError::UnterminatedList { offset: *start },
            Frame::Dict { start, .. } => DecodeError::UnterminatedDictionary { offset: *start },
        }
    }

    fn into_value(self) -> BencodeValue {
        match self {
            Frame::List { items, .. } => BencodeValue::List(items),
            Frame::Dict { entries, .. } => BencodeValue::Dict(entries),
        }
    }
}

/// Bencode decoder.
///
/// Nested containers are tracked on an explicit stack, so the nesting limit
/// is independent of the thread's call stack size.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode exactly one value; trailing bytes are an error.
    pub fn decode(&self, data: &[u8]) -> DecodeResult<BencodeValue> {
        self.decode_bytes(Bytes::copy_from_slice(data))
    }

    pub fn decode_bytes(&self, data: Bytes) -> DecodeResult<BencodeValue> {
        let (value, consumed) = self.decode_prefix_bytes(&data)?;
        if consumed != data.len() {
            return Err(DecodeError::TrailingData { offset: consumed });
        }

        debug!("Decoded {} byte bencode document ({})", consumed, value.kind());
        Ok(value)
    }

    pub fn decode_prefix(&self, data: &[u8]) -> DecodeResult<(BencodeValue, usize)> {
        self.decode_prefix_bytes(&Bytes::copy_from_slice(data))
    }

    pub fn decode_prefix_bytes(&self, data: &Bytes) -> DecodeResult<(BencodeValue, usize)> {
        let mut pos = 0;
        let mut stack: Vec<Frame> = Vec::new();

        'tokens: loop {
            let completed = 'value: {
                if let Some(frame) = stack.last_mut() {
                    let Some(&byte) = data.get(pos) else {
                        return Err(frame.unterminated());
                    };

                    if byte == b'e' && frame.awaiting_key() {
                        pos += 1;
                        if let Some(done) = stack.pop() {
                            break 'value done.into_value();
                        }
                    } else if let Frame::Dict {
                        entries,
                        pending_key: pending_key @ None,
                        ..
                    } = frame
                    {
                        if !byte.is_ascii_digit() {
                            return Err(DecodeError::NonStringKey { offset: pos });
                        }

                        let key_start = pos;
                        let (key, next) = parse_byte_string(data, pos)?;
                        if entries.contains_key(&key) {
                            return Err(DecodeError::DuplicateKey { offset: key_start });
                        }
                        if self.config.require_sorted_keys {
                            if let Some((last, _)) = entries.last_key_value() {
                                if key < *last {
                                    return Err(DecodeError::UnsortedKey { offset: key_start });
                                }
                            }
                        }

                        *pending_key = Some(key);
                        pos = next;
                        continue 'tokens;
                    }
                }

                let Some(&byte) = data.get(pos) else {
                    return Err(DecodeError::UnexpectedEnd { offset: pos });
                };

                match byte {
                    b'i' => {
                        let (value, next) = parse_integer(data, pos)?;
                        pos = next;
                        BencodeValue::Integer(value)
                    }
                    b'0'..=b'9' => {
                        let (value, next) = parse_byte_string(data, pos)?;
                        pos = next;
                        BencodeValue::ByteString(value)
                    }
                    b'l' | b'd' => {
                        if stack.len() >= self.config.max_depth {
                            return Err(DecodeError::NestingTooDeep {
                                limit: self.config.max_depth,
                                offset: pos,
                            });
                        }

                        let start = pos;
                        stack.push(if byte == b'l' {
                            Frame::List {
                                start,
                                items: Vec::new(),
                            }
                        } else {
                            Frame::Dict {
                                start,
                                entries: Dictionary::new(),
                                pending_key: None,
                            }
                        });
                        pos += 1;
                        continue 'tokens;
                    }
                    _ => return Err(DecodeError::UnexpectedToken { byte, offset: pos }),
                }
            };

            match stack.last_mut() {
                None => return Ok((completed, pos)),
                Some(Frame::List { items, .. }) => items.push(completed),
                Some(Frame::Dict {
                    entries,
                    pending_key,
                    ..
                }) => {
                    if let Some(key) = pending_key.take() {
                        entries.insert(key, completed);
                    }
                }
            }
        }
    }
}

/// Parse `i<digits>e` starting at the `i`. Returns the value and the offset
/// just past the `e`.
fn parse_integer(data: &[u8], start: usize) -> DecodeResult<(i64, usize)> {
    let malformed = |reason| DecodeError::MalformedInteger {
        offset: start,
        reason,
    };

    let body_start = start + 1;
    let body_end = body_start
        + data[body_start..]
            .iter()
            .take_while(|b| b.is_ascii_digit() || **b == b'-')
            .count();

    match data.get(body_end) {
        Some(b'e') => {}
        Some(_) => return Err(malformed("unexpected character")),
        None => return Err(malformed("missing terminator")),
    }

    let body = &data[body_start..body_end];
    let digits = body.strip_prefix(b"-").unwrap_or(body);

    if digits.is_empty() {
        return Err(malformed("no digits"));
    }
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(malformed("misplaced sign"));
    }
    if digits[0] == b'0' && digits.len() > 1 {
        return Err(malformed("leading zero"));
    }
    if body == b"-0" {
        return Err(malformed("negative zero"));
    }

    let value = std::str::from_utf8(body)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| malformed("out of range"))?;

    Ok((value, body_end + 1))
}

/// Parse `<len>:<bytes>` starting at the first length digit. The returned
/// bytes are a slice of `data`, not a copy.
fn parse_byte_string(data: &Bytes, start: usize) -> DecodeResult<(Bytes, usize)> {
    let digits = data[start..].iter().take_while(|b| b.is_ascii_digit()).count();
    let colon = start + digits;

    if digits == 0 || data.get(colon) != Some(&b':') {
        return Err(DecodeError::MalformedLength { offset: start });
    }
    if digits > 1 && data[start] == b'0' {
        return Err(DecodeError::MalformedLength { offset: start });
    }

    let len = std::str::from_utf8(&data[start..colon])
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or(DecodeError::MalformedLength { offset: start })?;

    let body = colon + 1;
    let available = data.len() - body;
    if len > available {
        return Err(DecodeError::TruncatedByteString {
            offset: start,
            declared: len,
            available,
        });
    }

    Ok((data.slice(body..body + len), body + len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_lists(depth: usize) -> Vec<u8> {
        let mut data = vec![b'l'; depth];
        data.extend(std::iter::repeat(b'e').take(depth));
        data
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode(b"4:spam").unwrap(), BencodeValue::from("spam"));
        assert_eq!(decode(b"i-42e").unwrap(), BencodeValue::Integer(-42));
        assert_eq!(decode(b"i0e").unwrap(), BencodeValue::Integer(0));
        assert_eq!(decode(b"0:").unwrap(), BencodeValue::bytes(b""));
        assert_eq!(
            decode(b"i9223372036854775807e").unwrap(),
            BencodeValue::Integer(i64::MAX)
        );
        assert_eq!(
            decode(b"i-9223372036854775808e").unwrap(),
            BencodeValue::Integer(i64::MIN)
        );
    }

    #[test]
    fn test_decode_list() {
        assert_eq!(
            decode(b"l4:spam4:eggse").unwrap(),
            BencodeValue::List(vec!["spam".into(), "eggs".into()])
        );
        assert_eq!(decode(b"le").unwrap(), BencodeValue::List(vec![]));
    }

    #[test]
    fn test_decode_dict() {
        let expected = BencodeValue::dict([
            ("cow", BencodeValue::from("moo")),
            ("spam", BencodeValue::from("eggs")),
        ]);
        assert_eq!(decode(b"d3:cow3:moo4:spam4:eggse").unwrap(), expected);
        assert_eq!(decode(b"de").unwrap(), BencodeValue::dict::<&str, _>([]));
    }

    #[test]
    fn test_decode_binary_and_empty_keys() {
        let value = decode(b"d0:i1e2:\xff\x00i2e11:pieces rooti3ee").unwrap();
        let dict = value.as_dict().unwrap();
        assert_eq!(dict.len(), 3);
        assert_eq!(value.get(b""), Some(&BencodeValue::Integer(1)));
        assert_eq!(value.get(b"\xff\x00"), Some(&BencodeValue::Integer(2)));
        assert_eq!(value.get(b"pieces root"), Some(&BencodeValue::Integer(3)));
    }

    #[test]
    fn test_decode_unsorted_keys_by_default() {
        let value = decode(b"d4:spam4:eggs3:cow3:mooe").unwrap();
        assert_eq!(value.as_dict().unwrap().len(), 2);
    }

    #[test]
    fn test_strict_key_order() {
        let decoder = Decoder::new(DecoderConfig {
            require_sorted_keys: true,
            ..DecoderConfig::default()
        });
        assert!(decoder.decode(b"d3:cow3:moo4:spam4:eggse").is_ok());
        assert_eq!(
            decoder.decode(b"d4:spam4:eggs3:cow3:mooe"),
            Err(DecodeError::UnsortedKey { offset: 13 })
        );
    }

    #[test]
    fn test_malformed_integers() {
        let inputs: [&[u8]; 8] = [b"i05e", b"i-0e", b"ie", b"i-e", b"i1-2e", b"i--1e", b"i12", b"i1xe"];
        for input in inputs {
            assert!(
                matches!(decode(input), Err(DecodeError::MalformedInteger { offset: 0, .. })),
                "{:?}",
                String::from_utf8_lossy(input)
            );
        }
        assert!(matches!(
            decode(b"i9223372036854775808e"),
            Err(DecodeError::MalformedInteger { reason: "out of range", .. })
        ));
    }

    #[test]
    fn test_malformed_lengths() {
        assert_eq!(decode(b"03:abc"), Err(DecodeError::MalformedLength { offset: 0 }));
        assert_eq!(decode(b"3abc"), Err(DecodeError::MalformedLength { offset: 0 }));
        assert_eq!(decode(b"3"), Err(DecodeError::MalformedLength { offset: 0 }));
        assert_eq!(
            decode(b"99999999999999999999999:x"),
            Err(DecodeError::MalformedLength { offset: 0 })
        );
    }

    #[test]
    fn test_truncated_byte_string() {
        assert_eq!(
            decode(b"5:abc"),
            Err(DecodeError::TruncatedByteString {
                offset: 0,
                declared: 5,
                available: 3
            })
        );
        assert!(matches!(
            decode(b"l4:spam9:eggse"),
            Err(DecodeError::TruncatedByteString { offset: 7, .. })
        ));
    }

    #[test]
    fn test_unterminated_containers() {
        assert_eq!(
            decode(b"d3:foo3:bar"),
            Err(DecodeError::UnterminatedDictionary { offset: 0 })
        );
        assert_eq!(decode(b"l4:spam"), Err(DecodeError::UnterminatedList { offset: 0 }));
        assert_eq!(decode(b"li1el"), Err(DecodeError::UnterminatedList { offset: 4 }));
        assert_eq!(decode(b"d3:foo"), Err(DecodeError::UnterminatedDictionary { offset: 0 }));
    }

    #[test]
    fn test_dict_key_errors() {
        assert_eq!(decode(b"di42e4:spame"), Err(DecodeError::NonStringKey { offset: 1 }));
        assert_eq!(decode(b"dle"), Err(DecodeError::NonStringKey { offset: 1 }));
        assert_eq!(
            decode(b"d3:foo3:bar3:fooi1ee"),
            Err(DecodeError::DuplicateKey { offset: 11 })
        );
        assert_eq!(
            decode(b"d3:fooe"),
            Err(DecodeError::UnexpectedToken { byte: b'e', offset: 6 })
        );
    }

    #[test]
    fn test_unexpected_tokens() {
        assert_eq!(decode(b"x"), Err(DecodeError::UnexpectedToken { byte: b'x', offset: 0 }));
        assert_eq!(decode(b"e"), Err(DecodeError::UnexpectedToken { byte: b'e', offset: 0 }));
        assert_eq!(
            decode(b"li1e-e"),
            Err(DecodeError::UnexpectedToken { byte: b'-', offset: 4 })
        );
        assert_eq!(decode(b""), Err(DecodeError::UnexpectedEnd { offset: 0 }));
    }

    #[test]
    fn test_trailing_data() {
        assert_eq!(decode(b"i42eextra"), Err(DecodeError::TrailingData { offset: 4 }));
        assert_eq!(decode(b"4:spam4:eggs"), Err(DecodeError::TrailingData { offset: 6 }));
    }

    #[test]
    fn test_decode_prefix_reports_consumed() {
        let (value, consumed) = decode_prefix(b"l4:spame4:eggs").unwrap();
        assert_eq!(value, BencodeValue::List(vec!["spam".into()]));
        assert_eq!(consumed, 8);
    }

    #[test]
    fn test_nesting_limit() {
        let decoder = Decoder::new(DecoderConfig {
            max_depth: 3,
            ..DecoderConfig::default()
        });
        assert!(decoder.decode(&nested_lists(3)).is_ok());
        assert_eq!(
            decoder.decode(&nested_lists(4)),
            Err(DecodeError::NestingTooDeep { limit: 3, offset: 3 })
        );
        assert_eq!(
            decoder.decode(b"d1:ad1:bd1:cd1:di1eeeee"),
            Err(DecodeError::NestingTooDeep { limit: 3, offset: 12 })
        );
    }

    #[test]
    fn test_default_depth_is_generous() {
        let value = decode(&nested_lists(1000)).unwrap();
        assert!(value.as_list().is_some());
        assert!(matches!(
            decode(&nested_lists(crate::config::DEFAULT_MAX_DEPTH + 1)),
            Err(DecodeError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn test_byte_strings_share_input_buffer() {
        let data = Bytes::from_static(b"l3:abc3:defe");
        let value = decode_bytes(data.clone()).unwrap();
        let first = value.as_list().unwrap()[0].as_bytes().unwrap();
        assert_eq!(first.as_ptr(), data[3..].as_ptr());
    }

    #[test]
    fn test_error_offsets() {
        let err = decode(b"l4:spami05ee").unwrap_err();
        assert_eq!(err.offset(), 7);
    }
}
