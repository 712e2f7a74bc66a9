use super::value::BencodeValue;
use bytes::Bytes;

/// Pending output while walking a value tree
enum Step<'a> {
    Value(&'a BencodeValue),
    Key(&'a Bytes),
    End,
}

/// Encode a BencodeValue into its canonical byte representation.
///
/// Dictionary entries are always written in ascending raw-key order, so
/// equal values produce identical bytes no matter how they were built.
pub fn encode(value: &BencodeValue) -> Vec<u8> {
    let mut result = Vec::with_capacity(byte_length(value));
    encode_into(value, &mut result);
    result
}

/// Append the encoding of `value` to `output`
pub fn encode_into(value: &BencodeValue, output: &mut Vec<u8>) {
    let mut pending = vec![Step::Value(value)];

    while let Some(step) = pending.pop() {
        match step {
            Step::End => output.push(b'e'),
            Step::Key(key) => write_byte_string(key, output),
            Step::Value(BencodeValue::Integer(i)) => {
                output.push(b'i');
                output.extend_from_slice(i.to_string().as_bytes());
                output.push(b'e');
            }
            Step::Value(BencodeValue::ByteString(s)) => write_byte_string(s, output),
            Step::Value(BencodeValue::List(list)) => {
                output.push(b'l');
                pending.push(Step::End);
                pending.extend(list.iter().rev().map(Step::Value));
            }
            Step::Value(BencodeValue::Dict(dict)) => {
                output.push(b'd');
                pending.push(Step::End);
                for (key, value) in dict.iter().rev() {
                    pending.push(Step::Value(value));
                    pending.push(Step::Key(key));
                }
            }
        }
    }
}

/// Number of bytes `encode(value)` produces, computed without encoding
pub fn byte_length(value: &BencodeValue) -> usize {
    let mut total = 0;
    let mut pending = vec![value];

    while let Some(value) = pending.pop() {
        match value {
            BencodeValue::Integer(i) => total += integer_len(*i) + 2,
            BencodeValue::ByteString(s) => total += byte_string_len(s.len()),
            BencodeValue::List(list) => {
                total += 2;
                pending.extend(list.iter());
            }
            BencodeValue::Dict(dict) => {
                total += 2;
                for (key, value) in dict {
                    total += byte_string_len(key.len());
                    pending.push(value);
                }
            }
        }
    }

    total
}

fn write_byte_string(data: &[u8], output: &mut Vec<u8>) {
    output.extend_from_slice(data.len().to_string().as_bytes());
    output.push(b':');
    output.extend_from_slice(data);
}

fn decimal_len(mut n: u64) -> usize {
    let mut len = 1;
    while n >= 10 {
        n /= 10;
        len += 1;
    }
    len
}

fn integer_len(i: i64) -> usize {
    decimal_len(i.unsigned_abs()) + usize::from(i < 0)
}

fn byte_string_len(len: usize) -> usize {
    decimal_len(len as u64) + 1 + len
}
