mod decoder;
mod encoder;
mod value;

pub use decoder::{decode, decode_bytes, decode_prefix, Decoder};
pub use encoder::{byte_length, encode, encode_into};
pub use value::{BencodeValue, Dictionary};

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, RngCore};

    #[test]
    fn test_integer_encoding() {
        let value = BencodeValue::Integer(42);
        let encoded = encode(&value);
        assert_eq!(encoded, b"i42e");
    }

    #[test]
    fn test_string_encoding() {
        let value = BencodeValue::from("spam");
        let encoded = encode(&value);
        assert_eq!(encoded, b"4:spam");
    }

    #[test]
    fn test_list_encoding() {
        let value = BencodeValue::List(vec![BencodeValue::from("spam"), BencodeValue::Integer(42)]);
        let encoded = encode(&value);
        assert_eq!(encoded, b"l4:spami42ee");
    }

    #[test]
    fn test_dict_encoding() {
        let value = BencodeValue::dict([
            ("foo", BencodeValue::Integer(42)),
            ("bar", BencodeValue::from("spam")),
        ]);
        let encoded = encode(&value);
        assert_eq!(encoded, b"d3:bar4:spam3:fooi42ee");
    }

    #[test]
    fn test_canonical_regardless_of_insertion_order() {
        let pairs = [
            (&b"piece length"[..], BencodeValue::Integer(16384)),
            (&b"name"[..], BencodeValue::from("a.txt")),
            (&b""[..], BencodeValue::bytes([0xdeu8, 0xad])),
            (&b"\x80binary"[..], BencodeValue::List(vec![])),
        ];
        let forward = BencodeValue::dict(pairs.clone());
        let backward = BencodeValue::dict(pairs.into_iter().rev());
        assert_eq!(encode(&forward), encode(&backward));
        assert_eq!(
            encode(&forward),
            b"d0:2:\xde\xad4:name5:a.txt12:piece lengthi16384e7:\x80binarylee".to_vec()
        );
    }

    #[test]
    fn test_roundtrip() {
        let original = BencodeValue::List(vec![
            BencodeValue::Integer(123),
            BencodeValue::from("test"),
            BencodeValue::dict([("k", BencodeValue::List(vec![BencodeValue::Integer(-1)]))]),
        ]);
        let encoded = encode(&original);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_canonical_input_reencodes_byte_exact() {
        let original = b"d8:announce15:http://test.com4:infod6:lengthi5e4:name4:test12:piece lengthi16384eee";
        let decoded = decode(original).unwrap();
        assert_eq!(encode(&decoded), original.to_vec());
    }

    #[test]
    fn test_unsorted_input_is_canonicalized() {
        let decoded = decode(b"d4:spam4:eggs3:cow3:mooe").unwrap();
        assert_eq!(encode(&decoded), b"d3:cow3:moo4:spam4:eggse");
    }

    #[test]
    fn test_random_binary_roundtrip() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let mut entries = Dictionary::new();
            for _ in 0..rng.gen_range(0..8) {
                let mut key = vec![0u8; rng.gen_range(0..40)];
                rng.fill_bytes(&mut key);
                let mut data = vec![0u8; rng.gen_range(0..64)];
                rng.fill_bytes(&mut data);
                let value = if rng.gen_bool(0.5) {
                    BencodeValue::from(data)
                } else {
                    BencodeValue::Integer(rng.gen())
                };
                entries.insert(key.into(), value);
            }
            let value = BencodeValue::List(vec![BencodeValue::Dict(entries)]);
            assert_eq!(decode(&encode(&value)).unwrap(), value);
        }
    }
}
