//! Key codec: raw digests to object-store key names

use data_encoding::BASE32;

/// Number of leading bytes kept when a key or payload is shown in logs/errors
const PRETTY_PREFIX_LEN: usize = 8;

/// Encode a digest as an object key
///
/// RFC 4648 base32 (standard alphabet, `=` padded). The output only uses
/// `A-Z`, `2-7` and `=`, which every object-store namespace accepts.
pub fn encode_key(digest: &[u8]) -> String {
    BASE32.encode(digest)
}

/// Short hex view of a key or payload, truncated after a few bytes
pub fn first_few_bytes(bytes: &[u8]) -> String {
    if bytes.len() <= PRETTY_PREFIX_LEN {
        hex::encode(bytes)
    } else {
        format!("{}...", hex::encode(&bytes[..PRETTY_PREFIX_LEN]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::keccak256;

    #[test]
    fn test_rfc4648_vectors() {
        assert_eq!(encode_key(b""), "");
        assert_eq!(encode_key(b"f"), "MY======");
        assert_eq!(encode_key(b"fo"), "MZXQ====");
        assert_eq!(encode_key(b"foobar"), "MZXW6YTBOI======");
    }

    #[test]
    fn test_digest_key_shape() {
        let key = encode_key(keccak256(b"hello").as_bytes());
        // 32 bytes -> 52 symbols + 4 padding
        assert_eq!(key.len(), 56);
        assert!(key.ends_with("===="));
        assert!(
            key.chars()
                .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c) || c == '=')
        );
    }

    #[test]
    fn test_injective_over_digests() {
        let keys: std::collections::HashSet<String> = (0u32..500)
            .map(|i| encode_key(keccak256(&i.to_be_bytes()).as_bytes()))
            .collect();
        assert_eq!(keys.len(), 500);
    }

    #[test]
    fn test_first_few_bytes_truncates() {
        assert_eq!(first_few_bytes(&[0xab, 0xcd]), "abcd");
        assert_eq!(first_few_bytes(&[1u8; 8]), "0101010101010101");
        assert_eq!(first_few_bytes(&[0xffu8; 64]), "ffffffffffffffff...");
    }
}
