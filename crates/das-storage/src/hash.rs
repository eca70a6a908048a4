//! Content digest used to address stored payloads

use std::fmt;

use sha3::{Digest, Keccak256};

/// Length in bytes of a [`DataHash`]
pub const HASH_LEN: usize = 32;

/// Keccak-256 digest of a payload
///
/// Every backend derives write keys from this digest, so the same payload
/// lands under the same key no matter which backend stores it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataHash([u8; HASH_LEN]);

impl DataHash {
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse from a slice, rejecting anything that is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; HASH_LEN] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    /// Parse from lowercase or uppercase hex, with or without a `0x` prefix
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).ok()?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Hash a payload
pub fn keccak256(payload: &[u8]) -> DataHash {
    let mut hasher = Keccak256::new();
    hasher.update(payload);
    DataHash(hasher.finalize().into())
}

impl fmt::Debug for DataHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for DataHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; HASH_LEN]> for DataHash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for DataHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            keccak256(b"").to_hex(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(
            keccak256(b"hello").to_hex(),
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_deterministic() {
        let payload = b"same payload, same digest";
        assert_eq!(keccak256(payload), keccak256(payload));
    }

    #[test]
    fn test_distinct_payloads_distinct_digests() {
        let digests: std::collections::HashSet<DataHash> = (0u32..1000)
            .map(|i| keccak256(&i.to_le_bytes()))
            .collect();
        assert_eq!(digests.len(), 1000);
    }

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        assert!(DataHash::from_slice(&[0u8; 31]).is_none());
        assert!(DataHash::from_slice(&[0u8; 33]).is_none());
        assert!(DataHash::from_slice(&[7u8; 32]).is_some());
    }

    #[test]
    fn test_hex_parsing() {
        let hash = keccak256(b"hex");
        assert_eq!(DataHash::from_hex(&hash.to_hex()), Some(hash));
        assert_eq!(DataHash::from_hex(&format!("0x{hash}")), Some(hash));
        assert!(DataHash::from_hex("not hex").is_none());
    }
}
