//! Content fingerprints
//!
//! SHA-256 over the raw bytes. The digest depends on content only: file name,
//! case metadata and timing never enter the hash.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::errors::SetuError;

/// Digest length in bytes
pub const FINGERPRINT_LEN: usize = 32;

/// SHA-256 digest of an evidence file's original bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Wrap raw digest bytes
    pub fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hex, 64 characters
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse 64 hex characters (either case)
    pub fn from_hex(s: &str) -> Result<Self, SetuError> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| SetuError::invalid(format!("invalid fingerprint hex: {e}")))?;
        let bytes: [u8; FINGERPRINT_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            SetuError::invalid(format!(
                "fingerprint must be {FINGERPRINT_LEN} bytes, got {}",
                v.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl FromStr for Fingerprint {
    type Err = SetuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Fingerprint a complete buffer
pub fn fingerprint(data: &[u8]) -> Fingerprint {
    Fingerprint(Sha256::digest(data).into())
}

/// Fingerprint a buffer delivered in pieces
pub fn fingerprint_chunks(chunks: &[&[u8]]) -> Fingerprint {
    let mut hasher = FingerprintHasher::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    hasher.finalize()
}

/// Incremental fingerprinting for streamed input
#[derive(Clone, Default)]
pub struct FingerprintHasher(Sha256);

impl FingerprintHasher {
    /// Start an empty hash
    pub fn new() -> Self {
        Self(Sha256::new())
    }

    /// Feed more bytes
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    /// Finish and return the fingerprint
    pub fn finalize(self) -> Fingerprint {
        Fingerprint(self.0.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_digest() {
        assert_eq!(
            fingerprint(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let data = b"hello world";
        assert_eq!(fingerprint(data), fingerprint(data));
        assert_ne!(fingerprint(data), fingerprint(b"hello world!"));
    }

    #[test]
    fn test_chunks_match_one_shot() {
        let chunks = vec![b"hello".as_slice(), b" ".as_slice(), b"world".as_slice()];
        assert_eq!(fingerprint_chunks(&chunks), fingerprint(b"hello world"));
    }

    #[test]
    fn test_hex_roundtrip_and_rejects() {
        let fp = fingerprint(b"report");
        assert_eq!(Fingerprint::from_hex(&fp.to_hex()).unwrap(), fp);
        assert_eq!(
            Fingerprint::from_hex(&fp.to_hex().to_uppercase()).unwrap(),
            fp
        );
        assert!(Fingerprint::from_hex("abcd").is_err());
        assert!(Fingerprint::from_hex("zz").is_err());
    }

    #[test]
    fn test_serializes_as_hex_string() {
        let fp = fingerprint(b"");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{}\"", fp.to_hex()));
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
    }
}
