//! Fingerprinting and sealing primitives

/// SHA-256 content fingerprints
pub mod hash;
/// AES-256-GCM sealing for the local vault
pub mod vault;

pub use hash::{fingerprint, fingerprint_chunks, Fingerprint, FingerprintHasher, FINGERPRINT_LEN};
pub use vault::{CipherVault, VaultKey, KEY_LEN, NONCE_LEN, TAG_LEN};
