use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::TypeError;

/// Length in bytes of every object hash.
pub const HASH_LEN: usize = 32;

/// Content address of a stored object.
///
/// An `ObjectHash` is the SHA-256 digest of an object's content. Identical
/// content always produces the same hash, making objects deduplicatable and
/// verifiable. On the wire a hash is always exactly 32 raw bytes; on disk and
/// in manifests it appears as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHash([u8; HASH_LEN]);

impl ObjectHash {
    /// Hash raw bytes.
    pub fn of(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        Self(digest.into())
    }

    /// Wrap a pre-computed 32-byte digest.
    pub const fn from_digest(digest: [u8; HASH_LEN]) -> Self {
        Self(digest)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Lowercase hex representation (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters), for log output.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string. Rejects anything that is not exactly a
    /// 64-character hex encoding of 32 bytes.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Construct from a byte slice, rejecting wrong lengths.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() != HASH_LEN {
            return Err(TypeError::InvalidLength {
                expected: HASH_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; HASH_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHash({})", self.short_hex())
    }
}

impl fmt::Display for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; HASH_LEN]> for ObjectHash {
    fn from(digest: [u8; HASH_LEN]) -> Self {
        Self(digest)
    }
}

impl From<ObjectHash> for [u8; HASH_LEN] {
    fn from(hash: ObjectHash) -> Self {
        hash.0
    }
}
