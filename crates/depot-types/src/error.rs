use thiserror::Error;

/// Errors from hash parsing, manifest codecs, and label validation.
#[derive(Debug, Error)]
pub enum TypeError {
    /// A string could not be decoded as hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// A hash had the wrong number of bytes.
    #[error("invalid hash length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A label name violates the naming rules.
    #[error("invalid label name {name:?}: {reason}")]
    InvalidLabel { name: String, reason: String },

    /// A manifest payload could not be decoded.
    #[error("malformed manifest: {0}")]
    MalformedManifest(String),

    /// A manifest could not be serialized.
    #[error("manifest encoding failed: {0}")]
    Encode(String),
}
