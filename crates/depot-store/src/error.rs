use thiserror::Error;

/// Errors from object and label store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No object is stored under the given hash.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// The label was never set.
    #[error("label not found: {0}")]
    LabelNotFound(String),

    /// The key is too short to shard (must be longer than the shard prefix).
    #[error("invalid key: {len} bytes is too short to shard")]
    InvalidKey { len: usize },

    /// The label name violates the naming rules.
    #[error(transparent)]
    InvalidLabel(#[from] depot_types::TypeError),

    /// An object body ended before the declared size was reached.
    #[error("truncated object: expected {expected} bytes, got {actual}")]
    TruncatedObject { expected: u64, actual: u64 },

    /// A label file exists but does not contain a valid hex hash.
    #[error("corrupt label {name}: {reason}")]
    CorruptLabel { name: String, reason: String },

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
