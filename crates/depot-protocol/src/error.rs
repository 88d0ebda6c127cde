use thiserror::Error;

use crate::opcode::Status;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown opcode: {0}")]
    UnknownOpcode(u8),

    #[error("unknown status byte: {0}")]
    UnknownStatus(u8),

    #[error("negative payload size: {0}")]
    NegativeSize(i64),

    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("truncated payload: expected {expected} bytes, got {actual}")]
    Truncated { expected: u64, actual: u64 },

    #[error("remote error: {0}")]
    Remote(Status),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
