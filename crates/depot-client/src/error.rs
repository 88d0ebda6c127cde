use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("protocol error: {0}")]
    Protocol(#[from] depot_protocol::ProtocolError),

    #[error(transparent)]
    Type(#[from] depot_types::TypeError),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("path is not valid UTF-8: {0}")]
    NonUnicodePath(PathBuf),

    #[error("path escapes the tree root: {0:?}")]
    PathEscapesRoot(String),

    #[error("operation aborted: a pipeline stage failed")]
    Aborted,

    #[error("pipeline stage panicked: {0}")]
    StagePanicked(#[from] tokio::task::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;
