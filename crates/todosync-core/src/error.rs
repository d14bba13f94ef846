//! Error types for todosync-core

use thiserror::Error;

/// Result type alias using todosync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in todosync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local store error (disk I/O, corruption, constraint failure)
    #[error("Store unavailable: {0}")]
    Store(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Task not found
    #[error("Task not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The sync backend could not be reached
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The sync backend answered but refused the request
    #[error("Server rejected request ({status}): {message}")]
    ServerRejected {
        /// HTTP status, or the envelope code when the status was 2xx
        status: u16,
        /// Server-provided or synthesized message
        message: String,
    },

    /// Server version counter is behind the local high-water mark
    #[error("Server version {remote} is behind local version {local}")]
    VersionSkew {
        /// Local max synced version
        local: i64,
        /// Server max version
        remote: i64,
    },

    /// Another sync pass is already running
    #[error("A sync pass is already in progress")]
    SyncInProgress,
}

/// Coarse classification used by callers deciding how to surface a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StoreUnavailable,
    Io,
    NotFound,
    InvalidInput,
    Serialization,
    NetworkUnavailable,
    ServerRejected,
    VersionSkew,
    SyncInProgress,
}

impl Error {
    /// Classify this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(_) => ErrorKind::StoreUnavailable,
            Self::Io(_) => ErrorKind::Io,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::NetworkUnavailable(_) => ErrorKind::NetworkUnavailable,
            Self::ServerRejected { .. } => ErrorKind::ServerRejected,
            Self::VersionSkew { .. } => ErrorKind::VersionSkew,
            Self::SyncInProgress => ErrorKind::SyncInProgress,
        }
    }

    /// Whether the failure came from the network boundary
    pub const fn is_transport(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NetworkUnavailable | ErrorKind::ServerRejected
        )
    }
}
