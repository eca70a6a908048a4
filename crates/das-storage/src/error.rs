//! Storage error types

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure class of a [`StorageError`], for callers that branch on the kind
/// rather than on the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    Forbidden,
    Unavailable,
    Canceled,
    DeadlineExceeded,
    Invalid,
    Closed,
    Io,
    Config,
}

/// Errors returned by every [`StorageService`](crate::StorageService) backend.
///
/// Keys appear only in their truncated form (see
/// [`first_few_bytes`](crate::first_few_bytes)); payload bytes never appear.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{op}: data not found for key {key}")]
    NotFound { op: &'static str, key: String },

    #[error("{op}: unauthorized for key {key}: {message}")]
    Unauthorized {
        op: &'static str,
        key: String,
        message: String,
    },

    #[error("{op}: forbidden for key {key}: {message}")]
    Forbidden {
        op: &'static str,
        key: String,
        message: String,
    },

    #[error("{op}: backend unavailable for key {key}: {message}")]
    Unavailable {
        op: &'static str,
        key: String,
        message: String,
    },

    #[error("Operation canceled")]
    Canceled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("{op}: invalid request for key {key}: {message}")]
    Invalid {
        op: &'static str,
        key: String,
        message: String,
    },

    #[error("Storage service is closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::NotFound { .. } => ErrorKind::NotFound,
            StorageError::Unauthorized { .. } => ErrorKind::Unauthorized,
            StorageError::Forbidden { .. } => ErrorKind::Forbidden,
            StorageError::Unavailable { .. } => ErrorKind::Unavailable,
            StorageError::Canceled => ErrorKind::Canceled,
            StorageError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            StorageError::Invalid { .. } => ErrorKind::Invalid,
            StorageError::Closed => ErrorKind::Closed,
            StorageError::Io(_) => ErrorKind::Io,
            StorageError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// True for both explicit cancellation and an elapsed deadline.
    pub fn is_canceled(&self) -> bool {
        matches!(self.kind(), ErrorKind::Canceled | ErrorKind::DeadlineExceeded)
    }
}

impl From<figment::Error> for StorageError {
    fn from(err: figment::Error) -> Self {
        StorageError::Config(err.to_string())
    }
}
