//! Object-store client seam used by the S3 backend

use std::fmt;
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWrite;

pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

/// Store-neutral classification of a client failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectStoreErrorKind {
    NotFound,
    Unauthorized,
    Forbidden,
    Unavailable,
    Invalid,
    Other,
}

#[derive(Debug)]
pub struct ObjectStoreError {
    pub kind: ObjectStoreErrorKind,
    pub message: String,
}

impl ObjectStoreError {
    pub fn new(kind: ObjectStoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ObjectStoreErrorKind::NotFound, message)
    }
}

impl fmt::Display for ObjectStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ObjectStoreError {}

/// Minimal object-store surface: put bytes under a key, read them back
///
/// One client is shared by every call on a backend instance, so
/// implementations must be safe for concurrent use.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// Write `body` to `bucket/key`, asking the store to expire it at
    /// `expires` when given
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        expires: Option<SystemTime>,
    ) -> ObjectStoreResult<()>;

    /// Stream the object at `bucket/key` into `sink`, returning the number
    /// of bytes written
    async fn download(
        &self,
        bucket: &str,
        key: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> ObjectStoreResult<u64>;
}
