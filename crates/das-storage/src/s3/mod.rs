//! S3-compatible storage backend
//!
//! Objects live at `{bucket}/{base32(keccak256(payload))}` and hold the
//! payload verbatim. When the backend discards after timeout, each object
//! carries an `Expires` timestamp set from the `put` timeout.

mod client;

#[cfg(feature = "s3")]
mod aws;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, trace, warn};

pub use client::{ObjectStoreClient, ObjectStoreError, ObjectStoreErrorKind, ObjectStoreResult};

#[cfg(feature = "s3")]
pub use aws::AwsS3Client;

use crate::context::Context;
use crate::error::{StorageError, StorageResult};
use crate::hash::keccak256;
use crate::key::{encode_key, first_few_bytes};
use crate::policy::ExpirationPolicy;
use crate::traits::StorageService;

/// [`StorageService`] over any [`ObjectStoreClient`]
///
/// Stateless apart from its configuration and the shared client handle,
/// so it takes no locks of its own.
pub struct S3StorageService<C> {
    bucket: String,
    client: Arc<C>,
    policy: ExpirationPolicy,
}

#[cfg(feature = "s3")]
pub type AwsS3StorageService = S3StorageService<AwsS3Client>;

impl<C: ObjectStoreClient> S3StorageService<C> {
    pub fn new(client: Arc<C>, bucket: impl Into<String>, policy: ExpirationPolicy) -> Self {
        let bucket = bucket.into();
        debug!(%bucket, %policy, "Created S3 storage service");
        Self {
            bucket,
            client,
            policy,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }
}

#[cfg(feature = "s3")]
impl S3StorageService<AwsS3Client> {
    /// Connect using backend configuration
    pub async fn from_config(config: &crate::config::S3StorageServiceConfig) -> StorageResult<Self> {
        config.validate()?;
        let client = AwsS3Client::from_config(config).await;
        Ok(Self::new(
            Arc::new(client),
            config.bucket.clone(),
            config.expiration_policy(),
        ))
    }
}

#[async_trait]
impl<C: ObjectStoreClient> StorageService for S3StorageService<C> {
    async fn get_by_hash(&self, ctx: &Context, key: &[u8]) -> StorageResult<Vec<u8>> {
        trace!(key = %first_few_bytes(key), this = %self, "S3StorageService::get_by_hash");

        // The empty key encodes to an empty object name, which S3 rejects.
        if key.is_empty() {
            return Err(StorageError::NotFound {
                op: "get_by_hash",
                key: first_few_bytes(key),
            });
        }

        let object_key = encode_key(key);
        let mut buf = Vec::new();
        ctx.run(async {
            self.client
                .download(&self.bucket, &object_key, &mut buf)
                .await
                .map_err(|e| store_error("get_by_hash", key, e))
        })
        .await?;

        Ok(buf)
    }

    async fn put(&self, ctx: &Context, value: &[u8], timeout: u64) -> StorageResult<()> {
        trace!(
            message = %first_few_bytes(value),
            timeout,
            this = %self,
            "S3StorageService::put"
        );

        let hash = keccak256(value);
        let expires = self.policy.expiry_for(timeout);
        if self.policy.discards() && expires.is_none() {
            return Err(StorageError::Invalid {
                op: "put",
                key: first_few_bytes(hash.as_bytes()),
                message: format!("expiration timeout {timeout} is out of range"),
            });
        }

        let object_key = encode_key(hash.as_bytes());
        let body = Bytes::copy_from_slice(value);
        ctx.run(async {
            self.client
                .upload(&self.bucket, &object_key, body, expires)
                .await
                .map_err(|e| store_error("put", hash.as_bytes(), e))
        })
        .await
    }

    async fn sync(&self, _ctx: &Context) -> StorageResult<()> {
        // Uploads are visible once `put` returns.
        trace!(this = %self, "S3StorageService::sync");
        Ok(())
    }

    async fn close(&self, _ctx: &Context) -> StorageResult<()> {
        trace!(this = %self, "S3StorageService::close");
        Ok(())
    }

    fn expiration_policy(&self, _ctx: &Context) -> ExpirationPolicy {
        self.policy
    }
}

impl<C> fmt::Display for S3StorageService<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S3StorageService(:{})", self.bucket)
    }
}

/// Normalize a client failure into a [`StorageError`], keeping the key short
fn store_error(op: &'static str, key: &[u8], err: ObjectStoreError) -> StorageError {
    let key = first_few_bytes(key);
    if err.kind == ObjectStoreErrorKind::NotFound {
        debug!(op, %key, "Object not found");
        return StorageError::NotFound { op, key };
    }

    warn!(op, %key, error = %err, "Object store request failed");
    let message = err.message;
    match err.kind {
        ObjectStoreErrorKind::Unauthorized => StorageError::Unauthorized { op, key, message },
        ObjectStoreErrorKind::Forbidden => StorageError::Forbidden { op, key, message },
        ObjectStoreErrorKind::Invalid => StorageError::Invalid { op, key, message },
        ObjectStoreErrorKind::Unavailable
        | ObjectStoreErrorKind::Other
        | ObjectStoreErrorKind::NotFound => StorageError::Unavailable { op, key, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_store_error_mapping() {
        let key = [0xaau8; 32];
        let cases = [
            (ObjectStoreErrorKind::NotFound, ErrorKind::NotFound),
            (ObjectStoreErrorKind::Unauthorized, ErrorKind::Unauthorized),
            (ObjectStoreErrorKind::Forbidden, ErrorKind::Forbidden),
            (ObjectStoreErrorKind::Invalid, ErrorKind::Invalid),
            (ObjectStoreErrorKind::Unavailable, ErrorKind::Unavailable),
            (ObjectStoreErrorKind::Other, ErrorKind::Unavailable),
        ];

        for (store_kind, expected) in cases {
            let err = store_error("get_by_hash", &key, ObjectStoreError::new(store_kind, "boom"));
            assert_eq!(err.kind(), expected, "{store_kind:?}");
        }
    }

    #[test]
    fn test_store_error_truncates_key() {
        let key = [0xaau8; 32];
        let err = store_error(
            "put",
            &key,
            ObjectStoreError::new(ObjectStoreErrorKind::Forbidden, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("aaaaaaaaaaaaaaaa..."));
        assert!(!message.contains(&hex::encode(key)));
    }
}
