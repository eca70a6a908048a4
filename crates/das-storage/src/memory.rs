//! In-memory storage backend (for testing and single-process setups)

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::trace;

use crate::context::Context;
use crate::error::{StorageError, StorageResult};
use crate::hash::keccak256;
use crate::key::first_few_bytes;
use crate::policy::ExpirationPolicy;
use crate::traits::StorageService;

/// In-memory storage
///
/// Thread-safe via `RwLock`. Not persistent: data is lost on drop. Keeps
/// everything forever; `put` timeouts are ignored.
#[derive(Default)]
pub struct InMemoryStorageService {
    blobs: RwLock<HashMap<Vec<u8>, Bytes>>,
    closed: AtomicBool,
}

impl InMemoryStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payloads
    pub fn len(&self) -> usize {
        self.blobs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes stored
    pub fn total_size(&self) -> usize {
        self.blobs.read().unwrap().values().map(|v| v.len()).sum()
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl StorageService for InMemoryStorageService {
    async fn get_by_hash(&self, ctx: &Context, key: &[u8]) -> StorageResult<Vec<u8>> {
        trace!(key = %first_few_bytes(key), "InMemoryStorageService::get_by_hash");
        ctx.check()?;
        self.ensure_open()?;

        self.blobs
            .read()
            .unwrap()
            .get(key)
            .map(|v| v.to_vec())
            .ok_or_else(|| StorageError::NotFound {
                op: "get_by_hash",
                key: first_few_bytes(key),
            })
    }

    async fn put(&self, ctx: &Context, value: &[u8], timeout: u64) -> StorageResult<()> {
        trace!(message = %first_few_bytes(value), timeout, "InMemoryStorageService::put");
        ctx.check()?;
        self.ensure_open()?;

        let hash = keccak256(value);
        self.blobs
            .write()
            .unwrap()
            .insert(hash.as_bytes().to_vec(), Bytes::copy_from_slice(value));
        Ok(())
    }

    async fn sync(&self, _ctx: &Context) -> StorageResult<()> {
        self.ensure_open()
    }

    async fn close(&self, _ctx: &Context) -> StorageResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn expiration_policy(&self, _ctx: &Context) -> ExpirationPolicy {
        ExpirationPolicy::KeepForever
    }
}

impl fmt::Display for InMemoryStorageService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InMemoryStorageService")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip() {
        let ctx = Context::background();
        let storage = InMemoryStorageService::new();
        let data = b"Hello, storage!";

        storage.put(&ctx, data, 0).await.unwrap();
        let retrieved = storage.get_by_hash(&ctx, keccak256(data).as_bytes()).await.unwrap();
        assert_eq!(retrieved, data);
    }

    #[tokio::test]
    async fn test_not_found() {
        let ctx = Context::background();
        let storage = InMemoryStorageService::new();
        let hash = keccak256(b"nonexistent");

        let result = storage.get_by_hash(&ctx, hash.as_bytes()).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));

        let result = storage.get_by_hash(&ctx, b"").await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_put_idempotent() {
        let ctx = Context::background();
        let storage = InMemoryStorageService::new();
        let data = b"twice";

        storage.put(&ctx, data, 10).await.unwrap();
        storage.put(&ctx, data, 20).await.unwrap();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.total_size(), data.len());
        assert_eq!(
            storage.get_by_hash(&ctx, keccak256(data).as_bytes()).await.unwrap(),
            data
        );
    }

    #[tokio::test]
    async fn test_keep_forever() {
        let ctx = Context::background();
        let storage = InMemoryStorageService::new();
        storage.put(&ctx, b"old", 1).await.unwrap();
        assert_eq!(storage.expiration_policy(&ctx), ExpirationPolicy::KeepForever);
    }

    #[tokio::test]
    async fn test_closed_rejects_calls() {
        let ctx = Context::background();
        let storage = InMemoryStorageService::new();
        storage.put(&ctx, b"before close", 0).await.unwrap();
        storage.close(&ctx).await.unwrap();

        let result = storage.put(&ctx, b"after close", 0).await;
        assert!(matches!(result, Err(StorageError::Closed)));
        let result = storage.sync(&ctx).await;
        assert!(matches!(result, Err(StorageError::Closed)));
    }

    #[tokio::test]
    async fn test_cancelled_context() {
        let ctx = Context::background();
        ctx.cancel();
        let storage = InMemoryStorageService::new();

        let result = storage.put(&ctx, b"data", 0).await;
        assert!(matches!(result, Err(StorageError::Canceled)));
        assert!(storage.is_empty());
    }
}
