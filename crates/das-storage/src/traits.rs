//! Storage service trait definition

use std::fmt;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::StorageResult;
use crate::policy::ExpirationPolicy;

/// Content-addressed blob storage
///
/// Writes are keyed by [`keccak256`](crate::keccak256) of the payload;
/// reads take that digest back. Implementations are shared behind
/// `Arc<dyn StorageService>` and must tolerate concurrent calls.
#[async_trait]
pub trait StorageService: Send + Sync + fmt::Display {
    /// Retrieve the payload stored under `key`
    ///
    /// Returns `StorageError::NotFound` if nothing was stored under `key`.
    /// No retries: a failed read is reported as-is.
    async fn get_by_hash(&self, ctx: &Context, key: &[u8]) -> StorageResult<Vec<u8>>;

    /// Store `value` under its own digest
    ///
    /// `timeout` is a Unix timestamp in seconds. It is honored only when
    /// [`expiration_policy`](Self::expiration_policy) is
    /// `DiscardAfterTimeout`. Storing the same value twice is harmless.
    async fn put(&self, ctx: &Context, value: &[u8], timeout: u64) -> StorageResult<()>;

    /// Make every previously successful `put` durable and visible
    async fn sync(&self, ctx: &Context) -> StorageResult<()>;

    /// Release held resources. Called once at shutdown; not required
    /// before process exit.
    async fn close(&self, ctx: &Context) -> StorageResult<()>;

    fn expiration_policy(&self, ctx: &Context) -> ExpirationPolicy;
}
