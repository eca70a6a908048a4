//! Local filesystem storage backend

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace};

use crate::context::Context;
use crate::error::{StorageError, StorageResult};
use crate::hash::keccak256;
use crate::key::{encode_key, first_few_bytes};
use crate::policy::ExpirationPolicy;
use crate::traits::StorageService;

/// Local filesystem storage
///
/// Stores payloads as files named by their base32 key.
/// Structure: `{root}/{base32(keccak256(payload))}`
///
/// Writes land in a temporary file that is renamed into place, so a
/// concurrent reader sees either nothing or the whole payload.
pub struct LocalDiskStorageService {
    root: PathBuf,
    tmp_counter: AtomicU64,
}

impl LocalDiskStorageService {
    /// Create storage at the given root directory
    ///
    /// Creates the directory if it doesn't exist.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        debug!(root = %root.display(), "Opened local disk storage");
        Ok(Self {
            root,
            tmp_counter: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, key: &[u8]) -> PathBuf {
        self.root.join(encode_key(key))
    }

    fn tmp_path(&self, key: &[u8]) -> PathBuf {
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!(".{}.{}.{n}.tmp", encode_key(key), std::process::id()))
    }

    /// Create the temporary file for `key` before any payload is written
    ///
    /// The returned guard removes the file if the write is abandoned,
    /// including when the caller's future is dropped on cancellation.
    async fn create_tmp(&self, key: &[u8]) -> StorageResult<(fs::File, TmpFileGuard)> {
        let tmp = self.tmp_path(key);
        let file = fs::File::create(&tmp).await?;
        Ok((file, TmpFileGuard::new(tmp)))
    }

    async fn finish_write(
        &self,
        mut file: fs::File,
        guard: TmpFileGuard,
        key: &[u8],
        value: &[u8],
    ) -> StorageResult<()> {
        file.write_all(value).await?;
        file.sync_data().await?;
        drop(file);
        fs::rename(guard.path(), self.blob_path(key)).await?;
        guard.disarm();
        Ok(())
    }
}

/// Removes a temporary file on drop unless disarmed after the rename
struct TmpFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TmpFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TmpFileGuard {
    fn drop(&mut self) {
        if self.armed {
            // Drop cannot await; unlinking one file is short enough to block on.
            if let Err(e) = std::fs::remove_file(&self.path) {
                debug!(path = %self.path.display(), error = %e, "Failed to remove temporary file");
            }
        }
    }
}

#[async_trait]
impl StorageService for LocalDiskStorageService {
    async fn get_by_hash(&self, ctx: &Context, key: &[u8]) -> StorageResult<Vec<u8>> {
        trace!(key = %first_few_bytes(key), this = %self, "LocalDiskStorageService::get_by_hash");

        // An empty key names the root directory, never a payload.
        if key.is_empty() {
            return Err(StorageError::NotFound {
                op: "get_by_hash",
                key: first_few_bytes(key),
            });
        }

        let path = self.blob_path(key);
        ctx.run(async {
            match fs::read(&path).await {
                Ok(data) => Ok(data),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound {
                    op: "get_by_hash",
                    key: first_few_bytes(key),
                }),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn put(&self, ctx: &Context, value: &[u8], timeout: u64) -> StorageResult<()> {
        trace!(
            message = %first_few_bytes(value),
            timeout,
            this = %self,
            "LocalDiskStorageService::put"
        );

        let hash = keccak256(value);
        ctx.check()?;
        // Created outside `run` so a cancelled write always leaves a file for
        // the guard to remove, never a create still in flight.
        let (file, guard) = self.create_tmp(hash.as_bytes()).await?;
        ctx.run(self.finish_write(file, guard, hash.as_bytes(), value))
            .await
    }

    async fn sync(&self, ctx: &Context) -> StorageResult<()> {
        trace!(this = %self, "LocalDiskStorageService::sync");
        // Payload contents are fsynced by `put`; this makes the renames durable.
        #[cfg(unix)]
        ctx.run(async {
            fs::File::open(&self.root).await?.sync_all().await?;
            Ok::<_, StorageError>(())
        })
        .await?;
        #[cfg(not(unix))]
        ctx.check()?;
        Ok(())
    }

    async fn close(&self, _ctx: &Context) -> StorageResult<()> {
        Ok(())
    }

    fn expiration_policy(&self, _ctx: &Context) -> ExpirationPolicy {
        ExpirationPolicy::KeepForever
    }
}

impl fmt::Display for LocalDiskStorageService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalDiskStorageService({})", self.root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tmp_guard_removes_unless_disarmed() {
        let temp = TempDir::new().unwrap();

        let abandoned = temp.path().join("abandoned.tmp");
        std::fs::write(&abandoned, b"partial").unwrap();
        drop(TmpFileGuard::new(abandoned.clone()));
        assert!(!abandoned.exists());

        let kept = temp.path().join("kept.tmp");
        std::fs::write(&kept, b"complete").unwrap();
        TmpFileGuard::new(kept.clone()).disarm();
        assert!(kept.exists());
    }

    #[tokio::test]
    async fn test_dropped_write_leaves_no_tmp() {
        let temp = TempDir::new().unwrap();
        let storage = LocalDiskStorageService::new(temp.path()).await.unwrap();
        let key = keccak256(b"dropped");

        let (file, guard) = storage.create_tmp(key.as_bytes()).await.unwrap();
        let tmp = guard.path().to_path_buf();
        assert!(tmp.exists());

        // Never polled: models a put whose future is dropped mid-write.
        let write = storage.finish_write(file, guard, key.as_bytes(), b"dropped");
        drop(write);

        assert!(!tmp.exists());
        assert!(!storage.blob_path(key.as_bytes()).exists());
    }

    #[tokio::test]
    async fn test_empty_key_not_found() {
        let temp = TempDir::new().unwrap();
        let storage = LocalDiskStorageService::new(temp.path()).await.unwrap();

        let result = storage.get_by_hash(&Context::background(), b"").await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }
}
