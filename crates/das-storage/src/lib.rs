//! das-storage: Content-addressed blob storage for data availability
//!
//! Payloads are stored under the Keccak-256 digest of their content and
//! read back by that digest. Every backend implements [`StorageService`],
//! so an aggregating layer can hold several as `Arc<dyn StorageService>`
//! and pick between them by [`ExpirationPolicy`].
//!
//! ## Backends
//!
//! | Backend                   | Use Case              | Feature Flag |
//! |---------------------------|-----------------------|--------------|
//! | `InMemoryStorageService`  | Unit tests            | (always)     |
//! | `LocalDiskStorageService` | Single node, dev      | (always)     |
//! | `S3StorageService`        | Production (S3/Minio) | `s3`         |
//!
//! ## Example
//!
//! ```rust,ignore
//! use das_storage::{Context, InMemoryStorageService, StorageService, keccak256};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = Context::background();
//!     let storage = InMemoryStorageService::new();
//!
//!     let data = b"Hello, batches!";
//!     storage.put(&ctx, data, 0).await?;
//!
//!     let retrieved = storage.get_by_hash(&ctx, keccak256(data).as_bytes()).await?;
//!     assert_eq!(retrieved, data);
//!
//!     Ok(())
//! }
//! ```

mod error;
mod hash;
mod key;
mod policy;
mod traits;

mod backend;
mod context;
mod local;
mod memory;

pub mod config;
pub mod s3;

// Re-exports
pub use backend::build_storage_service;
pub use context::Context;
pub use error::{ErrorKind, StorageError, StorageResult};
pub use hash::{DataHash, HASH_LEN, keccak256};
pub use key::{encode_key, first_few_bytes};
pub use policy::ExpirationPolicy;
pub use traits::StorageService;

pub use config::{LocalDiskConfig, MemoryConfig, S3StorageServiceConfig, StorageConfig};
pub use local::LocalDiskStorageService;
pub use memory::InMemoryStorageService;
pub use s3::{ObjectStoreClient, ObjectStoreError, ObjectStoreErrorKind, S3StorageService};

#[cfg(feature = "s3")]
pub use s3::{AwsS3Client, AwsS3StorageService};
