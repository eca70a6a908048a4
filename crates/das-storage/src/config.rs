//! Backend configuration
//!
//! Key names match the operator-facing option names (`access-key`,
//! `discard-after-timeout`, ...). Loading is layered: TOML file first,
//! then `DAS_STORAGE_*` environment variables, with `__` separating
//! sections (`DAS_STORAGE_S3__SECRET_KEY` sets `s3.secret-key`).

use std::fmt;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};
use crate::policy::ExpirationPolicy;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "DAS_STORAGE_";

/// Settings for the S3 backend
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct S3StorageServiceConfig {
    /// Enable storage/retrieval of batch data from an S3 bucket
    pub enable: bool,
    pub access_key: String,
    pub bucket: String,
    pub region: String,
    pub secret_key: String,
    /// Custom endpoint for S3-compatible stores (Minio, R2, ...)
    pub endpoint: Option<String>,
    /// Discard data after its expiry timeout
    pub discard_after_timeout: bool,
}

impl S3StorageServiceConfig {
    pub fn expiration_policy(&self) -> ExpirationPolicy {
        ExpirationPolicy::from_discard_flag(self.discard_after_timeout)
    }

    pub fn validate(&self) -> StorageResult<()> {
        if !self.enable {
            return Ok(());
        }
        if self.bucket.is_empty() {
            return Err(StorageError::Config("s3 storage requires a bucket".into()));
        }
        if self.region.is_empty() {
            return Err(StorageError::Config("s3 storage requires a region".into()));
        }
        if self.access_key.is_empty() != self.secret_key.is_empty() {
            return Err(StorageError::Config(
                "s3 access-key and secret-key must be set together".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for S3StorageServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.secret_key.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("S3StorageServiceConfig")
            .field("enable", &self.enable)
            .field("access_key", &self.access_key)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("secret_key", &secret)
            .field("endpoint", &self.endpoint)
            .field("discard_after_timeout", &self.discard_after_timeout)
            .finish()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LocalDiskConfig {
    pub enable: bool,
    pub data_dir: PathBuf,
}

impl LocalDiskConfig {
    pub fn validate(&self) -> StorageResult<()> {
        if self.enable && self.data_dir.as_os_str().is_empty() {
            return Err(StorageError::Config(
                "local-disk storage requires a data-dir".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MemoryConfig {
    pub enable: bool,
}

/// All backend sections; exactly one should be enabled
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StorageConfig {
    pub s3: S3StorageServiceConfig,
    pub local_disk: LocalDiskConfig,
    pub memory: MemoryConfig,
}

impl StorageConfig {
    /// Layered configuration sources: `path` (if present), then environment
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .map(|key| key.as_str().replace("__", ".").replace('_', "-").into()),
            )
    }

    pub fn load(path: impl AsRef<Path>) -> StorageResult<Self> {
        let config: StorageConfig = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StorageResult<()> {
        self.s3.validate()?;
        self.local_disk.validate()?;
        Ok(())
    }
}
