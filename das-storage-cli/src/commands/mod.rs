pub mod blob;
pub mod info;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as AnyhowContext, Result};
use das_storage::{StorageConfig, StorageService, build_storage_service};

/// Global options shared by all commands
pub struct Context {
    pub json_output: bool,
    pub config_path: PathBuf,
    pub request_timeout_secs: u64,
}

impl Context {
    /// Storage context for one request, honoring `--request-timeout`
    pub fn request(&self) -> das_storage::Context {
        match self.request_timeout_secs {
            0 => das_storage::Context::background(),
            secs => das_storage::Context::with_timeout(Duration::from_secs(secs)),
        }
    }

    pub async fn open_storage(&self) -> Result<Arc<dyn StorageService>> {
        let config = StorageConfig::load(&self.config_path).with_context(|| {
            format!("Failed to load config from {}", self.config_path.display())
        })?;
        tracing::debug!(path = %self.config_path.display(), "Loaded storage config");
        let storage = build_storage_service(&config)
            .await
            .context("Failed to build storage backend")?;
        Ok(storage)
    }
}
