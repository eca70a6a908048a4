//! Backend selection from configuration

use std::sync::Arc;

use tracing::info;

use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};
use crate::local::LocalDiskStorageService;
use crate::memory::InMemoryStorageService;
use crate::traits::StorageService;

/// Build the single enabled backend
///
/// Zero or more than one enabled backend is a configuration error;
/// composing several backends is the job of an aggregating layer.
pub async fn build_storage_service(config: &StorageConfig) -> StorageResult<Arc<dyn StorageService>> {
    config.validate()?;

    let enabled = [
        config.s3.enable,
        config.local_disk.enable,
        config.memory.enable,
    ]
    .iter()
    .filter(|enabled| **enabled)
    .count();
    match enabled {
        0 => return Err(StorageError::Config("no storage backend enabled".into())),
        1 => {}
        n => {
            return Err(StorageError::Config(format!(
                "{n} storage backends enabled, expected exactly one"
            )));
        }
    }

    let service: Arc<dyn StorageService> = if config.s3.enable {
        build_s3(config).await?
    } else if config.local_disk.enable {
        Arc::new(LocalDiskStorageService::new(&config.local_disk.data_dir).await?)
    } else {
        Arc::new(InMemoryStorageService::new())
    };

    info!(service = %service, "Storage backend ready");
    Ok(service)
}

#[cfg(feature = "s3")]
async fn build_s3(config: &StorageConfig) -> StorageResult<Arc<dyn StorageService>> {
    let service = crate::s3::AwsS3StorageService::from_config(&config.s3).await?;
    Ok(Arc::new(service))
}

#[cfg(not(feature = "s3"))]
async fn build_s3(_config: &StorageConfig) -> StorageResult<Arc<dyn StorageService>> {
    Err(StorageError::Config(
        "s3 storage requested but das-storage was built without the `s3` feature".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::policy::ExpirationPolicy;

    #[tokio::test]
    async fn test_nothing_enabled() {
        let result = build_storage_service(&StorageConfig::default()).await;
        assert!(matches!(result, Err(StorageError::Config(_))));
    }

    #[tokio::test]
    async fn test_two_enabled() {
        let mut config = StorageConfig::default();
        config.memory.enable = true;
        config.local_disk.enable = true;
        config.local_disk.data_dir = "/tmp/unused".into();

        let result = build_storage_service(&config).await;
        assert!(matches!(result, Err(StorageError::Config(_))));
    }

    #[tokio::test]
    async fn test_memory_selected() {
        let mut config = StorageConfig::default();
        config.memory.enable = true;

        let service = build_storage_service(&config).await.unwrap();
        assert_eq!(service.to_string(), "InMemoryStorageService");
        assert_eq!(
            service.expiration_policy(&Context::background()),
            ExpirationPolicy::KeepForever
        );
    }
}
