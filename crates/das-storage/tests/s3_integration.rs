//! S3/Minio integration tests
//!
//! Run with: cargo test -p das-storage --features s3-tests
//! Requires Minio on MINIO_ENDPOINT (default http://localhost:9000) with an
//! existing bucket named by MINIO_BUCKET (default das-storage-test).

#![cfg(feature = "s3-tests")]

use das_storage::{
    AwsS3StorageService, Context, ExpirationPolicy, S3StorageServiceConfig, StorageError,
    StorageService, keccak256,
};

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

async fn setup(discard_after_timeout: bool) -> AwsS3StorageService {
    let config = S3StorageServiceConfig {
        enable: true,
        access_key: env_or("MINIO_ACCESS_KEY", "minioadmin"),
        secret_key: env_or("MINIO_SECRET_KEY", "minioadmin"),
        bucket: env_or("MINIO_BUCKET", "das-storage-test"),
        region: "us-east-1".into(),
        endpoint: Some(env_or("MINIO_ENDPOINT", "http://localhost:9000")),
        discard_after_timeout,
    };
    AwsS3StorageService::from_config(&config).await.unwrap()
}

#[tokio::test]
async fn test_s3_roundtrip() {
    let ctx = Context::background();
    let storage = setup(false).await;

    let data = b"S3 storage test";
    storage.put(&ctx, data, 0).await.unwrap();

    let retrieved = storage
        .get_by_hash(&ctx, keccak256(data).as_bytes())
        .await
        .unwrap();
    assert_eq!(retrieved, data);
}

#[tokio::test]
async fn test_s3_discard_after_timeout() {
    let ctx = Context::background();
    let storage = setup(true).await;
    assert_eq!(
        storage.expiration_policy(&ctx),
        ExpirationPolicy::DiscardAfterTimeout
    );

    let data = b"expires far in the future";
    storage.put(&ctx, data, 1_893_456_000).await.unwrap();
    let retrieved = storage
        .get_by_hash(&ctx, keccak256(data).as_bytes())
        .await
        .unwrap();
    assert_eq!(retrieved, data);
}

#[tokio::test]
async fn test_s3_not_found() {
    let ctx = Context::background();
    let storage = setup(false).await;

    let hash = keccak256(b"definitely not stored");
    let result = storage.get_by_hash(&ctx, hash.as_bytes()).await;
    assert!(matches!(result, Err(StorageError::NotFound { .. })));
}
