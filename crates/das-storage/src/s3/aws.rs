//! `aws-sdk-s3` implementation of [`ObjectStoreClient`]

use std::time::SystemTime;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::{ByteStream, DateTime};
use bytes::Bytes;
use tokio::io::AsyncWrite;
use tracing::debug;

use super::client::{ObjectStoreClient, ObjectStoreError, ObjectStoreErrorKind, ObjectStoreResult};
use crate::config::S3StorageServiceConfig;

/// S3-compatible client (AWS S3, Minio, etc.)
#[derive(Clone, Debug)]
pub struct AwsS3Client {
    client: Client,
}

impl AwsS3Client {
    /// Wrap an existing AWS SDK client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from backend configuration
    ///
    /// Static credentials are used when an access key is configured;
    /// otherwise the default AWS credential chain (env, profile, IMDS)
    /// is consulted. Retry, timeout and other shared settings come from the
    /// loaded SDK config either way. A custom endpoint switches to
    /// path-style addressing, which Minio requires.
    pub async fn from_config(config: &S3StorageServiceConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                &config.access_key,
                &config.secret_key,
                None,
                None,
                "das-storage-static",
            ));
        }

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        if let Some(endpoint) = &config.endpoint {
            debug!(%endpoint, "Using custom S3 endpoint");
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(Client::from_conf(builder.build()))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ObjectStoreClient for AwsS3Client {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        expires: Option<SystemTime>,
    ) -> ObjectStoreResult<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body));
        if let Some(expires) = expires {
            request = request.expires(DateTime::from(expires));
        }

        request
            .send()
            .await
            .map_err(|e| sdk_error("S3 PUT failed", e))?;
        Ok(())
    }

    async fn download(
        &self,
        bucket: &str,
        key: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> ObjectStoreResult<u64> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error("S3 GET failed", e))?;

        let mut body = response.body.into_async_read();
        tokio::io::copy(&mut body, sink).await.map_err(|e| {
            ObjectStoreError::new(
                ObjectStoreErrorKind::Unavailable,
                format!("Failed to read body: {e}"),
            )
        })
    }
}

fn sdk_error<E>(context: &str, err: SdkError<E>) -> ObjectStoreError
where
    E: std::error::Error + 'static,
{
    let kind = match &err {
        SdkError::ServiceError(e) => status_kind(e.raw().status().as_u16()),
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            ObjectStoreErrorKind::Unavailable
        }
        SdkError::ConstructionFailure(_) => ObjectStoreErrorKind::Invalid,
        _ => ObjectStoreErrorKind::Other,
    };
    ObjectStoreError::new(kind, format!("{context}: {}", DisplayErrorContext(&err)))
}

fn status_kind(status: u16) -> ObjectStoreErrorKind {
    match status {
        404 => ObjectStoreErrorKind::NotFound,
        401 => ObjectStoreErrorKind::Unauthorized,
        403 => ObjectStoreErrorKind::Forbidden,
        400 | 411 | 413 | 414 => ObjectStoreErrorKind::Invalid,
        408 | 429 | 500..=599 => ObjectStoreErrorKind::Unavailable,
        _ => ObjectStoreErrorKind::Other,
    }
}
