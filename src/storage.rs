use crate::config::Secret;
use crate::error::StorageError;
use aws_sdk_s3::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tokio::runtime::Handle;

/// Destination for compressed images.
///
/// One instance is shared by every worker of a pool.
pub trait ObjectStore: Send + Sync {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;
}

/// S3-compatible object store (Cloudflare R2, MinIO, AWS).
pub struct S3Store {
    client: Client,
    runtime: Handle,
}

impl S3Store {
    pub fn new(
        endpoint_url: &str,
        region: &str,
        access_key: &Secret,
        secret_key: &Secret,
        runtime: Handle,
    ) -> Result<Self, StorageError> {
        reqwest::Url::parse(endpoint_url)
            .map_err(|e| StorageError::InvalidEndpoint(format!("{}: {}", endpoint_url, e)))?;

        let credentials = Credentials::new(
            access_key.expose(),
            secret_key.expose(),
            None,
            None,
            "r2-squeeze",
        );
        let config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .endpoint_url(endpoint_url)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(config),
            runtime,
        })
    }

    pub async fn put_object_async(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body));
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .map_err(|e| StorageError::Request(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}

impl ObjectStore for S3Store {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        self.runtime
            .block_on(self.put_object_async(bucket, key, body, content_type))
    }
}
