use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use uuid::Uuid;

use crate::config::S3Config;
use crate::error::AppError;

/// Blob store wrapper. `upload` returns a durable CDN URL; `delete_by_url`
/// is best-effort and only logs failures, since a leaked object must never
/// fail the write that replaced it.
#[derive(Clone)]
pub struct ObjectStorage {
    client: Client,
    bucket: String,
    cdn_url: String,
}

impl ObjectStorage {
    pub async fn from_config(config: &S3Config) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            None,
            None,
            "channel-service",
        );

        let shared_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if let Some(endpoint) = &config.endpoint {
            if !endpoint.trim().is_empty() {
                builder = builder.endpoint_url(endpoint).force_path_style(true);
            }
        }

        Ok(ObjectStorage {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket_name.clone(),
            cdn_url: config.cdn_url.trim_end_matches('/').to_string(),
        })
    }

    /// Store bytes under a fresh key and return the public URL.
    pub async fn upload(
        &self,
        key_prefix: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        let key = format!("{}/{}", key_prefix, Uuid::new_v4());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to store object: {}", e)))?;

        Ok(format!("{}/{}", self.cdn_url, key))
    }

    /// Delete a previously stored object, identified by its public URL.
    pub async fn delete_by_url(&self, url: &str) {
        let Some(key) = self.key_from_url(url) else {
            tracing::warn!("Refusing to delete unrecognized asset URL: {}", url);
            return;
        };

        if let Err(e) = self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            tracing::warn!("Failed to delete stored asset {}: {}", key, e);
        }
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.cdn_url)
            .map(|rest| rest.trim_start_matches('/').to_string())
            .filter(|key| !key.is_empty())
    }
}
