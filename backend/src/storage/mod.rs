//! Cloud Storage object operations
mod error;

use std::sync::Arc;

use async_trait::async_trait;
use gcs_signing::{percent_encode, ObjectKey};
use reqwest::StatusCode;

pub use error::{StorageError, StorageResult};

use crate::gcp::{GcpError, MetadataClient};

/// Object operations the upload routes need besides signing
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Deletes `key` from `bucket`
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] describing why the object could not be deleted
    async fn delete_object(&self, bucket: &str, key: &ObjectKey) -> StorageResult<()>;
}

/// Cloud Storage JSON API client
#[derive(Debug, Clone)]
pub struct GcsObjectStorage {
    http: reqwest::Client,
    metadata: Arc<MetadataClient>,
    base_url: String,
}

impl GcsObjectStorage {
    /// Creates a client for the JSON API at `base_url`
    pub fn new(
        http: reqwest::Client,
        metadata: Arc<MetadataClient>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            metadata,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ObjectStorage for GcsObjectStorage {
    async fn delete_object(&self, bucket: &str, key: &ObjectKey) -> StorageResult<()> {
        let token = self
            .metadata
            .access_token()
            .await
            .map_err(|e| map_gcp_error(e, bucket, key))?;

        let result = self
            .http
            .delete(format!(
                "{}/storage/v1/b/{bucket}/o/{}",
                self.base_url,
                percent_encode(key.as_str())
            ))
            .bearer_auth(token)
            .send()
            .await
            .map_err(GcpError::from);

        match result {
            Ok(response) => GcpError::check(response)
                .await
                .map(|_| ())
                .map_err(|e| map_gcp_error(e, bucket, key)),
            Err(e) => Err(map_gcp_error(e, bucket, key)),
        }
    }
}

fn map_gcp_error(err: GcpError, bucket: &str, key: &ObjectKey) -> StorageError {
    if err.is_timeout() {
        return StorageError::Timeout;
    }

    match err.status() {
        Some(StatusCode::UNAUTHORIZED) => StorageError::Unauthorized,
        Some(StatusCode::FORBIDDEN) => StorageError::Forbidden,
        Some(StatusCode::NOT_FOUND) => StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        _ => StorageError::Upstream(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ObjectKey {
        ObjectKey::parse("2024/05/ab12cd/photo.png").unwrap()
    }

    fn status_error(status: StatusCode) -> GcpError {
        GcpError::Status {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            map_gcp_error(status_error(StatusCode::UNAUTHORIZED), "b", &key()),
            StorageError::Unauthorized
        );
        assert_eq!(
            map_gcp_error(status_error(StatusCode::FORBIDDEN), "b", &key()),
            StorageError::Forbidden
        );
        assert_eq!(
            map_gcp_error(status_error(StatusCode::NOT_FOUND), "b", &key()),
            StorageError::NotFound {
                bucket: "b".to_string(),
                key: "2024/05/ab12cd/photo.png".to_string()
            }
        );
        assert_eq!(
            map_gcp_error(status_error(StatusCode::GATEWAY_TIMEOUT), "b", &key()),
            StorageError::Timeout
        );
        assert!(matches!(
            map_gcp_error(status_error(StatusCode::BAD_GATEWAY), "b", &key()),
            StorageError::Upstream(_)
        ));
    }

    #[test]
    fn test_not_found_message_names_bucket_and_key() {
        let err = map_gcp_error(status_error(StatusCode::NOT_FOUND), "images", &key());
        assert_eq!(
            err.to_string(),
            "2024/05/ab12cd/photo.png not found in bucket images"
        );
    }
}
