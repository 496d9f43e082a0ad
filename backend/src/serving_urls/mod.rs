//! Dynamic serving URLs for images (resized and cropped on the fly by an image service)
mod error;

use std::sync::Arc;

use async_trait::async_trait;
use gcs_signing::ObjectKey;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

pub use error::{ServingUrlError, ServingUrlResult};

use crate::gcp::{GcpError, MetadataClient};

/// Registration of images with the dynamic serving service
#[async_trait]
pub trait ServingUrls: Send + Sync {
    /// Registers an image and returns its dynamic serving URL
    ///
    /// # Errors
    ///
    /// Returns a [`ServingUrlError`] if the image cannot be served
    async fn register(&self, bucket: &str, key: &ObjectKey) -> ServingUrlResult<String>;

    /// Removes a previously registered serving URL
    ///
    /// # Errors
    ///
    /// Returns a [`ServingUrlError`], including `NotFound` when nothing was registered
    async fn unregister(&self, bucket: &str, key: &ObjectKey) -> ServingUrlResult<()>;
}

#[derive(Debug, Serialize)]
struct ServingUrlRequest<'a> {
    bucket: &'a str,
    object: &'a str,
}

#[derive(Debug, Deserialize)]
struct ServingUrlResponse {
    url: String,
}

/// HTTP client for the image serving service
#[derive(Debug, Clone)]
pub struct HttpServingUrls {
    http: reqwest::Client,
    metadata: Arc<MetadataClient>,
    endpoint: String,
}

impl HttpServingUrls {
    /// Creates a client for the serving service at `endpoint`
    pub fn new(
        http: reqwest::Client,
        metadata: Arc<MetadataClient>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            http,
            metadata,
            endpoint: endpoint.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}/serving-urls", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl ServingUrls for HttpServingUrls {
    async fn register(&self, bucket: &str, key: &ObjectKey) -> ServingUrlResult<String> {
        let send = async {
            let token = self.metadata.access_token().await?;
            let response = self
                .http
                .post(self.url())
                .bearer_auth(token)
                .json(&ServingUrlRequest {
                    bucket,
                    object: key.as_str(),
                })
                .send()
                .await?;
            let body: ServingUrlResponse = GcpError::check(response).await?.json().await?;
            Ok::<_, GcpError>(body.url)
        };

        send.await.map_err(|e| map_gcp_error(e, bucket, key))
    }

    async fn unregister(&self, bucket: &str, key: &ObjectKey) -> ServingUrlResult<()> {
        let send = async {
            let token = self.metadata.access_token().await?;
            let response = self
                .http
                .delete(self.url())
                .bearer_auth(token)
                .query(&[("bucket", bucket), ("object", key.as_str())])
                .send()
                .await?;
            GcpError::check(response).await?;
            Ok::<_, GcpError>(())
        };

        send.await.map_err(|e| map_gcp_error(e, bucket, key))
    }
}

fn map_gcp_error(err: GcpError, bucket: &str, key: &ObjectKey) -> ServingUrlError {
    if err.is_timeout() {
        return ServingUrlError::Timeout;
    }

    match &err {
        GcpError::Status { status, body } => match *status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServingUrlError::AccessDenied,
            StatusCode::NOT_FOUND => ServingUrlError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            StatusCode::UNSUPPORTED_MEDIA_TYPE => ServingUrlError::NotAnImage {
                key: key.to_string(),
            },
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::PAYLOAD_TOO_LARGE => {
                ServingUrlError::Transformation(body.clone())
            }
            _ => ServingUrlError::Upstream(err.to_string()),
        },
        GcpError::Request(_) | GcpError::InvalidResponse(_) => {
            ServingUrlError::Upstream(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: StatusCode, body: &str) -> GcpError {
        GcpError::Status {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_status_mapping() {
        let key = ObjectKey::parse("2024/05/ab12cd/photo.png").unwrap();
        let map = |status, body| map_gcp_error(status_error(status, body), "images", &key);

        assert_eq!(map(StatusCode::FORBIDDEN, ""), ServingUrlError::AccessDenied);
        assert_eq!(
            map(StatusCode::NOT_FOUND, ""),
            ServingUrlError::NotFound {
                bucket: "images".to_string(),
                key: key.to_string()
            }
        );
        assert_eq!(
            map(StatusCode::UNSUPPORTED_MEDIA_TYPE, ""),
            ServingUrlError::NotAnImage {
                key: key.to_string()
            }
        );
        assert_eq!(
            map(StatusCode::UNPROCESSABLE_ENTITY, "image too large"),
            ServingUrlError::Transformation("image too large".to_string())
        );
        assert_eq!(map(StatusCode::REQUEST_TIMEOUT, ""), ServingUrlError::Timeout);
        assert!(matches!(
            map(StatusCode::INTERNAL_SERVER_ERROR, ""),
            ServingUrlError::Upstream(_)
        ));
    }
}
