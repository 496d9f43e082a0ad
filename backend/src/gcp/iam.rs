use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use gcs_signing::{Signer, SigningError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{error::GcpError, metadata::MetadataClient};

#[derive(Debug, Serialize)]
struct SignBlobRequest {
    payload: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignBlobResponse {
    key_id: String,
    signed_blob: String,
}

/// Signs blobs with a service account key held by IAM.
///
/// Calls `projects/-/serviceAccounts/{email}:signBlob` of the IAM Credentials API,
/// authorized with the instance's own access token. The private key never leaves
/// Google; the caller needs `iam.serviceAccounts.signBlob` on the target account.
#[derive(Debug, Clone)]
pub struct IamBlobSigner {
    http: reqwest::Client,
    metadata: Arc<MetadataClient>,
    base_url: String,
    service_account: String,
}

impl IamBlobSigner {
    /// Creates a signer for `service_account` against the IAM Credentials API at `base_url`
    pub fn new(
        http: reqwest::Client,
        metadata: Arc<MetadataClient>,
        base_url: impl Into<String>,
        service_account: impl Into<String>,
    ) -> Self {
        Self {
            http,
            metadata,
            base_url: base_url.into(),
            service_account: service_account.into(),
        }
    }

    async fn sign_blob(&self, message: &[u8]) -> Result<Vec<u8>, GcpError> {
        let token = self.metadata.access_token().await?;

        let response = self
            .http
            .post(format!(
                "{}/v1/projects/-/serviceAccounts/{}:signBlob",
                self.base_url, self.service_account
            ))
            .bearer_auth(token)
            .json(&SignBlobRequest {
                payload: STANDARD.encode(message),
            })
            .send()
            .await?;

        let signed: SignBlobResponse = GcpError::check(response).await?.json().await?;
        tracing::debug!(key_id = %signed.key_id, "Blob signed by IAM");

        decode_signed_blob(&signed)
    }
}

#[async_trait]
impl Signer for IamBlobSigner {
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        self.sign_blob(message).await.map_err(|err| {
            tracing::error!("IAM signBlob failed for {}: {err}", self.service_account);
            map_gcp_error(&err)
        })
    }
}

fn decode_signed_blob(signed: &SignBlobResponse) -> Result<Vec<u8>, GcpError> {
    STANDARD
        .decode(&signed.signed_blob)
        .map_err(|e| GcpError::InvalidResponse(format!("signedBlob is not base64: {e}")))
}

/// IAM refusing the account is permanent, anything else may clear up
fn map_gcp_error(err: &GcpError) -> SigningError {
    if err.is_timeout() {
        return SigningError::Timeout;
    }

    match err.status() {
        Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND) => {
            SigningError::Rejected(err.to_string())
        }
        _ => SigningError::Unavailable(err.to_string()),
    }
}
