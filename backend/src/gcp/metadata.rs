//! GCE metadata server client: service account identity and access tokens

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::error::{GcpError, GcpResult};

const METADATA_FLAVOR: &str = "Metadata-Flavor";
const SERVICE_ACCOUNT_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default";

/// Tokens are refreshed this many seconds before they expire
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Client for the metadata server of the instance we run on
#[derive(Debug)]
pub struct MetadataClient {
    http: reqwest::Client,
    base_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl MetadataClient {
    /// Creates a client for the metadata server at `base_url`
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            token: Mutex::new(None),
        }
    }

    /// E-mail of the default service account
    ///
    /// # Errors
    ///
    /// Returns `GcpError` if the metadata server is unreachable or answers with an error
    pub async fn service_account_email(&self) -> GcpResult<String> {
        let response = self
            .http
            .get(format!("{}{SERVICE_ACCOUNT_PATH}/email", self.base_url))
            .header(METADATA_FLAVOR, "Google")
            .timeout(Duration::from_secs(5))
            .send()
            .await?;

        let response = GcpError::check(response).await?;
        let email = response.text().await?.trim().to_string();
        if email.is_empty() {
            return Err(GcpError::InvalidResponse(
                "metadata server returned an empty service account".to_string(),
            ));
        }

        Ok(email)
    }

    /// OAuth access token for the default service account, cached until shortly before expiry
    ///
    /// # Errors
    ///
    /// Returns `GcpError` if a new token cannot be fetched
    pub async fn access_token(&self) -> GcpResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at - TimeDelta::seconds(TOKEN_REFRESH_MARGIN_SECS) > Utc::now() {
                return Ok(token.value.clone());
            }
        }

        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *cached = Some(token);

        Ok(value)
    }

    async fn fetch_token(&self) -> GcpResult<CachedToken> {
        tracing::debug!("Fetching access token from metadata server");

        let response = self
            .http
            .get(format!("{}{SERVICE_ACCOUNT_PATH}/token", self.base_url))
            .header(METADATA_FLAVOR, "Google")
            .timeout(Duration::from_secs(5))
            .send()
            .await?;

        let token: TokenResponse = GcpError::check(response).await?.json().await?;

        Ok(CachedToken {
            value: token.access_token,
            expires_at: Utc::now() + TimeDelta::seconds(token.expires_in),
        })
    }
}
