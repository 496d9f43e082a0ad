use std::sync::Arc;

use aide::axum::IntoApiResponse;
use axum::{Extension, Json};
use gcs_signing::UrlSigner;
use schemars::JsonSchema;
use serde::Serialize;

#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    status: String,
    /// Current version of the application
    semver: String,
    /// Commit hash of the current build (if available)
    rev: Option<String>,
    /// Service account signed URLs are issued for
    service_account: String,
}

/// Health check endpoint
///
/// Returns the current status, version and signing identity of the service.
pub async fn handler(Extension(url_signer): Extension<Arc<UrlSigner>>) -> impl IntoApiResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        semver: env!("CARGO_PKG_VERSION").to_string(),
        rev: option_env!("GIT_REV").map(ToString::to_string),
        service_account: url_signer.service_account().to_string(),
    })
}
