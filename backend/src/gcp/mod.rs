//! Google Cloud plumbing: metadata server, IAM blob signing and the signing identity
//!
//! On Cloud Run, GKE or GCE the service account is read once from the metadata server
//! and every signature is produced by IAM `signBlob`, so no key file is ever deployed.

pub mod error;
mod iam;
mod metadata;

use std::sync::Arc;

use gcs_signing::SigningIdentity;

pub use error::{GcpError, GcpResult};
pub use iam::IamBlobSigner;
pub use metadata::MetadataClient;

use crate::types::Environment;

/// Resolves the service account and builds the signing identity for this process
///
/// `GCS_SERVICE_ACCOUNT` wins over the metadata server lookup.
///
/// # Errors
///
/// Returns `GcpError` if the service account cannot be read from the metadata server
pub async fn signing_identity(
    environment: &Environment,
    http: reqwest::Client,
    metadata: Arc<MetadataClient>,
) -> GcpResult<SigningIdentity> {
    let service_account = match environment.service_account_override() {
        Some(account) => account,
        None => metadata.service_account_email().await?,
    };

    tracing::info!("Signing URLs as {service_account}");

    let signer = IamBlobSigner::new(
        http,
        metadata,
        environment.iam_credentials_url(),
        service_account.clone(),
    );

    Ok(SigningIdentity::new(service_account, Arc::new(signer)))
}
