//! Application dependencies shared across handlers

use std::sync::Arc;

use gcs_signing::UrlSigner;

use crate::{serving_urls::ServingUrls, storage::ObjectStorage, uploads::UploadTargets};

/// Everything the routes need, built once at startup
///
/// Each field is handed to the router as its own `Extension`.
#[derive(Clone)]
pub struct AppState {
    /// Image and file buckets
    pub upload_targets: Arc<UploadTargets>,
    /// Signs URLs as the process service account
    pub url_signer: Arc<UrlSigner>,
    /// Deletes objects
    pub object_storage: Arc<dyn ObjectStorage>,
    /// Manages dynamic image serving URLs
    pub serving_urls: Arc<dyn ServingUrls>,
}
