use std::sync::Arc;
use std::time::Duration;

use backend::{
    gcp::{self, MetadataClient},
    server,
    serving_urls::HttpServingUrls,
    state::AppState,
    storage::GcsObjectStorage,
    types::Environment,
};
use gcs_signing::UrlSigner;
use tracing_subscriber::{fmt, EnvFilter};

/// Budget for one IAM signBlob call, well inside the request timeout
const SIGN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // Use JSON format for staging/production, regular format for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt()
                .json()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
        }
        Environment::Development { .. } => {
            fmt().with_env_filter(EnvFilter::from_default_env()).init();
        }
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(8))
        .build()?;
    let metadata = Arc::new(MetadataClient::new(http.clone(), environment.metadata_url()));

    let identity = gcp::signing_identity(&environment, http.clone(), metadata.clone()).await?;
    let url_signer = UrlSigner::new(Arc::new(identity)).with_sign_timeout(SIGN_TIMEOUT);

    let state = AppState {
        upload_targets: Arc::new(environment.upload_targets()),
        url_signer: Arc::new(url_signer),
        object_storage: Arc::new(GcsObjectStorage::new(
            http.clone(),
            metadata.clone(),
            environment.storage_api_url(),
        )),
        serving_urls: Arc::new(HttpServingUrls::new(
            http,
            metadata,
            environment.serving_url_endpoint(),
        )),
    };

    server::start(environment, state).await
}
