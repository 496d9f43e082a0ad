use std::collections::HashSet;
use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use backend::{
    server,
    state::AppState,
    types::Environment,
    uploads::{UploadKind, UploadTarget, UploadTargets},
};
use gcs_signing::{Signer, SigningIdentity, UrlSigner};
use tower::ServiceExt;

use super::stubs::{StubServingUrls, StubSigner, StubStorage};

pub const SERVICE_ACCOUNT: &str = "uploader@project.iam.gserviceaccount.com";
pub const IMAGES_BUCKET: &str = "images-test";
pub const FILES_BUCKET: &str = "files-test";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

pub fn test_targets(expiry_secs: u64) -> UploadTargets {
    UploadTargets {
        images: UploadTarget {
            kind: UploadKind::Images,
            bucket: IMAGES_BUCKET.to_string(),
            domain: "images.example.com".to_string(),
            extensions: [".webp", ".jpg", ".jpeg", ".png", ".gif"]
                .into_iter()
                .map(String::from)
                .collect::<HashSet<_>>(),
            expiry_secs,
        },
        files: UploadTarget {
            kind: UploadKind::Files,
            bucket: FILES_BUCKET.to_string(),
            domain: "files.example.com".to_string(),
            extensions: HashSet::from([".pdf".to_string()]),
            expiry_secs,
        },
    }
}

/// Router wired with stub collaborators
pub struct TestSetup {
    pub router: Router,
    pub environment: Environment,
    pub object_storage: Arc<StubStorage>,
    pub serving_urls: Arc<StubServingUrls>,
}

/// Collaborators for a [`TestSetup`], all succeeding unless replaced
pub struct TestSetupBuilder {
    environment: Environment,
    signer: Arc<dyn Signer>,
    object_storage: Arc<StubStorage>,
    serving_urls: Arc<StubServingUrls>,
    expiry_secs: u64,
}

impl TestSetupBuilder {
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn signer(mut self, signer: StubSigner) -> Self {
        self.signer = Arc::new(signer);
        self
    }

    pub fn object_storage(mut self, storage: StubStorage) -> Self {
        self.object_storage = Arc::new(storage);
        self
    }

    pub fn serving_urls(mut self, serving_urls: StubServingUrls) -> Self {
        self.serving_urls = Arc::new(serving_urls);
        self
    }

    pub fn expiry_secs(mut self, expiry_secs: u64) -> Self {
        self.expiry_secs = expiry_secs;
        self
    }

    pub fn build(self) -> TestSetup {
        setup_test_env();

        let identity = SigningIdentity::new(SERVICE_ACCOUNT, self.signer);
        let state = AppState {
            upload_targets: Arc::new(test_targets(self.expiry_secs)),
            url_signer: Arc::new(UrlSigner::new(Arc::new(identity))),
            object_storage: self.object_storage.clone(),
            serving_urls: self.serving_urls.clone(),
        };

        TestSetup {
            router: server::router(self.environment.clone(), state),
            environment: self.environment,
            object_storage: self.object_storage,
            serving_urls: self.serving_urls,
        }
    }
}

impl TestSetup {
    pub fn builder() -> TestSetupBuilder {
        TestSetupBuilder {
            environment: Environment::Development {
                signed_url_expiry_override: None,
            },
            signer: Arc::new(StubSigner::ok()),
            object_storage: Arc::new(StubStorage::default()),
            serving_urls: Arc::new(StubServingUrls::default()),
            expiry_secs: 900,
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    pub async fn send_request(
        &self,
        method: &str,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method(method)
            .header("Host", "uploads.example.com")
            .body(Body::empty())?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_request("GET", route).await
    }

    pub async fn send_post_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_request("POST", route).await
    }

    pub async fn send_delete_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_request("DELETE", route).await
    }
}
