use std::sync::Mutex;

use async_trait::async_trait;
use backend::{
    serving_urls::{ServingUrlError, ServingUrlResult, ServingUrls},
    storage::{ObjectStorage, StorageError, StorageResult},
};
use gcs_signing::{ObjectKey, Signer, SigningError};

/// Signing oracle returning `0xDEADBEEF`, or a fixed error
pub struct StubSigner {
    pub result: Result<Vec<u8>, SigningError>,
}

impl StubSigner {
    pub fn ok() -> Self {
        Self {
            result: Ok(vec![0xDE, 0xAD, 0xBE, 0xEF]),
        }
    }

    pub fn failing(error: SigningError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl Signer for StubSigner {
    async fn sign(&self, _message: &[u8]) -> Result<Vec<u8>, SigningError> {
        self.result.clone()
    }
}

/// Object storage that records deletes and answers with a fixed result
pub struct StubStorage {
    pub result: StorageResult<()>,
    pub deleted: Mutex<Vec<(String, String)>>,
}

impl StubStorage {
    pub fn with_result(result: StorageResult<()>) -> Self {
        Self {
            result,
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn deleted(&self) -> Vec<(String, String)> {
        self.deleted.lock().unwrap().clone()
    }
}

impl Default for StubStorage {
    fn default() -> Self {
        Self::with_result(Ok(()))
    }
}

#[async_trait]
impl ObjectStorage for StubStorage {
    async fn delete_object(&self, bucket: &str, key: &ObjectKey) -> StorageResult<()> {
        if self.result.is_ok() {
            self.deleted
                .lock()
                .unwrap()
                .push((bucket.to_string(), key.to_string()));
        }
        self.result.clone()
    }
}

/// Serving URL service with fixed results for register and unregister
pub struct StubServingUrls {
    pub register_result: ServingUrlResult<String>,
    pub unregister_result: ServingUrlResult<()>,
    pub unregistered: Mutex<Vec<String>>,
}

impl StubServingUrls {
    pub fn registering(result: ServingUrlResult<String>) -> Self {
        Self {
            register_result: result,
            ..Self::default()
        }
    }

    pub fn unregistering(result: ServingUrlResult<()>) -> Self {
        Self {
            unregister_result: result,
            ..Self::default()
        }
    }

    pub fn unregistered(&self) -> Vec<String> {
        self.unregistered.lock().unwrap().clone()
    }
}

impl Default for StubServingUrls {
    fn default() -> Self {
        Self {
            register_result: Ok("https://lh3.example.com/dynamic-abc".to_string()),
            unregister_result: Ok(()),
            unregistered: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ServingUrls for StubServingUrls {
    async fn register(&self, _bucket: &str, _key: &ObjectKey) -> ServingUrlResult<String> {
        self.register_result.clone()
    }

    async fn unregister(&self, _bucket: &str, key: &ObjectKey) -> ServingUrlResult<()> {
        self.unregistered.lock().unwrap().push(key.to_string());
        self.unregister_result.clone()
    }
}

pub fn not_found(bucket: &str, key: &str) -> StorageError {
    StorageError::NotFound {
        bucket: bucket.to_string(),
        key: key.to_string(),
    }
}

pub fn serving_not_found(bucket: &str, key: &str) -> ServingUrlError {
    ServingUrlError::NotFound {
        bucket: bucket.to_string(),
        key: key.to_string(),
    }
}
