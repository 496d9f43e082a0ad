//! Upload targets: which bucket, public domain and extensions a route serves

use std::collections::HashSet;

use gcs_signing::ObjectKey;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Kind of content a target accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum UploadKind {
    /// Images, eligible for dynamic serving URLs
    Images,
    /// Documents
    Files,
}

/// Bucket configuration behind one set of routes
#[derive(Debug, Clone)]
pub struct UploadTarget {
    /// Kind of content
    pub kind: UploadKind,
    /// Cloud Storage bucket name
    pub bucket: String,
    /// Public domain the bucket is served from
    pub domain: String,
    /// Allowed extensions, leading dot included, compared case-sensitively
    pub extensions: HashSet<String>,
    /// Lifetime of issued URLs in seconds
    pub expiry_secs: u64,
}

impl UploadTarget {
    /// Public HTTPS URL of an object
    #[must_use]
    pub fn public_url(&self, key: &ObjectKey) -> String {
        format!("https://{}/{key}", self.domain)
    }

    /// `gs://` location of an object
    #[must_use]
    pub fn location(&self, key: &ObjectKey) -> String {
        format!("gs://{}/{key}", self.bucket)
    }

    /// Object description returned to clients
    #[must_use]
    pub fn describe(&self, key: &ObjectKey, dynamic_url: Option<String>) -> StoredObject {
        StoredObject {
            path: key.to_string(),
            url: self.public_url(key),
            location: self.location(key),
            dynamic_url,
        }
    }
}

/// Image and file targets
#[derive(Debug, Clone)]
pub struct UploadTargets {
    /// Images bucket
    pub images: UploadTarget,
    /// Files bucket
    pub files: UploadTarget,
}

/// Where an object lives and how to reach it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StoredObject {
    /// Object path inside the bucket
    pub path: String,
    /// HTTPS URL on the public domain
    pub url: String,
    /// `gs://bucket/path`
    pub location: String,
    /// URL with on-the-fly image resizing, when registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_url: Option<String>,
}
