//! Environment configuration for different deployment stages

use std::collections::HashSet;
use std::env;

use gcs_signing::MAX_EXPIRY_SECS;

use crate::uploads::{UploadKind, UploadTarget, UploadTargets};

/// Default lifetime of upload URLs (15 minutes)
const DEFAULT_SIGNED_URL_EXPIRY_SECS: u64 = 15 * 60;

/// Extensions accepted by the images bucket, leading dot included
const IMAGE_EXTENSIONS: [&str; 5] = [".webp", ".jpg", ".jpeg", ".png", ".gif"];

/// Extensions accepted by the files bucket, leading dot included
const FILE_EXTENSIONS: [&str; 1] = [".pdf"];

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (local emulators, plain HTTP)
    Development {
        /// Optional override for signed URL expiry in seconds, within `1..=604800`
        signed_url_expiry_override: Option<u64>,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => {
                let signed_url_expiry_override = env::var("SIGNED_URL_EXPIRY_SECS")
                    .ok()
                    .and_then(|val| val.parse::<u64>().ok())
                    .filter(|secs| {
                        let valid = (1..=MAX_EXPIRY_SECS).contains(secs);
                        if !valid {
                            tracing::warn!(
                                "Ignoring SIGNED_URL_EXPIRY_SECS={secs}, must be between 1 and {MAX_EXPIRY_SECS}"
                            );
                        }
                        valid
                    });

                Self::Development {
                    signed_url_expiry_override,
                }
            }
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Bucket, public domain and extension list for image uploads
    ///
    /// # Panics
    ///
    /// Panics outside development if `IMAGES_BUCKET` or `IMAGES_DOMAIN` is not set
    #[must_use]
    pub fn images_target(&self) -> UploadTarget {
        UploadTarget {
            kind: UploadKind::Images,
            bucket: self.required_var("IMAGES_BUCKET", "images-dev"),
            domain: self.required_var("IMAGES_DOMAIN", "localhost:4443/images-dev"),
            extensions: extension_set(&IMAGE_EXTENSIONS),
            expiry_secs: self.signed_url_expiry_secs(),
        }
    }

    /// Bucket, public domain and extension list for document uploads
    ///
    /// # Panics
    ///
    /// Panics outside development if `FILES_BUCKET` or `FILES_DOMAIN` is not set
    #[must_use]
    pub fn files_target(&self) -> UploadTarget {
        UploadTarget {
            kind: UploadKind::Files,
            bucket: self.required_var("FILES_BUCKET", "files-dev"),
            domain: self.required_var("FILES_DOMAIN", "localhost:4443/files-dev"),
            extensions: extension_set(&FILE_EXTENSIONS),
            expiry_secs: self.signed_url_expiry_secs(),
        }
    }

    /// Both upload targets
    #[must_use]
    pub fn upload_targets(&self) -> UploadTargets {
        UploadTargets {
            images: self.images_target(),
            files: self.files_target(),
        }
    }

    /// Signed URL expiry time in seconds
    #[must_use]
    pub fn signed_url_expiry_secs(&self) -> u64 {
        match self {
            Self::Production | Self::Staging => DEFAULT_SIGNED_URL_EXPIRY_SECS,
            Self::Development {
                signed_url_expiry_override,
            } => signed_url_expiry_override.unwrap_or(DEFAULT_SIGNED_URL_EXPIRY_SECS),
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Whether plain HTTP requests are redirected to HTTPS
    #[must_use]
    pub const fn require_https(&self) -> bool {
        !matches!(self, Self::Development { .. })
    }

    /// Origins allowed to call the API from a browser, from `ALLOWED_ORIGINS`
    #[must_use]
    pub fn allowed_origins(&self) -> Vec<String> {
        let default = match self {
            Self::Production | Self::Staging => "",
            Self::Development { .. } => "http://localhost:3000,http://localhost:8080",
        };

        env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| default.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    /// Service account override, skipping the metadata server lookup
    #[allow(clippy::unused_self)]
    #[must_use]
    pub fn service_account_override(&self) -> Option<String> {
        env::var("GCS_SERVICE_ACCOUNT")
            .ok()
            .filter(|account| !account.trim().is_empty())
    }

    /// Base URL of the GCE metadata server
    #[allow(clippy::unused_self)]
    #[must_use]
    pub fn metadata_url(&self) -> String {
        let host = env::var("GCP_METADATA_HOST")
            .unwrap_or_else(|_| "metadata.google.internal".to_string());
        format!("http://{host}")
    }

    /// Base URL of the IAM Credentials API
    #[must_use]
    pub fn iam_credentials_url(&self) -> String {
        match self {
            Self::Production | Self::Staging => "https://iamcredentials.googleapis.com".to_string(),
            Self::Development { .. } => env::var("IAM_CREDENTIALS_URL")
                .unwrap_or_else(|_| "https://iamcredentials.googleapis.com".to_string()),
        }
    }

    /// Base URL of the Cloud Storage JSON API
    #[must_use]
    pub fn storage_api_url(&self) -> String {
        match self {
            Self::Production | Self::Staging => "https://storage.googleapis.com".to_string(),
            // fake-gcs-server
            Self::Development { .. } => env::var("STORAGE_API_URL")
                .unwrap_or_else(|_| "http://localhost:4443".to_string()),
        }
    }

    /// Base URL of the image serving service that manages dynamic URLs
    ///
    /// # Panics
    ///
    /// Panics outside development if `SERVING_URL_ENDPOINT` is not set
    #[must_use]
    pub fn serving_url_endpoint(&self) -> String {
        self.required_var("SERVING_URL_ENDPOINT", "http://localhost:8090")
    }

    fn required_var(&self, name: &str, development_default: &str) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var(name).unwrap_or_else(|_| panic!("{name} environment variable is not set"))
            }
            Self::Development { .. } => {
                env::var(name).unwrap_or_else(|_| development_default.to_string())
            }
        }
    }
}

fn extension_set(extensions: &[&str]) -> HashSet<String> {
    extensions.iter().map(ToString::to_string).collect()
}
