//! Cloud Storage V4 signed URLs (`GOOG4-RSA-SHA256`)
//!
//! The canonical request, string-to-sign and final URL are built exactly as the
//! storage backend rebuilds them when it verifies the signature:
//!
//! ```text
//! METHOD\n/bucket/encoded-key\ncanonical-query\ncanonical-headers\nsigned-headers\nUNSIGNED-PAYLOAD
//! GOOG4-RSA-SHA256\nYYYYMMDDTHHMMSSZ\nYYYYMMDD/auto/storage/goog4_request\nhex(sha256(canonical-request))
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::canonical::{canonical_headers, canonical_query, percent_encode, sha256_hex};
use crate::error::{SignUrlResult, SigningError, ValidationError};
use crate::identity::SigningIdentity;
use crate::object_key::ObjectKey;

/// Longest lifetime the backend accepts for a signed URL (7 days)
pub const MAX_EXPIRY_SECS: u64 = 604_800;

/// Host every signed URL points at
pub const STORAGE_HOST: &str = "storage.googleapis.com";

const SIGNING_ALGORITHM: &str = "GOOG4-RSA-SHA256";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Default budget for a single signing oracle call
pub const DEFAULT_SIGN_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP verb the signed URL authorizes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Download the object
    Get,
    /// Upload (create or overwrite) the object
    Put,
    /// Delete the object
    Delete,
}

/// Everything needed to sign one URL
#[derive(Debug, Clone)]
pub struct SigningRequest {
    /// Bucket name
    pub bucket: String,
    /// Object path inside the bucket
    pub object_key: ObjectKey,
    /// Verb the URL is valid for
    pub method: HttpMethod,
    /// Lifetime in seconds, at most [`MAX_EXPIRY_SECS`]
    pub expiry_secs: u64,
    /// Extra headers the client must send with the request
    pub headers: Vec<(String, String)>,
    /// Extra query parameters baked into the URL
    pub query_params: Vec<(String, String)>,
}

impl SigningRequest {
    /// Creates a request without extra headers or query parameters
    pub fn new(
        bucket: impl Into<String>,
        object_key: ObjectKey,
        method: HttpMethod,
        expiry_secs: u64,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            object_key,
            method,
            expiry_secs,
            headers: Vec::new(),
            query_params: Vec::new(),
        }
    }

    /// Adds a header that becomes part of the signature
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a query parameter that becomes part of the signature
    #[must_use]
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }
}

/// Signed URL with its validity window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    /// Full `https://storage.googleapis.com/...` URL
    pub url: String,
    /// Verb the URL is valid for
    pub method: HttpMethod,
    /// Instant the signature was computed for
    pub issued_at: DateTime<Utc>,
    /// `issued_at + expiry`
    pub expires_at: DateTime<Utc>,
}

/// Intermediate strings of one signing pass
struct Canonical {
    uri: String,
    query: String,
    request: String,
    credential_scope: String,
    timestamp: String,
}

/// Produces V4 signed URLs for a single service account
#[derive(Debug, Clone)]
pub struct UrlSigner {
    identity: Arc<SigningIdentity>,
    sign_timeout: Duration,
}

impl UrlSigner {
    /// Creates a signer using [`DEFAULT_SIGN_TIMEOUT`]
    #[must_use]
    pub const fn new(identity: Arc<SigningIdentity>) -> Self {
        Self {
            identity,
            sign_timeout: DEFAULT_SIGN_TIMEOUT,
        }
    }

    /// Overrides the budget for a single signing oracle call
    #[must_use]
    pub const fn with_sign_timeout(mut self, sign_timeout: Duration) -> Self {
        self.sign_timeout = sign_timeout;
        self
    }

    /// Service account the URLs are signed as
    #[must_use]
    pub fn service_account(&self) -> &str {
        self.identity.service_account()
    }

    /// Signs `request` at the current instant
    ///
    /// # Errors
    ///
    /// See [`UrlSigner::sign_at`]
    pub async fn sign(&self, request: &SigningRequest) -> SignUrlResult<SignedUrl> {
        self.sign_at(request, Utc::now()).await
    }

    /// Signs `request` as if issued at `now`
    ///
    /// # Errors
    ///
    /// Returns `SignUrlError::Validation` if the expiry is zero or above [`MAX_EXPIRY_SECS`]
    /// Returns `SignUrlError::Signing` if the oracle fails or exceeds the timeout
    pub async fn sign_at(
        &self,
        request: &SigningRequest,
        now: DateTime<Utc>,
    ) -> SignUrlResult<SignedUrl> {
        let canonical = self.canonicalize(request, now)?;
        let string_to_sign = string_to_sign(&canonical);

        let signature = tokio::time::timeout(
            self.sign_timeout,
            self.identity.signer().sign(string_to_sign.as_bytes()),
        )
        .await
        .map_err(|_| SigningError::Timeout)??;

        let url = format!(
            "https://{STORAGE_HOST}{}?{}&X-Goog-Signature={}",
            canonical.uri,
            canonical.query,
            hex::encode(signature)
        );

        tracing::debug!(
            bucket = %request.bucket,
            object = %request.object_key,
            method = %request.method,
            expiry_secs = request.expiry_secs,
            "Signed URL issued"
        );

        Ok(SignedUrl {
            url,
            method: request.method,
            issued_at: now,
            expires_at: now + expiry_delta(request.expiry_secs),
        })
    }

    /// Canonical request the signature for `request` at `now` is computed over
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the expiry is out of range
    pub fn canonical_request(
        &self,
        request: &SigningRequest,
        now: DateTime<Utc>,
    ) -> Result<String, ValidationError> {
        self.canonicalize(request, now).map(|c| c.request)
    }

    /// String handed to the signing oracle for `request` at `now`
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the expiry is out of range
    pub fn string_to_sign(
        &self,
        request: &SigningRequest,
        now: DateTime<Utc>,
    ) -> Result<String, ValidationError> {
        self.canonicalize(request, now).map(|c| string_to_sign(&c))
    }

    fn canonicalize(
        &self,
        request: &SigningRequest,
        now: DateTime<Utc>,
    ) -> Result<Canonical, ValidationError> {
        validate_expiry(request.expiry_secs)?;

        let uri = format!(
            "/{}/{}",
            request.bucket,
            percent_encode(request.object_key.as_str())
        );

        let timestamp = now.format("%Y%m%dT%H%M%SZ").to_string();
        let datestamp = now.format("%Y%m%d").to_string();
        let credential_scope = format!("{datestamp}/auto/storage/goog4_request");
        let credential = format!("{}/{credential_scope}", self.identity.service_account());

        let (headers, signed_headers) = canonical_headers(
            request
                .headers
                .iter()
                .filter(|(name, _)| !name.eq_ignore_ascii_case("host"))
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .chain([("host", STORAGE_HOST)]),
        );

        let expires = request.expiry_secs.to_string();
        let query = canonical_query(
            request
                .query_params
                .iter()
                .filter(|(key, _)| !is_builtin_param(key))
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .chain([
                    ("X-Goog-Algorithm", SIGNING_ALGORITHM),
                    ("X-Goog-Credential", credential.as_str()),
                    ("X-Goog-Date", timestamp.as_str()),
                    ("X-Goog-Expires", expires.as_str()),
                    ("X-Goog-SignedHeaders", signed_headers.as_str()),
                ]),
        );

        let method = request.method.to_string();
        let canonical_request = [
            method.as_str(),
            uri.as_str(),
            query.as_str(),
            headers.as_str(),
            signed_headers.as_str(),
            UNSIGNED_PAYLOAD,
        ]
        .join("\n");

        Ok(Canonical {
            uri,
            query,
            request: canonical_request,
            credential_scope,
            timestamp,
        })
    }
}

/// Parameters every signed URL carries; caller supplied ones with these names are dropped
const BUILTIN_PARAMS: [&str; 6] = [
    "X-Goog-Algorithm",
    "X-Goog-Credential",
    "X-Goog-Date",
    "X-Goog-Expires",
    "X-Goog-SignedHeaders",
    "X-Goog-Signature",
];

fn is_builtin_param(key: &str) -> bool {
    BUILTIN_PARAMS
        .iter()
        .any(|builtin| builtin.eq_ignore_ascii_case(key))
}

fn string_to_sign(canonical: &Canonical) -> String {
    let hash = sha256_hex(canonical.request.as_bytes());
    [
        SIGNING_ALGORITHM,
        canonical.timestamp.as_str(),
        canonical.credential_scope.as_str(),
        hash.as_str(),
    ]
    .join("\n")
}

fn validate_expiry(expiry_secs: u64) -> Result<(), ValidationError> {
    if expiry_secs == 0 {
        return Err(ValidationError::new(
            "expires",
            "Expiration must be at least 1 second",
        ));
    }
    if expiry_secs > MAX_EXPIRY_SECS {
        return Err(ValidationError::new(
            "expires",
            format!("Expiration can't be longer than {MAX_EXPIRY_SECS} seconds (7 days)"),
        ));
    }
    Ok(())
}

#[allow(clippy::cast_possible_wrap)]
fn expiry_delta(expiry_secs: u64) -> TimeDelta {
    // bounded by MAX_EXPIRY_SECS
    TimeDelta::seconds(expiry_secs as i64)
}
