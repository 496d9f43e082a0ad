//! Upload gateway: signed Cloud Storage URLs for image and file uploads

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

/// Google Cloud metadata, IAM signing and identity
pub mod gcp;

/// Request middleware (HTTPS enforcement, CORS)
pub mod middleware;

/// HTTP routes
pub mod routes;

/// HTTP server setup
pub mod server;

/// Dynamic image serving URLs
pub mod serving_urls;

/// Application dependencies
pub mod state;

/// Object deletion
pub mod storage;

/// Configuration, errors and extractors
pub mod types;

/// Upload targets (buckets, domains, extensions)
pub mod uploads;
