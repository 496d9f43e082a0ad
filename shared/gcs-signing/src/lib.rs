//! Google Cloud Storage V4 signed URLs and upload object keys
//!
//! The crate is split in two layers:
//! - [`object_key`] turns a client supplied filename into a unique, browsable object key
//! - [`url_signer`] turns a bucket, object key, method and expiry into a `GOOG4-RSA-SHA256`
//!   signed URL using a [`Signer`] that never exposes the private key

#![deny(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]

mod canonical;
pub mod error;
pub mod identity;
pub mod object_key;
pub mod url_signer;

pub use canonical::percent_encode;
pub use error::{SignUrlError, SignUrlResult, SigningError, ValidationError};
pub use identity::{Signer, SigningIdentity};
pub use object_key::{generate_object_key, generate_object_key_at, ObjectKey};
pub use url_signer::{HttpMethod, SignedUrl, SigningRequest, UrlSigner, MAX_EXPIRY_SECS};
