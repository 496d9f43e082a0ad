//! Service account identity and the signing oracle it delegates to

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SigningError;

/// Asymmetric signing capability backed by a key this process never sees
///
/// Implementations sign the raw message bytes with RSA-SHA256 and return the
/// signature bytes. Tests use a fixed stub; production delegates to IAM.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Signs `message` and returns the raw signature
    ///
    /// # Errors
    ///
    /// Returns a [`SigningError`] when the oracle is unreachable or refuses the request
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError>;
}

/// Service account used to sign URLs, resolved once at startup
#[derive(Clone)]
pub struct SigningIdentity {
    service_account: String,
    signer: Arc<dyn Signer>,
}

impl SigningIdentity {
    /// Creates an identity from an account e-mail and its signing oracle
    pub fn new(service_account: impl Into<String>, signer: Arc<dyn Signer>) -> Self {
        Self {
            service_account: service_account.into(),
            signer,
        }
    }

    /// Service account e-mail, used as the credential prefix
    #[must_use]
    pub fn service_account(&self) -> &str {
        &self.service_account
    }

    /// Signing oracle for this account
    #[must_use]
    pub fn signer(&self) -> &dyn Signer {
        self.signer.as_ref()
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("service_account", &self.service_account)
            .finish_non_exhaustive()
    }
}
