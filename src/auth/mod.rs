//! Bearer credentials for the analytics API.
//!
//! The server normally signs in with a service-account key file. A pre-issued
//! access token can be supplied instead, and a key that fails to load at
//! startup is kept as an [`UnavailableTokenSource`] so every query reports the
//! authorization failure instead of the process refusing to start.

pub mod service_account;

pub use service_account::{ServiceAccountKey, ServiceAccountTokenSource};

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use crate::backend::{BackendError, BackendResult};
use crate::config::CredentialSource;

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> BackendResult<String>;
}

/// Fixed bearer token, e.g. one minted by `gcloud auth print-access-token`
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> BackendResult<String> {
        Ok(self.token.clone())
    }
}

/// Credential that failed to load; every request fails with the load error
pub struct UnavailableTokenSource {
    reason: String,
}

impl UnavailableTokenSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl TokenSource for UnavailableTokenSource {
    async fn access_token(&self) -> BackendResult<String> {
        Err(BackendError::Auth(self.reason.clone()))
    }
}

/// Build the configured token source. Never fails; see [`UnavailableTokenSource`].
pub fn token_source_from_config(source: &CredentialSource) -> Arc<dyn TokenSource> {
    match source {
        CredentialSource::AccessToken(token) => {
            info!("Using pre-issued access token for the analytics API");
            Arc::new(StaticTokenSource::new(token.clone()))
        }
        CredentialSource::ServiceAccountFile(path) => {
            match ServiceAccountTokenSource::from_file(path) {
                Ok(source) => {
                    info!(
                        "Using service account {} from {}",
                        source.client_email(),
                        path.display()
                    );
                    Arc::new(source)
                }
                Err(e) => {
                    error!("Failed to load service account credentials: {:#}", e);
                    Arc::new(UnavailableTokenSource::new(format!(
                        "credentials could not be loaded: {e:#}"
                    )))
                }
            }
        }
    }
}
