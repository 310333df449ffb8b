use std::{
    path::Path,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::TokenSource;
use crate::backend::{BackendError, BackendResult};

pub const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/webmasters.readonly";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
// urn:ietf:params:oauth:grant-type:jwt-bearer, form-encoded
const JWT_BEARER_GRANT: &str = "urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before they actually expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// The fields of a service-account JSON key this client needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "ServiceAccountKey::default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    fn default_token_uri() -> String {
        DEFAULT_TOKEN_URI.to_string()
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "TokenResponse::default_expires_in")]
    expires_in: u64,
}

impl TokenResponse {
    const fn default_expires_in() -> u64 {
        3600
    }
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// Exchanges a signed JWT assertion for a short-lived access token and keeps
/// the token until shortly before it expires.
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    client: Client,
    cached: RwLock<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read service account key {}", path.display()))?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse service account key {}", path.display()))?;
        Self::from_key(key)
    }

    pub fn from_key(key: ServiceAccountKey) -> Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("service account private key is not a valid RSA PEM key")?;

        let client = Client::builder()
            .user_agent(concat!("sitelens/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client for token exchange")?;

        Ok(Self {
            key,
            signing_key,
            client,
            cached: RwLock::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn assertion(&self) -> BackendResult<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: READONLY_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| BackendError::Auth(format!("failed to sign token assertion: {e}")))
    }

    async fn exchange(&self) -> BackendResult<CachedToken> {
        let body = format!("grant_type={JWT_BEARER_GRANT}&assertion={}", self.assertion()?);

        let response = self
            .client
            .post(&self.key.token_uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(BackendError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = token_error_detail(&text).unwrap_or_else(|| format!("HTTP {status}"));
            return Err(if status.is_server_error() {
                BackendError::Transient(format!("token endpoint failed: {detail}"))
            } else {
                BackendError::Auth(format!("token exchange refused: {detail}"))
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Auth(format!("unreadable token response: {e}")))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        Ok(CachedToken {
            token: token.access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }
}

fn token_error_detail(body: &str) -> Option<String> {
    let parsed: TokenErrorResponse = serde_json::from_str(body).ok()?;
    match (parsed.error, parsed.error_description) {
        (Some(error), Some(description)) => Some(format!("{error}: {description}")),
        (Some(error), None) => Some(error),
        (None, description) => description,
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> BackendResult<String> {
        {
            let guard = self.cached.read().await;
            if let Some(cached) = guard.as_ref() {
                if Instant::now() < cached.refresh_at {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut guard = self.cached.write().await;
        // Another caller may have refreshed while we waited for the lock
        if let Some(cached) = guard.as_ref() {
            if Instant::now() < cached.refresh_at {
                return Ok(cached.token.clone());
            }
        }

        debug!("Refreshing service account access token");
        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *guard = Some(fresh);
        Ok(token)
    }
}
