use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{AnalyticsRow, SearchAnalyticsQuery};

/// Failures of a single analytics read. The backend's own message is kept.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("authorization failed: {0}")]
    Auth(String),
    #[error("quota exceeded: {0}")]
    Quota(String),
    #[error("analytics service unavailable: {0}")]
    Transient(String),
    #[error("request rejected by analytics service: {0}")]
    Rejected(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Error reasons the Google APIs use for rate and quota limits
const QUOTA_REASONS: &[&str] = &[
    "quotaExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "dailyLimitExceeded",
    "RESOURCE_EXHAUSTED",
    "RATE_LIMIT_EXCEEDED",
];

impl BackendError {
    /// Classify a non-success HTTP response
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<GoogleErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error);

        let (message, quota) = match parsed {
            Some(error) => {
                let quota = error
                    .status
                    .iter()
                    .chain(error.errors.iter().filter_map(|e| e.reason.as_ref()))
                    .any(|reason| QUOTA_REASONS.contains(&reason.as_str()));
                let message = error
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| format!("HTTP {status}"));
                (message, quota)
            }
            None => {
                let trimmed = body.trim();
                let message = if trimmed.is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status}: {trimmed}")
                };
                (message, false)
            }
        };

        match status {
            429 => BackendError::Quota(message),
            401 | 403 if quota => BackendError::Quota(message),
            401 | 403 => BackendError::Auth(message),
            500..=599 => BackendError::Transient(message),
            _ => BackendError::Rejected(message),
        }
    }

    /// Classify a failure to reach the backend at all
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Transient(format!("request timed out: {err}"))
        } else {
            BackendError::Transient(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: Option<GoogleError>,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    errors: Vec<GoogleErrorItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorItem {
    reason: Option<String>,
}

/// Read-only search analytics source
#[async_trait]
pub trait AnalyticsBackend: Send + Sync {
    /// Run one query. Exactly one upstream call, no retries.
    async fn query(&self, request: &SearchAnalyticsQuery) -> BackendResult<Vec<AnalyticsRow>>;
}
