use anyhow::Context;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::backend::search_console::DEFAULT_API_BASE;
use crate::models::{OutputFormat, SiteId};

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub cache: CacheConfig,
    pub query: QueryPolicy,
    pub api_server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub site_id: SiteId,
    /// Stripped from page keys when rendering, e.g. `https://www.example.com`
    pub site_root: Option<String>,
    pub api_base: String,
    pub credentials: CredentialSource,
    pub request_timeout_secs: u64,
}

#[derive(Clone)]
pub enum CredentialSource {
    ServiceAccountFile(PathBuf),
    AccessToken(String),
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::ServiceAccountFile(path) => {
                f.debug_tuple("ServiceAccountFile").field(path).finish()
            }
            CredentialSource::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

/// Defaults and bounds applied when a tool call becomes a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPolicy {
    pub default_days: u32,
    /// Longest look-back accepted for `daysAgo`
    pub max_days: u32,
    pub default_limit: u32,
    /// Hard ceiling on rows per query
    pub max_limit: u32,
    pub default_format: OutputFormat,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            default_days: 7,
            max_days: 540,
            default_limit: 10,
            max_limit: 50,
            default_format: OutputFormat::Csv,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Accepted `X-API-Key` values; empty disables the check
    pub api_keys: Vec<String>,
}

impl CacheConfig {
    const fn default_ttl_secs() -> u64 {
        3600
    }
}

impl BackendConfig {
    const fn default_request_timeout_secs() -> u64 {
        30
    }
}

impl QueryPolicy {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let default_days = parse_or(&lookup, "SITELENS_DEFAULT_DAYS", defaults.default_days)?;
        let max_days = parse_or(&lookup, "SITELENS_MAX_DAYS", defaults.max_days)?;
        let max_limit = parse_or(&lookup, "SITELENS_MAX_LIMIT", defaults.max_limit)?;
        let default_limit = parse_or(&lookup, "SITELENS_DEFAULT_LIMIT", defaults.default_limit)?;
        let default_format = match lookup("SITELENS_DEFAULT_FORMAT") {
            Some(raw) => raw
                .parse::<OutputFormat>()
                .context("SITELENS_DEFAULT_FORMAT must be csv or markdown")?,
            None => defaults.default_format,
        };

        if default_days == 0 {
            anyhow::bail!("SITELENS_DEFAULT_DAYS must be at least 1");
        }
        if max_days == 0 {
            anyhow::bail!("SITELENS_MAX_DAYS must be at least 1");
        }
        if max_limit == 0 {
            anyhow::bail!("SITELENS_MAX_LIMIT must be at least 1");
        }

        Ok(Self {
            default_days: default_days.min(max_days),
            max_days,
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
            default_format,
        })
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let raw_site = lookup("SITELENS_SITE_ID").context("SITELENS_SITE_ID must be set")?;
        let site_id = SiteId::parse(&raw_site).context("SITELENS_SITE_ID is invalid")?;

        let site_root = lookup("SITELENS_SITE_ROOT")
            .map(|root| root.trim().trim_end_matches('/').to_string())
            .filter(|root| !root.is_empty());

        let api_base = lookup("SITELENS_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let credentials = match lookup("SITELENS_ACCESS_TOKEN").filter(|t| !t.trim().is_empty()) {
            Some(token) => CredentialSource::AccessToken(token.trim().to_string()),
            None => CredentialSource::ServiceAccountFile(PathBuf::from(
                lookup("SITELENS_CREDENTIALS_FILE")
                    .unwrap_or_else(|| "service_account.json".to_string()),
            )),
        };

        let request_timeout_secs = parse_or(
            &lookup,
            "SITELENS_REQUEST_TIMEOUT_SECS",
            BackendConfig::default_request_timeout_secs(),
        )?;
        if request_timeout_secs == 0 {
            anyhow::bail!("SITELENS_REQUEST_TIMEOUT_SECS must be at least 1");
        }

        let ttl_secs = parse_or(&lookup, "SITELENS_CACHE_TTL_SECS", CacheConfig::default_ttl_secs())?;

        let query = QueryPolicy::from_lookup(&lookup)?;

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let api_port = lookup("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .context("API_PORT must be a port number")?;

        let api_keys = lookup("SITELENS_API_KEYS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            backend: BackendConfig {
                site_id,
                site_root,
                api_base,
                credentials,
                request_timeout_secs,
            },
            cache: CacheConfig { ttl_secs },
            query,
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
                api_keys,
            },
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
