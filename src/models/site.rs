use std::fmt;
use thiserror::Error;

const DOMAIN_PROPERTY_PREFIX: &str = "sc-domain:";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SiteIdError {
    #[error("URL-prefix property '{0}' is not supported; configure the domain property form 'sc-domain:<host>'")]
    UrlPrefix(String),
    #[error("site identifier '{0}' must have the form 'sc-domain:<host>'")]
    Malformed(String),
}

/// Search Console property identifier.
///
/// Only the domain-property form (`sc-domain:example.com`) is accepted. A
/// URL-prefix property reports different data for the same site, so it is
/// refused instead of being silently mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteId(String);

impl SiteId {
    pub fn parse(raw: &str) -> Result<Self, SiteIdError> {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Err(SiteIdError::UrlPrefix(raw.to_string()));
        }

        let host = lower
            .strip_prefix(DOMAIN_PROPERTY_PREFIX)
            .ok_or_else(|| SiteIdError::Malformed(raw.to_string()))?;

        if host.is_empty()
            || host.contains('/')
            || host.contains(':')
            || host.chars().any(char::is_whitespace)
        {
            return Err(SiteIdError::Malformed(raw.to_string()));
        }

        Ok(Self(format!("{DOMAIN_PROPERTY_PREFIX}{host}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn host(&self) -> &str {
        &self.0[DOMAIN_PROPERTY_PREFIX.len()..]
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
