//! Service endpoint configuration.
//!
//! Base URLs are validated once at the boundary; the rest of the core only
//! ever joins fixed paths onto a [`ValidatedUrl`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid service url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// An absolute http(s) base URL with any trailing slash removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidatedUrl(String);

impl ValidatedUrl {
    pub fn new(raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        let parsed = Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(ConfigError::InvalidUrl {
                url: raw,
                reason: format!("unsupported scheme `{scheme}`"),
            });
        }
        if parsed.host_str().is_none() {
            return Err(ConfigError::InvalidUrl {
                url: raw,
                reason: "missing host".into(),
            });
        }

        Ok(Self(raw.trim_end_matches('/').to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join an absolute path (starting with `/`) onto the base.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}{path}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    pub chat_base: ValidatedUrl,
    pub translate_base: ValidatedUrl,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            chat_base: ValidatedUrl::new(crate::DEFAULT_CHAT_BASE_URL)
                .expect("default chat base url is valid"),
            translate_base: ValidatedUrl::new(crate::DEFAULT_TRANSLATE_BASE_URL)
                .expect("default translate base url is valid"),
        }
    }
}

impl ServiceConfig {
    #[must_use]
    pub fn chat_completions_url(&self) -> String {
        self.chat_base.join("/chat/completions")
    }

    #[must_use]
    pub fn model_url(&self) -> String {
        self.chat_base.join("/model")
    }

    #[must_use]
    pub fn translate_url(&self) -> String {
        self.translate_base.join("/api/translate/")
    }
}
