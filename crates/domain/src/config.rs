//! Service configuration structures
//!
//! These types only describe configuration. Loading them from the
//! environment or from disk is the job of `ledgerlink-infra`.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_HTTP_MAX_ATTEMPTS, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use crate::impl_wire_enum_conversions;
use crate::{LedgerLinkError, Result};

/// Body compression applied to batch requests and accepted on responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionFormat {
    #[default]
    None,
    Gzip,
    Deflate,
}

impl_wire_enum_conversions!(CompressionFormat {
    None => "none",
    Gzip => "gzip",
    Deflate => "deflate",
});

/// HTTP adapter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    /// Total attempts made by the HTTP adapter (initial try + retries).
    pub max_attempts: usize,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Connection settings for one company (realm) on the accounting platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub realm_id: String,
    #[serde(default)]
    pub minor_version: Option<u32>,
    #[serde(default)]
    pub compression: CompressionFormat,
    /// Optional namespace prefix rendered in front of entity tags.
    #[serde(default)]
    pub tag_namespace: Option<String>,
    #[serde(default)]
    pub http: HttpSettings,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ServiceConfig {
    /// Configuration with defaults for everything except the realm.
    pub fn new(realm_id: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            realm_id: realm_id.into(),
            minor_version: None,
            compression: CompressionFormat::default(),
            tag_namespace: None,
            http: HttpSettings::default(),
        }
    }

    /// Reject configurations the batch engine cannot address.
    ///
    /// # Errors
    /// Returns `LedgerLinkError::Config` when the base URL or realm is blank,
    /// the namespace is blank, or the HTTP settings are zero.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(LedgerLinkError::Config("base_url must not be empty".into()));
        }
        if self.realm_id.trim().is_empty() {
            return Err(LedgerLinkError::Config("realm_id must not be empty".into()));
        }
        if matches!(&self.tag_namespace, Some(ns) if ns.trim().is_empty()) {
            return Err(LedgerLinkError::Config("tag_namespace must not be blank".into()));
        }
        if self.http.timeout_secs == 0 {
            return Err(LedgerLinkError::Config("http.timeout_secs must be positive".into()));
        }
        if self.http.max_attempts == 0 {
            return Err(LedgerLinkError::Config("http.max_attempts must be positive".into()));
        }
        Ok(())
    }
}
