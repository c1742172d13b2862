//! Access token providers
//!
//! Acquiring and refreshing OAuth tokens is left to the application; the
//! transport only asks for a currently valid bearer token per request.

use std::fmt;

use async_trait::async_trait;
use ledgerlink_domain::{LedgerLinkError, Result};

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token
    ///
    /// Implementations should refresh the token when needed.
    async fn access_token(&self) -> Result<String>;
}

/// Provider returning a fixed token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// # Errors
    /// Returns `LedgerLinkError::Auth` for a blank token.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(LedgerLinkError::Auth("access token must not be empty".into()));
        }
        Ok(Self { token })
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenProvider").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}
