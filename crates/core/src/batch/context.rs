//! Shared, immutable collaborators of every batch

use std::fmt;
use std::sync::Arc;

use ledgerlink_domain::constants::DEFAULT_USER_AGENT;
use ledgerlink_domain::{LedgerLinkError, Result, ServiceConfig};
use url::Url;

use crate::entity::{EntityRegistry, EntitySerializer, RegistrySerializer};
use crate::transport::{BodyCodec, IdentityCodec, Transport};

/// Where batch requests for one company are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEndpoint {
    base_url: Url,
    realm_id: String,
    minor_version: Option<u32>,
}

impl BatchEndpoint {
    /// # Errors
    /// Returns `LedgerLinkError::Config` for an unparsable or non-HTTP base
    /// URL, or a blank realm.
    pub fn new(base_url: &str, realm_id: &str, minor_version: Option<u32>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| LedgerLinkError::Config(format!("invalid base_url `{base_url}`: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(LedgerLinkError::Config(format!(
                "base_url `{base_url}` must be an http(s) URL"
            )));
        }
        if realm_id.trim().is_empty() {
            return Err(LedgerLinkError::Config("realm_id must not be empty".into()));
        }
        Ok(Self { base_url, realm_id: realm_id.trim().to_string(), minor_version })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(&config.base_url, &config.realm_id, config.minor_version)
    }

    pub fn realm_id(&self) -> &str {
        &self.realm_id
    }

    pub fn minor_version(&self) -> Option<u32> {
        self.minor_version
    }

    /// `{base}/company/{realm}/batch?requestid={id}[&minorversion=N]`
    pub fn batch_uri(&self, request_id: &str) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["company", self.realm_id.as_str(), "batch"]);
        }
        url.set_query(None);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("requestid", request_id);
            if let Some(minor_version) = self.minor_version {
                query.append_pair("minorversion", &minor_version.to_string());
            }
        }
        url.into()
    }
}

/// Everything a [`Batch`](super::Batch) needs besides its own items.
///
/// Built once per service and shared between batches behind an `Arc`.
#[derive(Clone)]
pub struct ServiceContext {
    endpoint: BatchEndpoint,
    registry: Arc<EntityRegistry>,
    serializer: Arc<dyn EntitySerializer>,
    transport: Arc<dyn Transport>,
    codec: Arc<dyn BodyCodec>,
    user_agent: String,
}

impl ServiceContext {
    /// Context using the registry-backed serializer and no body compression.
    pub fn new(
        endpoint: BatchEndpoint,
        registry: Arc<EntityRegistry>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            endpoint,
            serializer: Arc::new(RegistrySerializer::new(registry.clone())),
            registry,
            transport,
            codec: Arc::new(IdentityCodec),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn EntitySerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn BodyCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn endpoint(&self) -> &BatchEndpoint {
        &self.endpoint
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn serializer(&self) -> &dyn EntitySerializer {
        self.serializer.as_ref()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn codec(&self) -> &dyn BodyCodec {
        self.codec.as_ref()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContext")
            .field("endpoint", &self.endpoint)
            .field("registry", &self.registry)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}
