//! Data service wiring
//!
//! [`DataService`] turns a [`ServiceConfig`] into a shared
//! [`ServiceContext`] and hands out batches that use it.

use std::sync::Arc;
use std::time::Duration;

use ledgerlink_core::{
    standard_registry, Batch, BatchEndpoint, BodyCodec, EntityRegistry, IdentityCodec,
    ServiceContext, Transport,
};
use ledgerlink_domain::{CompressionFormat, LedgerLinkError, Result, ServiceConfig};
use tracing::info;

use crate::http::{AccessTokenProvider, HttpClient, HttpTransport};

/// Entry point for talking to one company on the accounting platform.
#[derive(Debug, Clone)]
pub struct DataService {
    config: ServiceConfig,
    context: Arc<ServiceContext>,
}

impl DataService {
    /// Service sending requests over HTTP with tokens from `tokens`.
    ///
    /// # Errors
    /// Returns `LedgerLinkError::Config` for invalid configuration, a
    /// registry whose namespace disagrees with `config.tag_namespace`, or a
    /// compression format this build cannot produce.
    pub fn new(
        config: ServiceConfig,
        registry: EntityRegistry,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .max_attempts(config.http.max_attempts)
            .user_agent(config.http.user_agent.clone())
            .build()?;
        let transport = Arc::new(HttpTransport::new(client, tokens));
        Self::with_transport(config, registry, transport)
    }

    /// [`DataService::new`] with the registry of shipped entities, namespaced
    /// per `config.tag_namespace`.
    pub fn with_standard_registry(
        config: ServiceConfig,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        let registry = standard_registry(config.tag_namespace.as_deref())
            .map_err(|e| LedgerLinkError::Config(e.to_string()))?;
        Self::new(config, registry, tokens)
    }

    /// Service over an arbitrary transport.
    pub fn with_transport(
        config: ServiceConfig,
        registry: EntityRegistry,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        config.validate()?;
        if registry.namespace() != config.tag_namespace.as_deref() {
            return Err(LedgerLinkError::Config(format!(
                "registry namespace {:?} does not match tag_namespace {:?}",
                registry.namespace(),
                config.tag_namespace
            )));
        }

        let endpoint = BatchEndpoint::from_config(&config)?;
        let codec = codec_for(config.compression)?;
        let context = ServiceContext::new(endpoint, Arc::new(registry), transport)
            .with_codec(codec)
            .with_user_agent(config.http.user_agent.clone());

        info!(
            realm_id = %config.realm_id,
            base_url = %config.base_url,
            compression = %config.compression,
            "Data service configured"
        );
        Ok(Self { config, context: Arc::new(context) })
    }

    /// New, empty batch sharing this service's context.
    pub fn batch(&self) -> Batch {
        Batch::new(Arc::clone(&self.context))
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn context(&self) -> &Arc<ServiceContext> {
        &self.context
    }
}

#[cfg(feature = "compression")]
fn codec_for(format: CompressionFormat) -> Result<Arc<dyn BodyCodec>> {
    let codec: Arc<dyn BodyCodec> = match format {
        CompressionFormat::None => Arc::new(IdentityCodec),
        format => Arc::new(crate::codec::CompressionCodec::new(format)),
    };
    Ok(codec)
}

#[cfg(not(feature = "compression"))]
fn codec_for(format: CompressionFormat) -> Result<Arc<dyn BodyCodec>> {
    match format {
        CompressionFormat::None => Ok(Arc::new(IdentityCodec)),
        other => Err(LedgerLinkError::Config(format!(
            "compression `{other}` requires the `compression` feature"
        ))),
    }
}
