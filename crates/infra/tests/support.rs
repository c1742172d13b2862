//! Shared fixtures for `ledgerlink-infra` integration tests.

use std::sync::Arc;

use ledgerlink_domain::{CompressionFormat, ServiceConfig};
use ledgerlink_infra::{DataService, StaticTokenProvider};
use wiremock::MockServer;

pub const REALM_ID: &str = "4620816365";
pub const TOKEN: &str = "test-access-token";

/// Configuration pointing at `server` with the given compression.
pub fn config_for(server: &MockServer, compression: CompressionFormat) -> ServiceConfig {
    let mut config = ServiceConfig::new(REALM_ID);
    config.base_url = format!("{}/v3", server.uri());
    config.minor_version = Some(65);
    config.compression = compression;
    config.http.timeout_secs = 5;
    config
}

/// Data service talking to `server` over real HTTP.
pub fn service_for(server: &MockServer, compression: CompressionFormat) -> DataService {
    let tokens = Arc::new(StaticTokenProvider::new(TOKEN).expect("token"));
    DataService::with_standard_registry(config_for(server, compression), tokens)
        .expect("data service")
}
