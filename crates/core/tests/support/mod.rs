//! Shared test helpers for `ledgerlink-core` integration tests.

pub mod transport;

use std::sync::Arc;

use ledgerlink_core::{standard_registry, Batch, BatchEndpoint, ServiceContext};

pub use transport::RecordingTransport;

/// Batch wired to `transport` with the standard entity registry.
pub fn batch_with(transport: &Arc<RecordingTransport>) -> Batch {
    let endpoint = BatchEndpoint::new("https://sandbox.example.com/v3", "4620816365", Some(65))
        .expect("valid endpoint");
    let registry = Arc::new(standard_registry(None).expect("standard registry"));
    let context = ServiceContext::new(endpoint, registry, transport.clone());
    Batch::new(Arc::new(context))
}
