//! # LedgerLink Core
//!
//! Batch orchestration engine - no infrastructure dependencies.
//!
//! This crate contains:
//! - The entity registry that decides wire tags
//! - Request assembly and response correlation
//! - Fault translation into a typed error taxonomy
//! - Port interfaces (traits) for transport, body codecs and serialization
//!
//! ## Architecture Principles
//! - Only depends on `ledgerlink-domain`
//! - No HTTP, compression or filesystem code
//! - All external collaborators via traits

pub mod batch;
pub mod entity;
pub mod transport;

pub use batch::{
    AssemblyError, Batch, BatchEndpoint, BatchError, BatchItem, BatchItemResult, BatchResults,
    FaultError, ServiceContext,
};
pub use entity::{standard_registry, EntityRegistry, EntitySerializer, RegistrySerializer};
pub use transport::{
    BodyCodec, Headers, HttpMethod, IdentityCodec, Transport, TransportRequest, TransportResponse,
};
