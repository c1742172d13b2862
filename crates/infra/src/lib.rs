//! # LedgerLink Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest-based HTTP client and `Transport` adapter
//! - Body compression (flate2), behind the `compression` feature
//! - Configuration loading from the environment and JSON/TOML files
//! - Tracing subscriber setup
//! - The `DataService` that wires everything into a batch context
//!
//! ## Architecture
//! - Implements traits defined in `ledgerlink-core`
//! - Contains all "impure" code (network, filesystem, global subscribers)

#[cfg(feature = "compression")]
pub mod codec;
pub mod config;
pub mod errors;
pub mod http;
pub mod logging;
pub mod service;

// Re-export commonly used items
#[cfg(feature = "compression")]
pub use codec::CompressionCodec;
pub use errors::InfraError;
pub use http::{AccessTokenProvider, HttpClient, HttpTransport, StaticTokenProvider};
pub use logging::init_tracing;
pub use service::DataService;
