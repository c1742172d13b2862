//! # LedgerLink Domain
//!
//! Business domain types and models for the LedgerLink SDK.
//!
//! This crate contains:
//! - Domain error types and Result definitions
//! - Service configuration structures
//! - Batch vocabulary (operation kinds, fault kinds, error details)
//! - The `Entity` trait and the business entities shipped with the SDK
//!
//! ## Architecture
//! - No dependencies on other LedgerLink crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
