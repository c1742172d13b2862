//! HTTP adapters
//!
//! A retrying reqwest client plus the [`HttpTransport`] that implements the
//! batch engine's `Transport` port on top of it.

pub mod auth;
pub mod client;
pub mod transport;

pub use auth::{AccessTokenProvider, StaticTokenProvider};
pub use client::{HttpClient, HttpClientBuilder, RetryPolicy};
pub use transport::HttpTransport;
