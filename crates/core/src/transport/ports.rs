//! Port interfaces for sending batch requests

use std::fmt;

use async_trait::async_trait;
use ledgerlink_domain::{LedgerLinkError, Result};

use super::headers::Headers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request ready for the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub uri: String,
    pub method: HttpMethod,
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// Raw response as received from the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub headers: Headers,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Authenticated request channel to the accounting service.
///
/// Implementations return `Ok` for every response that reached the client,
/// whatever its status; only failures to obtain a response are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Request/response body transformation (compression).
pub trait BodyCodec: Send + Sync {
    /// Transform an outgoing body, updating request headers to describe it.
    fn encode(&self, headers: &mut Headers, body: Vec<u8>) -> Result<Vec<u8>>;

    /// Transform an incoming body according to the response headers.
    fn decode(&self, headers: &Headers, body: Vec<u8>) -> Result<Vec<u8>>;
}

/// Codec that leaves bodies untouched.
///
/// Responses announcing a `content-encoding` other than `identity` are
/// rejected since nothing here can undo them.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl BodyCodec for IdentityCodec {
    fn encode(&self, _headers: &mut Headers, body: Vec<u8>) -> Result<Vec<u8>> {
        Ok(body)
    }

    fn decode(&self, headers: &Headers, body: Vec<u8>) -> Result<Vec<u8>> {
        match headers.get("content-encoding").map(str::trim) {
            None | Some("") => Ok(body),
            Some(encoding) if encoding.eq_ignore_ascii_case("identity") => Ok(body),
            Some(encoding) => Err(LedgerLinkError::Serialization(format!(
                "unsupported content-encoding `{encoding}`"
            ))),
        }
    }
}
