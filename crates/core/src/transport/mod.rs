//! Transport and body codec ports
//!
//! The batch engine never talks HTTP or compression directly. Adapters in
//! `ledgerlink-infra` implement these traits.

pub mod headers;
pub mod ports;

pub use headers::Headers;
pub use ports::{
    BodyCodec, HttpMethod, IdentityCodec, Transport, TransportRequest, TransportResponse,
};
