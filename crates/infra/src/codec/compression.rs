//! gzip and zlib (`deflate`) body compression
//!
//! Request bodies are compressed with the configured format; responses are
//! inflated according to their own `content-encoding` header.

use std::io::{Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use ledgerlink_core::{BodyCodec, Headers};
use ledgerlink_domain::{CompressionFormat, LedgerLinkError, Result};
use tracing::debug;

use crate::errors::InfraError;

const CONTENT_ENCODING: &str = "content-encoding";
const ACCEPT_ENCODING: &str = "accept-encoding";
const SUPPORTED_ENCODINGS: &str = "gzip, deflate";

/// Compresses request bodies and inflates responses by `content-encoding`.
#[derive(Debug, Clone, Copy)]
pub struct CompressionCodec {
    format: CompressionFormat,
    level: u32,
}

impl CompressionCodec {
    /// Codec compressing requests with `format` at the default level.
    pub fn new(format: CompressionFormat) -> Self {
        Self { format, level: Compression::default().level() }
    }

    /// Override the compression level (0-9).
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.min(9);
        self
    }

    pub fn format(&self) -> CompressionFormat {
        self.format
    }

    /// Compress data
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let level = Compression::new(self.level);

        let compressed = match self.format {
            CompressionFormat::None => return Ok(data.to_vec()),
            CompressionFormat::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), level);
                encoder.write_all(data).map_err(io_error)?;
                encoder.finish().map_err(io_error)?
            }
            CompressionFormat::Deflate => {
                let mut encoder = ZlibEncoder::new(Vec::new(), level);
                encoder.write_all(data).map_err(io_error)?;
                encoder.finish().map_err(io_error)?
            }
        };
        Ok(compressed)
    }

    /// Decompress data encoded with `format`
    pub fn decompress(format: CompressionFormat, data: &[u8]) -> Result<Vec<u8>> {
        let mut decompressed = Vec::new();
        match format {
            CompressionFormat::None => return Ok(data.to_vec()),
            CompressionFormat::Gzip => {
                GzDecoder::new(data).read_to_end(&mut decompressed).map_err(io_error)?;
            }
            CompressionFormat::Deflate => {
                ZlibDecoder::new(data).read_to_end(&mut decompressed).map_err(io_error)?;
            }
        }
        Ok(decompressed)
    }
}

fn io_error(err: std::io::Error) -> LedgerLinkError {
    InfraError::from(err).into()
}

fn parse_content_encoding(value: &str) -> Result<CompressionFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "identity" => Ok(CompressionFormat::None),
        "gzip" | "x-gzip" => Ok(CompressionFormat::Gzip),
        "deflate" => Ok(CompressionFormat::Deflate),
        other => Err(LedgerLinkError::Serialization(format!(
            "unsupported content-encoding `{other}`"
        ))),
    }
}

impl BodyCodec for CompressionCodec {
    fn encode(&self, headers: &mut Headers, body: Vec<u8>) -> Result<Vec<u8>> {
        headers.insert(ACCEPT_ENCODING, SUPPORTED_ENCODINGS);
        if self.format == CompressionFormat::None || body.is_empty() {
            return Ok(body);
        }

        let compressed = self.compress(&body)?;
        debug!(
            format = %self.format,
            before = body.len(),
            after = compressed.len(),
            "Compressed request body"
        );
        headers.insert(CONTENT_ENCODING, self.format.as_wire_str());
        Ok(compressed)
    }

    fn decode(&self, headers: &Headers, body: Vec<u8>) -> Result<Vec<u8>> {
        let format = match headers.get(CONTENT_ENCODING) {
            Some(value) => parse_content_encoding(value)?,
            None => CompressionFormat::None,
        };
        if format == CompressionFormat::None || body.is_empty() {
            return Ok(body);
        }
        Self::decompress(format, &body)
    }
}
