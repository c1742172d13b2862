//! Body codecs
//!
//! [`CompressionCodec`] implements the batch engine's `BodyCodec` port with
//! flate2. Only built with the `compression` feature.

pub mod compression;

pub use compression::CompressionCodec;
