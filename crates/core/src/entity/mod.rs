//! Entity tagging and serialization
//!
//! The registry decides the wire name of every entity type the SDK can send
//! or receive; the serializer port turns entities into wire fragments and
//! back.

pub mod registry;
pub mod serializer;

pub use registry::{standard_registry, EntityRegistry, EntityTag, RegistryError};
pub use serializer::{EntitySerializer, RegistrySerializer};
