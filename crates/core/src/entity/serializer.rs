//! Entity serializer port and its registry-backed implementation

use std::sync::Arc;

use ledgerlink_domain::{Entity, Result, UntypedEntity};
use serde_json::Value;

use super::registry::{logical_name, EntityRegistry};

/// Converts entities to and from wire fragments.
///
/// A fragment is the JSON object that sits under an entity tag. Tags are
/// handled by the caller; the serializer only sees the body.
pub trait EntitySerializer: Send + Sync {
    /// Serialize `entity` into a wire fragment.
    fn to_wire(&self, entity: &dyn Entity) -> Result<Value>;

    /// Deserialize a response fragment found under `tag`.
    fn from_wire(&self, tag: &str, fragment: Value) -> Result<Box<dyn Entity>>;
}

/// Serializer that dispatches to the serde impls recorded in an
/// [`EntityRegistry`]. Fragments under unknown tags come back as
/// [`UntypedEntity`].
#[derive(Debug, Clone)]
pub struct RegistrySerializer {
    registry: Arc<EntityRegistry>,
}

impl RegistrySerializer {
    pub fn new(registry: Arc<EntityRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }
}

impl EntitySerializer for RegistrySerializer {
    fn to_wire(&self, entity: &dyn Entity) -> Result<Value> {
        self.registry.encode(entity)
    }

    fn from_wire(&self, tag: &str, fragment: Value) -> Result<Box<dyn Entity>> {
        match self.registry.decode(tag, fragment.clone())? {
            Some(entity) => Ok(entity),
            None => Ok(Box::new(UntypedEntity::new(logical_name(tag), fragment))),
        }
    }
}
