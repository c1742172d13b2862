//! Entity abstraction
//!
//! A batch mixes entities of different concrete types. They travel as
//! `Box<dyn Entity>` and are recovered with [`Entity::downcast_ref`]-style
//! helpers on `dyn Entity`.

use std::any::{Any, TypeId};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Upcast helper so `dyn Entity` can be inspected as `dyn Any`.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A business object that can be carried by a batch item.
///
/// Implementors are plain data types; the wire name of each type is decided
/// by the entity registry in `ledgerlink-core`, not by the type itself.
pub trait Entity: AsAny + fmt::Debug + Send + Sync {}

impl dyn Entity {
    /// `TypeId` of the concrete type behind this trait object.
    pub fn concrete_type_id(&self) -> TypeId {
        self.as_any().type_id()
    }

    pub fn is<T: Entity>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Entity returned by the service under a tag no registered type claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UntypedEntity {
    pub name: String,
    pub body: serde_json::Value,
}

impl UntypedEntity {
    pub fn new(name: impl Into<String>, body: serde_json::Value) -> Self {
        Self { name: name.into(), body }
    }
}

impl Entity for UntypedEntity {}
