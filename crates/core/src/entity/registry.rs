//! Explicit entity type registry
//!
//! Maps concrete Rust types to the tag the service uses for them. Types are
//! registered once at startup; lookups never guess from type names.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;

use ledgerlink_domain::constants::RESERVED_TAGS;
use ledgerlink_domain::{
    Account, Bill, Customer, Entity, Invoice, Item, LedgerLinkError, Payment, Result, Vendor,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::batch::errors::AssemblyError;

/// Wire name of a registered entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityTag {
    namespace: Option<String>,
    name: String,
}

impl EntityTag {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `prefix:Name` when a namespace is configured, otherwise `Name`.
    pub fn wire_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}:{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire_name())
    }
}

/// Registration failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(
        "invalid entity name `{0}`: must start with an ASCII letter and contain only ASCII \
         letters, digits or `_`"
    )]
    InvalidName(String),

    #[error("entity name `{0}` is reserved by the batch envelope")]
    ReservedName(String),

    #[error("entity name `{name}` is already registered for {existing}")]
    DuplicateName { name: String, existing: &'static str },

    #[error("type {0} is already registered")]
    DuplicateType(&'static str),

    #[error("invalid tag namespace `{0}`")]
    InvalidNamespace(String),
}

type EncodeFn = fn(&dyn Entity) -> Result<Value>;
type DecodeFn = fn(Value) -> Result<Box<dyn Entity>>;

#[derive(Clone)]
struct Registration {
    type_name: &'static str,
    tag: EntityTag,
    encode: EncodeFn,
    decode: DecodeFn,
}

fn encode_as<T>(entity: &dyn Entity) -> Result<Value>
where
    T: Entity + Serialize,
{
    let concrete = entity.downcast_ref::<T>().ok_or_else(|| {
        LedgerLinkError::Internal(format!("entity is not a {}", type_name::<T>()))
    })?;
    Ok(serde_json::to_value(concrete)?)
}

fn decode_as<T>(fragment: Value) -> Result<Box<dyn Entity>>
where
    T: Entity + DeserializeOwned,
{
    let concrete: T = serde_json::from_value(fragment)?;
    Ok(Box::new(concrete))
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Registry of entity types the SDK can tag, encode and decode.
#[derive(Clone, Default)]
pub struct EntityRegistry {
    namespace: Option<String>,
    entries: Vec<Registration>,
    by_type: HashMap<TypeId, usize>,
    by_name: HashMap<String, usize>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose tags render as `namespace:Name`.
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidNamespace` when the prefix is not a
    /// valid name.
    pub fn with_namespace(
        namespace: impl Into<String>,
    ) -> std::result::Result<Self, RegistryError> {
        let namespace = namespace.into();
        if !is_valid_name(&namespace) {
            return Err(RegistryError::InvalidNamespace(namespace));
        }
        Ok(Self { namespace: Some(namespace), ..Self::default() })
    }

    /// Register `T` under the logical name `name`.
    ///
    /// # Errors
    /// Fails when the name is invalid, reserved or taken, or when `T` is
    /// already registered.
    pub fn register<T>(&mut self, name: &str) -> std::result::Result<&mut Self, RegistryError>
    where
        T: Entity + Serialize + DeserializeOwned,
    {
        if !is_valid_name(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if RESERVED_TAGS.contains(&name) {
            return Err(RegistryError::ReservedName(name.to_string()));
        }
        if let Some(&index) = self.by_name.get(name) {
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
                existing: self.entries[index].type_name,
            });
        }
        let type_id = TypeId::of::<T>();
        if self.by_type.contains_key(&type_id) {
            return Err(RegistryError::DuplicateType(type_name::<T>()));
        }

        let index = self.entries.len();
        self.entries.push(Registration {
            type_name: type_name::<T>(),
            tag: EntityTag { namespace: self.namespace.clone(), name: name.to_string() },
            encode: encode_as::<T>,
            decode: decode_as::<T>,
        });
        self.by_type.insert(type_id, index);
        self.by_name.insert(name.to_string(), index);
        Ok(self)
    }

    /// Tag of the concrete type behind `entity`.
    ///
    /// # Errors
    /// Returns `AssemblyError::UnsupportedEntity` for unregistered types.
    pub fn tag(&self, entity: &dyn Entity) -> std::result::Result<&EntityTag, AssemblyError> {
        self.registration_for(entity).map(|registration| &registration.tag).ok_or_else(|| {
            AssemblyError::UnsupportedEntity { entity: describe(entity) }
        })
    }

    /// Tag registered for `T`, if any.
    pub fn tag_of<T: Entity>(&self) -> Option<&EntityTag> {
        self.by_type.get(&TypeId::of::<T>()).map(|&index| &self.entries[index].tag)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn is_registered(&self, entity: &dyn Entity) -> bool {
        self.registration_for(entity).is_some()
    }

    /// Logical names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|registration| registration.tag.name())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize `entity` with the encoder registered for its type.
    pub(crate) fn encode(&self, entity: &dyn Entity) -> Result<Value> {
        let registration = self.registration_for(entity).ok_or_else(|| {
            LedgerLinkError::Serialization(format!(
                "no encoder registered for {}",
                describe(entity)
            ))
        })?;
        (registration.encode)(entity)
    }

    /// Decode a response fragment tagged `wire_name`.
    ///
    /// Returns `Ok(None)` when no type is registered under that name. Any
    /// namespace prefix on `wire_name` is ignored.
    pub(crate) fn decode(
        &self,
        wire_name: &str,
        fragment: Value,
    ) -> Result<Option<Box<dyn Entity>>> {
        let name = logical_name(wire_name);
        match self.by_name.get(name) {
            Some(&index) => (self.entries[index].decode)(fragment).map(Some),
            None => Ok(None),
        }
    }

    fn registration_for(&self, entity: &dyn Entity) -> Option<&Registration> {
        self.by_type.get(&entity.concrete_type_id()).map(|&index| &self.entries[index])
    }
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("namespace", &self.namespace)
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

/// Strip an optional `prefix:` from a tag.
pub(crate) fn logical_name(wire_name: &str) -> &str {
    wire_name.rsplit_once(':').map_or(wire_name, |(_, name)| name)
}

fn describe(entity: &dyn Entity) -> String {
    const MAX_CHARS: usize = 80;
    let rendered = format!("{entity:?}");
    if rendered.chars().count() > MAX_CHARS {
        let truncated: String = rendered.chars().take(MAX_CHARS).collect();
        format!("{truncated}...")
    } else {
        rendered
    }
}

/// Registry holding every entity type shipped with the SDK.
///
/// # Errors
/// Only fails when `namespace` is not a valid name.
pub fn standard_registry(
    namespace: Option<&str>,
) -> std::result::Result<EntityRegistry, RegistryError> {
    let mut registry = match namespace {
        Some(ns) => EntityRegistry::with_namespace(ns)?,
        None => EntityRegistry::new(),
    };
    registry
        .register::<Customer>("Customer")?
        .register::<Vendor>("Vendor")?
        .register::<Invoice>("Invoice")?
        .register::<Item>("Item")?
        .register::<Account>("Account")?
        .register::<Payment>("Payment")?
        .register::<Bill>("Bill")?;
    Ok(registry)
}
