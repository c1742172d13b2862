//! Domain types and models
//!
//! Batch vocabulary shared by the engine and its adapters, plus the entity
//! abstraction that lets heterogeneous business objects travel in one batch.

pub mod entities;
pub mod entity;
pub mod fault;
pub mod operation;

pub use entities::{
    Account, Bill, Customer, EmailAddress, Invoice, Item, Payment, Reference, Vendor,
};
pub use entity::{AsAny, Entity, UntypedEntity};
pub use fault::{ErrorDetail, FaultKind};
pub use operation::OperationKind;
