//! Operations a batch item can request

use serde::{Deserialize, Serialize};

use crate::impl_wire_enum_conversions;

/// Operation performed by one batch item.
///
/// `Query` and `Report` carry query text; every other kind carries an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "update")]
    Update,
    #[serde(rename = "sparse update")]
    SparseUpdate,
    #[serde(rename = "delete")]
    Delete,
    #[serde(rename = "void")]
    Void,
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "report")]
    Report,
}

impl_wire_enum_conversions!(OperationKind {
    Create => "create",
    Update => "update",
    SparseUpdate => "sparse update",
    Delete => "delete",
    Void => "void",
    Query => "query",
    Report => "report",
});

impl OperationKind {
    /// Whether items of this kind carry an entity payload.
    pub fn carries_entity(&self) -> bool {
        !matches!(self, Self::Query | Self::Report)
    }
}
