//! Batch engine errors

use ledgerlink_domain::{LedgerLinkError, OperationKind};
use thiserror::Error;

use super::fault::FaultError;

/// Failures while turning batch items into a request body
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("no entity tag registered for {entity}")]
    UnsupportedEntity { entity: String },

    #[error("failed to serialize batch item `{item_id}`: {source}")]
    Serialization {
        item_id: String,
        #[source]
        source: LedgerLinkError,
    },

    #[error("serializer produced a non-object fragment for batch item `{0}`")]
    InvalidFragment(String),

    #[error("placeholder mismatch: {0}")]
    PlaceholderMismatch(String),

    #[error("entity items without a placeholder in the request: {0:?}")]
    UnmatchedItems(Vec<String>),

    #[error("failed to encode batch envelope: {0}")]
    Envelope(String),
}

/// Errors raised by [`Batch`](super::Batch) operations
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("{0} must not be empty")]
    EmptyInput(&'static str),

    #[error("batch item id `{0}` is already in use")]
    DuplicateId(String),

    #[error("batch already holds the maximum of {limit} items")]
    BatchFull { limit: usize },

    #[error("batch item id `{0}` not found")]
    IdNotFound(String),

    #[error("operation `{0}` cannot carry an entity")]
    InvalidOperation(OperationKind),

    #[error("batch has no items to execute")]
    EmptyBatch,

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("body codec failed: {0}")]
    Codec(#[source] LedgerLinkError),

    #[error("transport failed: {0}")]
    Transport(#[source] LedgerLinkError),

    #[error("batch request returned HTTP {status}")]
    HttpStatus { status: u16, body: String },

    #[error("batch request faulted: {0}")]
    Fault(#[from] FaultError),

    #[error("unparsable batch response: {0}")]
    UnparsableResponse(String),
}

impl BatchError {
    /// Whether the error was raised before anything was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput(_)
                | Self::DuplicateId(_)
                | Self::BatchFull { .. }
                | Self::IdNotFound(_)
                | Self::InvalidOperation(_)
                | Self::EmptyBatch
                | Self::Assembly(_)
        )
    }

    /// Stable label suitable for structured logging fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EmptyInput(_) => "empty_input",
            Self::DuplicateId(_) => "duplicate_id",
            Self::BatchFull { .. } => "batch_full",
            Self::IdNotFound(_) => "id_not_found",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::EmptyBatch => "empty_batch",
            Self::Assembly(_) => "assembly",
            Self::Codec(_) => "codec",
            Self::Transport(_) => "transport",
            Self::HttpStatus { .. } => "http_status",
            Self::Fault(_) => "fault",
            Self::UnparsableResponse(_) => "unparsable_response",
        }
    }
}

impl From<BatchError> for LedgerLinkError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Codec(inner) | BatchError::Transport(inner) => inner,
            BatchError::IdNotFound(_) => Self::NotFound(err.to_string()),
            BatchError::Assembly(_) | BatchError::UnparsableResponse(_) => {
                Self::Serialization(err.to_string())
            }
            BatchError::HttpStatus { status: 401 | 403, .. } => Self::Auth(err.to_string()),
            BatchError::HttpStatus { .. } => Self::Network(err.to_string()),
            BatchError::Fault(ref fault) if fault.kind().is_security() => {
                Self::Auth(err.to_string())
            }
            BatchError::Fault(_) => Self::Internal(err.to_string()),
            BatchError::EmptyInput(_)
            | BatchError::DuplicateId(_)
            | BatchError::BatchFull { .. }
            | BatchError::InvalidOperation(_)
            | BatchError::EmptyBatch => Self::InvalidInput(err.to_string()),
        }
    }
}
