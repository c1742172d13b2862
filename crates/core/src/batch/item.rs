//! Batch items

use ledgerlink_domain::{Entity, OperationKind};

/// What a batch item sends: an entity or the text of a query.
#[derive(Debug)]
pub enum BatchPayload {
    Entity(Box<dyn Entity>),
    QueryText(String),
}

/// One operation inside a batch.
///
/// Items are only built by [`Batch`](super::Batch), which keeps `kind` and
/// payload consistent: `Query`/`Report` carry query text, every other kind
/// carries an entity.
#[derive(Debug)]
pub struct BatchItem {
    id: String,
    original_id: Option<String>,
    kind: OperationKind,
    payload: BatchPayload,
}

impl BatchItem {
    pub(crate) fn query(id: String, text: String, original_id: Option<String>) -> Self {
        let payload = BatchPayload::QueryText(text);
        Self { id, original_id, kind: OperationKind::Query, payload }
    }

    pub(crate) fn report(id: String, text: String, original_id: Option<String>) -> Self {
        let payload = BatchPayload::QueryText(text);
        Self { id, original_id, kind: OperationKind::Report, payload }
    }

    pub(crate) fn with_entity(id: String, entity: Box<dyn Entity>, kind: OperationKind) -> Self {
        debug_assert!(kind.carries_entity());
        Self { id, original_id: None, kind, payload: BatchPayload::Entity(entity) }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Caller-side identifier carried along for correlation only.
    pub fn original_id(&self) -> Option<&str> {
        self.original_id.as_deref()
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn payload(&self) -> &BatchPayload {
        &self.payload
    }

    pub fn entity(&self) -> Option<&dyn Entity> {
        match &self.payload {
            BatchPayload::Entity(entity) => Some(entity.as_ref()),
            BatchPayload::QueryText(_) => None,
        }
    }

    pub fn query_text(&self) -> Option<&str> {
        match &self.payload {
            BatchPayload::QueryText(text) => Some(text),
            BatchPayload::Entity(_) => None,
        }
    }
}
