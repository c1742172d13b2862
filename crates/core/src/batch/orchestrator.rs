//! Batch orchestration
//!
//! A [`Batch`] collects up to [`MAX_BATCH_ITEMS`] operations, sends them as
//! one request and keeps the per-item results of its last execution.

use std::sync::Arc;

use ledgerlink_domain::constants::{CONTENT_TYPE_JSON, MAX_BATCH_ITEMS};
use ledgerlink_domain::{Entity, OperationKind};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::assembler::RequestAssembler;
use super::context::ServiceContext;
use super::correlator::{self, ResponseCorrelator};
use super::errors::BatchError;
use super::item::BatchItem;
use super::result::{BatchItemResult, BatchResults};
use crate::transport::{Headers, HttpMethod, TransportRequest};

/// Longest response excerpt kept in [`BatchError::HttpStatus`].
const ERROR_BODY_EXCERPT_CHARS: usize = 512;

/// An ordered set of operations sent in a single request.
#[derive(Debug)]
pub struct Batch {
    context: Arc<ServiceContext>,
    items: Vec<BatchItem>,
    results: BatchResults,
}

impl Batch {
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context, items: Vec::new(), results: BatchResults::default() }
    }

    /// Queue a query.
    ///
    /// # Errors
    /// `EmptyInput` for a blank query or id, `DuplicateId`, `BatchFull`.
    pub fn add_query(
        &mut self,
        query: &str,
        id: &str,
        original_id: Option<&str>,
    ) -> Result<(), BatchError> {
        if query.trim().is_empty() {
            return Err(BatchError::EmptyInput("query"));
        }
        self.check_new_id(id)?;
        let original_id = original_id.map(str::to_string);
        self.items.push(BatchItem::query(id.to_string(), query.to_string(), original_id));
        Ok(())
    }

    /// Queue a report request; `report` is the report name plus its query
    /// string, e.g. `ProfitAndLoss?date_macro=This Fiscal Year`.
    ///
    /// # Errors
    /// Same as [`Batch::add_query`].
    pub fn add_report(
        &mut self,
        report: &str,
        id: &str,
        original_id: Option<&str>,
    ) -> Result<(), BatchError> {
        if report.trim().is_empty() {
            return Err(BatchError::EmptyInput("report query"));
        }
        self.check_new_id(id)?;
        let original_id = original_id.map(str::to_string);
        self.items.push(BatchItem::report(id.to_string(), report.to_string(), original_id));
        Ok(())
    }

    /// Queue an entity operation.
    ///
    /// # Errors
    /// `EmptyInput` for a blank id, `InvalidOperation` for query/report
    /// kinds, `DuplicateId`, `BatchFull`.
    pub fn add_entity<E: Entity>(
        &mut self,
        entity: E,
        id: &str,
        operation: OperationKind,
    ) -> Result<(), BatchError> {
        self.add_boxed_entity(Box::new(entity), id, operation)
    }

    /// [`Batch::add_entity`] for an already type-erased entity.
    pub fn add_boxed_entity(
        &mut self,
        entity: Box<dyn Entity>,
        id: &str,
        operation: OperationKind,
    ) -> Result<(), BatchError> {
        if id.trim().is_empty() {
            return Err(BatchError::EmptyInput("id"));
        }
        if !operation.carries_entity() {
            return Err(BatchError::InvalidOperation(operation));
        }
        self.check_new_id(id)?;
        self.items.push(BatchItem::with_entity(id.to_string(), entity, operation));
        Ok(())
    }

    /// Remove the item with `id` along with any result it had.
    ///
    /// # Errors
    /// `IdNotFound` when no item has that id.
    pub fn remove(&mut self, id: &str) -> Result<(), BatchError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| BatchError::IdNotFound(id.to_string()))?;
        self.items.remove(index);
        self.results.remove(id);
        Ok(())
    }

    /// Drop every item and result.
    pub fn remove_all(&mut self) {
        self.items.clear();
        self.results.clear();
    }

    /// Send every queued item in one request and store the results.
    ///
    /// Results of a previous execution are discarded first; when this returns
    /// an error there are no results.
    ///
    /// # Errors
    /// `EmptyBatch`, `Assembly`, `Codec`, `Transport`, `HttpStatus`, `Fault`
    /// or `UnparsableResponse`.
    #[instrument(skip(self), fields(item_count = self.items.len()))]
    pub async fn execute(&mut self) -> Result<&BatchResults, BatchError> {
        self.results.clear();
        if self.items.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        let request_id = Uuid::new_v4().simple().to_string();
        info!(request_id = %request_id, "Executing batch");

        let results = match self.submit(&request_id).await {
            Ok(results) => results,
            Err(err) => {
                warn!(
                    request_id = %request_id,
                    error = %err,
                    kind = err.label(),
                    "Batch execution failed"
                );
                return Err(err);
            }
        };

        info!(
            request_id = %request_id,
            result_count = results.len(),
            fault_count = results.faults().count(),
            "Batch executed"
        );
        self.results = results;
        Ok(&self.results)
    }

    async fn submit(&self, request_id: &str) -> Result<BatchResults, BatchError> {
        let context = self.context.as_ref();

        let assembler = RequestAssembler::new(context.registry(), context.serializer());
        let body = assembler.assemble(&self.items)?;
        debug!(bytes = body.len(), "Assembled batch request");

        let mut headers = Headers::new();
        headers.insert("content-type", CONTENT_TYPE_JSON);
        headers.insert("accept", CONTENT_TYPE_JSON);
        headers.insert("user-agent", context.user_agent());
        let body = context.codec().encode(&mut headers, body).map_err(BatchError::Codec)?;

        let request = TransportRequest {
            uri: context.endpoint().batch_uri(request_id),
            method: HttpMethod::Post,
            headers,
            body,
        };
        let response = context.transport().send(request).await.map_err(BatchError::Transport)?;

        let status = response.status;
        let body =
            context.codec().decode(&response.headers, response.body).map_err(BatchError::Codec)?;
        debug!(status, bytes = body.len(), "Received batch response");

        if !(200..300).contains(&status) {
            if let Some(fault) = correlator::top_level_fault(&body) {
                return Err(BatchError::Fault(fault));
            }
            let excerpt =
                String::from_utf8_lossy(&body).chars().take(ERROR_BODY_EXCERPT_CHARS).collect();
            return Err(BatchError::HttpStatus { status, body: excerpt });
        }

        let mut results = BatchResults::default();
        for entry in ResponseCorrelator::new(context.serializer()).correlate(&body)? {
            if self.contains(&entry.id) {
                results.push(entry);
            } else {
                warn!(batch_item_id = %entry.id, "Dropping response for an id not in this batch");
            }
        }
        Ok(results)
    }

    /// Result for `id` from the last successful execution.
    pub fn get_result(&self, id: &str) -> Option<&BatchItemResult> {
        self.results.get(id)
    }

    pub fn results(&self) -> &BatchResults {
        &self.results
    }

    /// Items in wire order.
    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    pub fn original_id(&self, id: &str) -> Option<&str> {
        self.items.iter().find(|item| item.id() == id).and_then(BatchItem::original_id)
    }

    pub fn context(&self) -> &Arc<ServiceContext> {
        &self.context
    }

    fn check_new_id(&self, id: &str) -> Result<(), BatchError> {
        if id.trim().is_empty() {
            return Err(BatchError::EmptyInput("id"));
        }
        if self.contains(id) {
            return Err(BatchError::DuplicateId(id.to_string()));
        }
        if self.items.len() >= MAX_BATCH_ITEMS {
            return Err(BatchError::BatchFull { limit: MAX_BATCH_ITEMS });
        }
        Ok(())
    }
}
