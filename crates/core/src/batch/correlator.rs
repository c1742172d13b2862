//! Response correlation
//!
//! Splits an aggregate batch response into one classified result per item
//! id. An empty or malformed body is an error; an envelope without item
//! responses is an empty success.

use std::collections::HashSet;

use ledgerlink_domain::constants::{
    BATCH_ID_MEMBER, BATCH_RESPONSE_MEMBER, FAULT_MEMBER, QUERY_RESPONSE_MEMBER, REPORT_MEMBER,
};
use ledgerlink_domain::Entity;
use serde_json::{Map, Value};

use super::errors::BatchError;
use super::fault::{self, Fault, FaultError};
use super::result::{BatchItemResult, CorrelatedResult};
use crate::entity::EntitySerializer;

/// Tag given to report rows.
pub const REPORT_ROW_TAG: &str = "Row";

fn unparsable(message: impl Into<String>) -> BatchError {
    BatchError::UnparsableResponse(message.into())
}

/// Whole-batch fault carried by a response body, if any.
///
/// Used for non-2xx responses, where the body is not expected to hold item
/// responses.
pub fn top_level_fault(body: &[u8]) -> Option<FaultError> {
    let document: Value = serde_json::from_slice(body).ok()?;
    let raw = document.get(FAULT_MEMBER)?;
    let fault: Fault = serde_json::from_value(raw.clone()).ok()?;
    fault::translate(Some(&fault))
}

/// Demultiplexes a batch response body.
pub struct ResponseCorrelator<'a> {
    serializer: &'a dyn EntitySerializer,
}

impl<'a> ResponseCorrelator<'a> {
    pub fn new(serializer: &'a dyn EntitySerializer) -> Self {
        Self { serializer }
    }

    /// Parse `body` and classify every item response in server order.
    ///
    /// # Errors
    /// `UnparsableResponse` for empty or malformed bodies, `Fault` when the
    /// whole batch was rejected.
    pub fn correlate(&self, body: &[u8]) -> Result<Vec<CorrelatedResult>, BatchError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(unparsable("response body is empty"));
        }
        let document: Value =
            serde_json::from_slice(body).map_err(|e| unparsable(format!("invalid JSON: {e}")))?;
        let Value::Object(mut envelope) = document else {
            return Err(unparsable("response envelope is not a JSON object"));
        };

        if let Some(raw) = envelope.get(FAULT_MEMBER) {
            let fault: Fault = serde_json::from_value(raw.clone())
                .map_err(|e| unparsable(format!("malformed batch fault: {e}")))?;
            if let Some(error) = fault::translate(Some(&fault)) {
                return Err(BatchError::Fault(error));
            }
        }

        let fragments = match envelope.get_mut(BATCH_RESPONSE_MEMBER).map(Value::take) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(fragments)) => fragments,
            Some(_) => return Err(unparsable(format!("`{BATCH_RESPONSE_MEMBER}` is not an array"))),
        };

        let mut seen = HashSet::with_capacity(fragments.len());
        let mut results = Vec::with_capacity(fragments.len());
        for (index, fragment) in fragments.into_iter().enumerate() {
            let Value::Object(fragment) = fragment else {
                return Err(unparsable(format!("item response {index} is not an object")));
            };
            let id = match fragment.get(BATCH_ID_MEMBER) {
                Some(Value::String(id)) if !id.is_empty() => id.clone(),
                _ => {
                    return Err(unparsable(format!(
                        "item response {index} has no `{BATCH_ID_MEMBER}`"
                    )))
                }
            };
            if !seen.insert(id.clone()) {
                return Err(unparsable(format!("duplicate item response for `{id}`")));
            }

            let result = self.classify(&id, fragment)?;
            results.push(CorrelatedResult { id, result });
        }
        Ok(results)
    }

    fn classify(
        &self,
        id: &str,
        fragment: Map<String, Value>,
    ) -> Result<BatchItemResult, BatchError> {
        let mut fault = None;
        let mut query = None;
        let mut report = None;
        let mut entity_members = Vec::new();

        for (name, value) in fragment {
            match name.as_str() {
                BATCH_ID_MEMBER => {}
                FAULT_MEMBER => fault = Some(value),
                QUERY_RESPONSE_MEMBER => query = Some(value),
                REPORT_MEMBER => report = Some(value),
                _ if value.is_object() => entity_members.push((name, value)),
                _ => {}
            }
        }

        if let Some(raw) = fault {
            let fault: Fault = serde_json::from_value(raw)
                .map_err(|e| unparsable(format!("malformed fault for `{id}`: {e}")))?;
            if let Some(error) = fault::translate(Some(&fault)) {
                return Ok(BatchItemResult::Fault(error));
            }
        }

        if let Some(query) = query {
            return self.decode_query_response(id, query).map(BatchItemResult::CollectionSuccess);
        }
        if let Some(report) = report {
            return self.decode_report(id, report).map(BatchItemResult::CollectionSuccess);
        }

        let mut entities = entity_members
            .into_iter()
            .map(|(name, value)| self.decode(id, &name, value))
            .collect::<Result<Vec<_>, _>>()?;

        if entities.len() == 1 {
            if let Some(entity) = entities.pop() {
                return Ok(BatchItemResult::EntitySuccess(entity));
            }
        }
        Ok(BatchItemResult::CollectionSuccess(entities))
    }

    /// Every entity inside a query response, arrays flattened in order.
    /// Scalar members (`startPosition`, `maxResults`, `totalCount`) are paging
    /// metadata and skipped.
    fn decode_query_response(
        &self,
        id: &str,
        query: Value,
    ) -> Result<Vec<Box<dyn Entity>>, BatchError> {
        let Value::Object(members) = query else {
            return Err(unparsable(format!("query response for `{id}` is not an object")));
        };

        let mut entities = Vec::new();
        for (name, value) in members {
            match value {
                Value::Array(elements) => {
                    for element in elements {
                        if !element.is_object() {
                            return Err(unparsable(format!(
                                "query response for `{id}` has a non-object `{name}` element"
                            )));
                        }
                        entities.push(self.decode(id, &name, element)?);
                    }
                }
                value @ Value::Object(_) => entities.push(self.decode(id, &name, value)?),
                _ => {}
            }
        }
        Ok(entities)
    }

    fn decode_report(&self, id: &str, report: Value) -> Result<Vec<Box<dyn Entity>>, BatchError> {
        if !report.is_object() {
            return Err(unparsable(format!("report for `{id}` is not an object")));
        }
        let rows = match report.pointer("/Rows/Row") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(rows)) => rows.clone(),
            Some(_) => return Err(unparsable(format!("report rows for `{id}` are not an array"))),
        };
        rows.into_iter().map(|row| self.decode(id, REPORT_ROW_TAG, row)).collect()
    }

    fn decode(&self, id: &str, tag: &str, fragment: Value) -> Result<Box<dyn Entity>, BatchError> {
        self.serializer
            .from_wire(tag, fragment)
            .map_err(|e| unparsable(format!("cannot decode `{tag}` for `{id}`: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ledgerlink_domain::{Customer, FaultKind, UntypedEntity};
    use serde_json::json;

    use super::*;
    use crate::entity::{standard_registry, RegistrySerializer};

    fn correlate(body: Value) -> Result<Vec<CorrelatedResult>, BatchError> {
        correlate_bytes(&serde_json::to_vec(&body).unwrap())
    }

    fn correlate_bytes(body: &[u8]) -> Result<Vec<CorrelatedResult>, BatchError> {
        let serializer = RegistrySerializer::new(Arc::new(standard_registry(None).unwrap()));
        ResponseCorrelator::new(&serializer).correlate(body)
    }

    #[test]
    fn empty_and_malformed_bodies_are_unparsable() {
        assert!(matches!(correlate_bytes(b""), Err(BatchError::UnparsableResponse(_))));
        assert!(matches!(correlate_bytes(b"  \n"), Err(BatchError::UnparsableResponse(_))));
        assert!(matches!(
            correlate_bytes(b"<IntuitResponse/>"),
            Err(BatchError::UnparsableResponse(_))
        ));
        assert!(matches!(correlate(json!([1, 2])), Err(BatchError::UnparsableResponse(_))));
    }

    #[test]
    fn envelope_without_item_responses_is_empty_success() {
        assert!(correlate(json!({"time": "2024-01-05T10:00:00-08:00"})).unwrap().is_empty());
        assert!(correlate(json!({"BatchItemResponse": null})).unwrap().is_empty());
        assert!(correlate(json!({"BatchItemResponse": []})).unwrap().is_empty());
    }

    #[test]
    fn single_entity_becomes_entity_success() {
        let results = correlate(json!({"BatchItemResponse": [
            {"bId": "b1", "Customer": {"Id": "7", "DisplayName": "Amy"}}
        ]}))
        .unwrap();

        assert_eq!(results[0].id, "b1");
        let customer = results[0].result.entity::<Customer>().unwrap();
        assert_eq!(customer.id.as_deref(), Some("7"));
    }

    #[test]
    fn query_response_flattens_entities_and_skips_paging() {
        let results = correlate(json!({"BatchItemResponse": [{
            "bId": "q1",
            "QueryResponse": {
                "Customer": [{"Id": "1"}, {"Id": "2"}, {"Id": "3"}],
                "startPosition": 1,
                "maxResults": 3
            }
        }]}))
        .unwrap();

        let ids: Vec<_> = results[0]
            .result
            .entities::<Customer>()
            .into_iter()
            .filter_map(|c| c.id.as_deref())
            .collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn report_rows_are_untyped_entities() {
        let results = correlate(json!({"BatchItemResponse": [{
            "bId": "r1",
            "Report": {
                "Header": {"ReportName": "ProfitAndLoss"},
                "Rows": {"Row": [{"ColData": [{"value": "Income"}]}, {"ColData": []}]}
            }
        }]}))
        .unwrap();

        let rows = results[0].result.entities::<UntypedEntity>();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, REPORT_ROW_TAG);
    }

    #[test]
    fn item_fault_is_a_result_not_an_error() {
        let results = correlate(json!({"BatchItemResponse": [
            {"bId": "b1", "Customer": {"Id": "1"}},
            {"bId": "b2", "Fault": {"type": "ValidationFault", "Error": [
                {"Message": "a"}, {"Message": "b"}, {"Message": "c"}
            ]}}
        ]}))
        .unwrap();

        assert!(results[0].result.is_success());
        let fault = results[1].result.fault().unwrap();
        assert_eq!(fault.kind(), FaultKind::Validation);
        assert_eq!(fault.len(), 3);
    }

    #[test]
    fn empty_recognized_fault_falls_through_to_payload() {
        let results = correlate(json!({"BatchItemResponse": [
            {"bId": "b1", "Fault": {"type": "ServiceFault", "Error": []}}
        ]}))
        .unwrap();

        assert!(results[0].result.is_success());
        assert_eq!(results[0].result.collection().map(<[_]>::len), Some(0));
    }

    #[test]
    fn several_entity_members_become_a_collection() {
        let results = correlate(json!({"BatchItemResponse": [
            {"bId": "b1", "Customer": {"Id": "1"}, "Vendor": {"Id": "2"}}
        ]}))
        .unwrap();

        assert_eq!(results[0].result.collection().map(<[_]>::len), Some(2));
    }

    #[test]
    fn missing_or_duplicate_ids_are_unparsable() {
        assert!(matches!(
            correlate(json!({"BatchItemResponse": [{"Customer": {}}]})),
            Err(BatchError::UnparsableResponse(_))
        ));
        assert!(matches!(
            correlate(json!({"BatchItemResponse": [{"bId": "b1"}, {"bId": "b1"}]})),
            Err(BatchError::UnparsableResponse(msg)) if msg.contains("b1")
        ));
    }

    #[test]
    fn top_level_fault_fails_the_batch() {
        let body = json!({"Fault": {"type": "AuthenticationFault", "Error": [
            {"Message": "message=AuthenticationFailed", "code": "3200"}
        ]}});

        let err = correlate(body.clone()).unwrap_err();
        assert!(matches!(
            err,
            BatchError::Fault(FaultError::Security { kind: FaultKind::Authentication, .. })
        ));

        let fault = top_level_fault(&serde_json::to_vec(&body).unwrap()).unwrap();
        assert_eq!(fault.errors()[0].code.as_deref(), Some("3200"));
    }

    #[test]
    fn undecodable_entity_is_unparsable() {
        assert!(matches!(
            correlate(json!({"BatchItemResponse": [{"bId": "b1", "Customer": {"Active": "yes"}}]})),
            Err(BatchError::UnparsableResponse(_))
        ));
    }
}
