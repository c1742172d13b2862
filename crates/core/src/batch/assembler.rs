//! Request assembly
//!
//! Entity items are first serialized under a generic placeholder member that
//! carries a marker (the item id). A second pass walks the document and
//! renames each placeholder to the entity's tag, matching by marker. The
//! envelope serializer never has to know the concrete entity types.

use std::collections::HashMap;

use ledgerlink_domain::constants::{MARKER_ATTRIBUTE, PLACEHOLDER_TAG};
use ledgerlink_domain::OperationKind;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::errors::AssemblyError;
use super::item::{BatchItem, BatchPayload};
use crate::entity::{EntityRegistry, EntitySerializer};

#[derive(Serialize)]
struct RequestEnvelope<'a> {
    #[serde(rename = "BatchItemRequest")]
    items: Vec<WireItem<'a>>,
}

#[derive(Serialize)]
struct WireItem<'a> {
    #[serde(rename = "bId")]
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation: Option<OperationKind>,
    #[serde(flatten)]
    payload: WirePayload<'a>,
}

#[derive(Serialize)]
enum WirePayload<'a> {
    Query(&'a str),
    ReportQuery(&'a str),
    #[serde(rename = "IntuitObject")]
    Placeholder(Map<String, Value>),
}

/// Builds the wire body for a list of batch items.
pub struct RequestAssembler<'a> {
    registry: &'a EntityRegistry,
    serializer: &'a dyn EntitySerializer,
}

impl<'a> RequestAssembler<'a> {
    pub fn new(registry: &'a EntityRegistry, serializer: &'a dyn EntitySerializer) -> Self {
        Self { registry, serializer }
    }

    /// Assemble `items` into request bytes.
    ///
    /// # Errors
    /// Any [`AssemblyError`]; nothing is sent when assembly fails.
    pub fn assemble(&self, items: &[BatchItem]) -> Result<Vec<u8>, AssemblyError> {
        let document = self.build_document(items)?;
        serde_json::to_vec(&document).map_err(|e| AssemblyError::Envelope(e.to_string()))
    }

    /// Assemble `items` into the request document tree.
    pub fn build_document(&self, items: &[BatchItem]) -> Result<Value, AssemblyError> {
        let mut wire_items = Vec::with_capacity(items.len());
        let mut pending: HashMap<&str, String> = HashMap::new();

        for item in items {
            let payload = match item.payload() {
                BatchPayload::QueryText(text) if item.kind() == OperationKind::Report => {
                    WirePayload::ReportQuery(text)
                }
                BatchPayload::QueryText(text) => WirePayload::Query(text),
                BatchPayload::Entity(entity) => {
                    let entity = entity.as_ref();
                    let tag = self.registry.tag(entity).inspect_err(|_| {
                        warn!(batch_item_id = item.id(), "Entity type is not registered");
                    })?;
                    let fragment = self.serializer.to_wire(entity).map_err(|source| {
                        AssemblyError::Serialization { item_id: item.id().to_string(), source }
                    })?;
                    let Value::Object(mut body) = fragment else {
                        return Err(AssemblyError::InvalidFragment(item.id().to_string()));
                    };
                    if body.contains_key(MARKER_ATTRIBUTE) {
                        return Err(AssemblyError::PlaceholderMismatch(format!(
                            "fragment for `{}` already has a `{MARKER_ATTRIBUTE}` member",
                            item.id()
                        )));
                    }
                    body.insert(MARKER_ATTRIBUTE.to_string(), Value::String(item.id().to_string()));
                    pending.insert(item.id(), tag.wire_name());
                    WirePayload::Placeholder(body)
                }
            };

            let operation = item.kind().carries_entity().then_some(item.kind());
            wire_items.push(WireItem { id: item.id(), operation, payload });
        }

        let mut document = serde_json::to_value(RequestEnvelope { items: wire_items })
            .map_err(|e| AssemblyError::Envelope(e.to_string()))?;

        if pending.is_empty() {
            return Ok(document);
        }

        let expected = pending.len();
        let rewritten = rewrite_placeholders(&mut document, &mut pending)?;
        debug!(placeholders = rewritten, "Rewrote entity placeholders");

        if !pending.is_empty() {
            let unmatched = items
                .iter()
                .filter(|item| pending.contains_key(item.id()))
                .map(|item| item.id().to_string())
                .collect();
            return Err(AssemblyError::UnmatchedItems(unmatched));
        }
        debug_assert_eq!(rewritten, expected);

        Ok(document)
    }
}

/// Rename every placeholder under `node` to the tag recorded for its marker.
///
/// Matched markers are removed from `pending`, so a marker can be consumed at
/// most once. Returns the number of placeholders rewritten.
fn rewrite_placeholders(
    node: &mut Value,
    pending: &mut HashMap<&str, String>,
) -> Result<usize, AssemblyError> {
    match node {
        Value::Array(elements) => {
            let mut count = 0;
            for element in elements {
                count += rewrite_placeholders(element, pending)?;
            }
            Ok(count)
        }
        Value::Object(members) => {
            let mut count = 0;
            let original = std::mem::take(members);
            for (name, mut value) in original {
                if name == PLACEHOLDER_TAG {
                    let (tag, element) = rewrite_placeholder(value, pending)?;
                    if members.contains_key(&tag) {
                        return Err(AssemblyError::PlaceholderMismatch(format!(
                            "member `{tag}` already exists next to a placeholder"
                        )));
                    }
                    members.insert(tag, element);
                    count += 1;
                } else {
                    count += rewrite_placeholders(&mut value, pending)?;
                    members.insert(name, value);
                }
            }
            Ok(count)
        }
        _ => Ok(0),
    }
}

fn rewrite_placeholder(
    placeholder: Value,
    pending: &mut HashMap<&str, String>,
) -> Result<(String, Value), AssemblyError> {
    let Value::Object(attributes) = placeholder else {
        return Err(AssemblyError::PlaceholderMismatch("placeholder is not an object".into()));
    };

    let mut marker = None;
    let mut element = Map::with_capacity(attributes.len());
    for (name, value) in attributes {
        if name == MARKER_ATTRIBUTE {
            marker = Some(value);
        } else {
            element.insert(name, value);
        }
    }

    let marker = match marker {
        Some(Value::String(marker)) => marker,
        Some(other) => {
            return Err(AssemblyError::PlaceholderMismatch(format!(
                "placeholder marker must be a string, found {other}"
            )))
        }
        None => {
            return Err(AssemblyError::PlaceholderMismatch("placeholder without a marker".into()))
        }
    };

    let tag = pending.remove(marker.as_str()).ok_or_else(|| {
        AssemblyError::PlaceholderMismatch(format!(
            "marker `{marker}` does not belong to an unrewritten entity item"
        ))
    })?;

    Ok((tag, Value::Object(element)))
}
