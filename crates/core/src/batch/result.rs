//! Per-item batch results

use ledgerlink_domain::Entity;

use super::fault::FaultError;

/// Outcome of one batch item.
#[derive(Debug)]
pub enum BatchItemResult {
    /// A single entity was returned (create, update, delete, void).
    EntitySuccess(Box<dyn Entity>),
    /// Zero or more entities were returned (query, report).
    CollectionSuccess(Vec<Box<dyn Entity>>),
    /// The service rejected this item.
    Fault(FaultError),
}

impl BatchItemResult {
    pub fn is_success(&self) -> bool {
        !self.is_fault()
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }

    pub fn fault(&self) -> Option<&FaultError> {
        match self {
            Self::Fault(fault) => Some(fault),
            _ => None,
        }
    }

    /// Single returned entity, untyped.
    pub fn raw_entity(&self) -> Option<&dyn Entity> {
        match self {
            Self::EntitySuccess(entity) => Some(entity.as_ref()),
            _ => None,
        }
    }

    /// Single returned entity, if it is a `T`.
    pub fn entity<T: Entity>(&self) -> Option<&T> {
        self.raw_entity().and_then(|entity| entity.downcast_ref::<T>())
    }

    /// Returned collection, untyped.
    pub fn collection(&self) -> Option<&[Box<dyn Entity>]> {
        match self {
            Self::CollectionSuccess(entities) => Some(entities),
            _ => None,
        }
    }

    /// Members of the returned collection that are `T`, in server order.
    pub fn entities<T: Entity>(&self) -> Vec<&T> {
        self.collection()
            .unwrap_or_default()
            .iter()
            .filter_map(|entity| entity.as_ref().downcast_ref::<T>())
            .collect()
    }
}

/// A result paired with the id of the item it belongs to.
#[derive(Debug)]
pub struct CorrelatedResult {
    pub id: String,
    pub result: BatchItemResult,
}

/// Results of one execution, in response order.
#[derive(Debug, Default)]
pub struct BatchResults {
    entries: Vec<CorrelatedResult>,
}

impl BatchResults {
    pub fn get(&self, id: &str) -> Option<&BatchItemResult> {
        self.entries.iter().find(|entry| entry.id == id).map(|entry| &entry.result)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BatchItemResult)> {
        self.entries.iter().map(|entry| (entry.id.as_str(), &entry.result))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.id.as_str())
    }

    /// Items the service rejected.
    pub fn faults(&self) -> impl Iterator<Item = (&str, &FaultError)> {
        self.iter().filter_map(|(id, result)| result.fault().map(|fault| (id, fault)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, entry: CorrelatedResult) {
        self.entries.push(entry);
    }

    pub(crate) fn remove(&mut self, id: &str) {
        self.entries.retain(|entry| entry.id != id);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl IntoIterator for BatchResults {
    type Item = CorrelatedResult;
    type IntoIter = std::vec::IntoIter<CorrelatedResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
