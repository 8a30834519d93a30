//! In-memory record store

use crate::error::{respond, StoreError};
use crate::patch::apply_patch;
use refinery_domain::{Record, RecordStore, StoreResponse};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Record store backed by a map
///
/// Records list in id order, which for v7 ids is creation order.
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    records: BTreeMap<Uuid, T>,
}

impl<T: Record> MemoryStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn try_insert(&mut self, record: T) -> Result<T, StoreError> {
        let id = record.id();
        if self.records.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        self.records.insert(id, record.clone());
        Ok(record)
    }

    fn try_update(&mut self, id: Uuid, patch: &Value) -> Result<T, StoreError> {
        let current = self.records.get(&id).ok_or(StoreError::NotFound(id))?;
        let updated = apply_patch(current, patch)?;
        self.records.insert(id, updated.clone());
        Ok(updated)
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> RecordStore<T> for MemoryStore<T> {
    fn get(&self, id: Uuid) -> StoreResponse<T> {
        match self.records.get(&id) {
            Some(record) => StoreResponse::ok(record.clone()),
            None => StoreResponse::err(StoreError::NotFound(id).to_string()),
        }
    }

    fn list(&self) -> StoreResponse<Vec<T>> {
        StoreResponse::ok(self.records.values().cloned().collect())
    }

    fn insert(&mut self, record: T) -> StoreResponse<T> {
        respond(self.try_insert(record))
    }

    fn update(&mut self, id: Uuid, patch: Value) -> StoreResponse<T> {
        respond(self.try_update(id, &patch))
    }

    fn delete(&mut self, id: Uuid) -> StoreResponse<()> {
        match self.records.remove(&id) {
            Some(_) => StoreResponse::ok(()),
            None => StoreResponse::err(StoreError::NotFound(id).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Template;
    use serde_json::json;

    #[test]
    fn test_crud_cycle() {
        let mut store: MemoryStore<Template> = MemoryStore::new();
        let template = Template::new("Newsletter", "# {title}\n{body}");
        let id = template.id;

        assert!(store.insert(template.clone()).is_ok());
        assert_eq!(store.get(id).into_result().unwrap(), template);

        let updated = store
            .update(id, json!({"name": "Weekly newsletter"}))
            .into_result()
            .unwrap();
        assert_eq!(updated.name, "Weekly newsletter");
        assert_eq!(updated.body, template.body);
        assert!(updated.updated_at >= template.updated_at);

        assert!(store.delete(id).is_ok());
        assert!(store.is_empty());
    }

    #[test]
    fn test_errors_are_reported_not_raised() {
        let mut store: MemoryStore<Template> = MemoryStore::new();
        let missing = Uuid::now_v7();

        let response = store.get(missing);
        assert!(response.data.is_none());
        assert!(response.error.unwrap().contains("not found"));
        assert!(!store.delete(missing).is_ok());
        assert!(!store.update(missing, json!({"name": "x"})).is_ok());
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut store: MemoryStore<Template> = MemoryStore::new();
        let template = Template::new("A", "a");
        assert!(store.insert(template.clone()).is_ok());
        let response = store.insert(template);
        assert!(response.error.unwrap().starts_with("Duplicate record"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_patch_cannot_change_id_or_break_schema() {
        let mut store: MemoryStore<Template> = MemoryStore::new();
        let template = Template::new("A", "a");
        let id = template.id;
        store.insert(template);

        let updated = store
            .update(id, json!({"id": Uuid::now_v7(), "body": "b"}))
            .into_result()
            .unwrap();
        assert_eq!(updated.id, id);

        let response = store.update(id, json!({"name": null}));
        assert!(response.error.unwrap().starts_with("Invalid data"));
        assert_eq!(store.get(id).into_result().unwrap().body, "b");
    }

    #[test]
    fn test_list_in_creation_order() {
        let mut store: MemoryStore<Template> = MemoryStore::new();
        let first = Template::new("first", "1");
        let second = Template::new("second", "2");
        store.insert(first);
        store.insert(second);

        let names: Vec<_> = store
            .list()
            .into_result()
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
