//! SQLite record store
//!
//! Each record type has its own table (named by [`Record::TABLE`]) holding
//! the record as a JSON document next to its id and timestamps.

use crate::error::{respond, StoreError};
use crate::patch::apply_patch;
use chrono::Utc;
use refinery_domain::{Record, RecordStore, StoreResponse};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// SQLite-based implementation of [`RecordStore`]
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use refinery_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("refinery.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    /// Get a record
    pub fn fetch<T: Record>(&self, id: Uuid) -> Result<T, StoreError> {
        let body: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT body FROM {} WHERE id = ?1", T::TABLE),
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        let body = body.ok_or(StoreError::NotFound(id))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Get every record of a type in id order (creation order for v7 ids)
    pub fn fetch_all<T: Record>(&self) -> Result<Vec<T>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT body FROM {} ORDER BY id",
            T::TABLE
        ))?;
        let bodies = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(StoreError::from))
            .collect()
    }

    /// Insert a new record
    pub fn put<T: Record>(&mut self, record: &T) -> Result<(), StoreError> {
        let id = record.id();
        let exists: bool = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?1", T::TABLE),
                params![id.to_string()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if exists {
            return Err(StoreError::Duplicate(id));
        }

        let document = serde_json::to_value(record)?;
        let created_at = timestamp(&document, "createdAt");
        let updated_at = timestamp(&document, "updatedAt");
        self.conn.execute(
            &format!(
                "INSERT INTO {} (id, body, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
                T::TABLE
            ),
            params![id.to_string(), document.to_string(), created_at, updated_at],
        )?;
        debug!("Inserted {} {}", T::TABLE, id);
        Ok(())
    }

    /// Apply a merge patch to a record
    pub fn patch<T: Record>(&mut self, id: Uuid, patch: &Value) -> Result<T, StoreError> {
        let tx = self.conn.transaction()?;
        let body: Option<String> = tx
            .query_row(
                &format!("SELECT body FROM {} WHERE id = ?1", T::TABLE),
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let body = body.ok_or(StoreError::NotFound(id))?;

        let current: T = serde_json::from_str(&body)?;
        let updated = apply_patch(&current, patch)?;
        let document = serde_json::to_value(&updated)?;

        tx.execute(
            &format!(
                "UPDATE {} SET body = ?1, updated_at = ?2 WHERE id = ?3",
                T::TABLE
            ),
            params![
                document.to_string(),
                timestamp(&document, "updatedAt"),
                id.to_string()
            ],
        )?;
        tx.commit()?;
        debug!("Updated {} {}", T::TABLE, id);
        Ok(updated)
    }

    /// Delete a record
    pub fn remove<T: Record>(&mut self, id: Uuid) -> Result<(), StoreError> {
        let deleted = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", T::TABLE),
            params![id.to_string()],
        )?;
        if deleted == 0 {
            return Err(StoreError::NotFound(id));
        }
        debug!("Deleted {} {}", T::TABLE, id);
        Ok(())
    }
}

/// RFC 3339 timestamp field of a document, or now
fn timestamp(document: &Value, field: &str) -> String {
    document
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Utc::now().to_rfc3339())
}

impl<T: Record> RecordStore<T> for SqliteStore {
    fn get(&self, id: Uuid) -> StoreResponse<T> {
        respond(self.fetch(id))
    }

    fn list(&self) -> StoreResponse<Vec<T>> {
        respond(self.fetch_all())
    }

    fn insert(&mut self, record: T) -> StoreResponse<T> {
        respond(self.put(&record).map(|()| record))
    }

    fn update(&mut self, id: Uuid, patch: Value) -> StoreResponse<T> {
        respond(self.patch(id, &patch))
    }

    fn delete(&mut self, id: Uuid) -> StoreResponse<()> {
        respond(self.remove::<T>(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Post, Template};
    use refinery_domain::Format;

    #[test]
    fn test_store_initialization() {
        let store = SqliteStore::in_memory();
        assert!(store.is_ok(), "Store should initialize successfully");
    }

    #[test]
    fn test_tables_are_separate() {
        let mut store = SqliteStore::in_memory().unwrap();
        let post = Post::new("Title", "Body", Format::Post);
        store.put(&post).unwrap();

        assert_eq!(store.fetch::<Post>(post.id).unwrap(), post);
        assert!(matches!(
            store.fetch::<Template>(post.id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_missing() {
        let mut store = SqliteStore::in_memory().unwrap();
        let result = store.remove::<Post>(Uuid::now_v7());
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
