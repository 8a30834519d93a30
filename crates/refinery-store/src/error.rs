//! Store error types

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(Uuid),

    /// A record with this id already exists
    #[error("Duplicate record: {0}")]
    Duplicate(Uuid),

    /// Stored or patched data does not fit the record type
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Status change not allowed from the current status
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}

/// Turn a store result into the `{data, error}` shape
pub fn respond<T>(result: Result<T, StoreError>) -> refinery_domain::StoreResponse<T> {
    match result {
        Ok(data) => refinery_domain::StoreResponse::ok(data),
        Err(e) => refinery_domain::StoreResponse::err(e.to_string()),
    }
}
