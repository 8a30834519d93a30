//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Trait for text-completion (LLM) providers
///
/// Implemented by the infrastructure layer (refinery-llm)
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Error type for completion calls
    type Error: std::fmt::Display + Send + Sync + 'static;

    /// Complete a prompt, optionally capping the response length in tokens
    async fn complete(&self, prompt: &str, max_tokens: Option<u32>) -> Result<String, Self::Error>;

    /// Name of the model behind this provider
    fn model_name(&self) -> &str {
        "llm"
    }

    /// Whether a call that failed with `error` may succeed if repeated
    fn is_retryable(&self, _error: &Self::Error) -> bool {
        true
    }
}

/// A persistable record
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Table / collection name
    const TABLE: &'static str;

    /// Record identifier
    fn id(&self) -> uuid::Uuid;
}

/// Outcome of a store call
///
/// Store calls never fail outright; callers must check `error` before using
/// `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreResponse<T> {
    /// Returned data, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error message, if the call failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> StoreResponse<T> {
    /// Successful response
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// Failed response
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
        }
    }

    /// Whether the call succeeded
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a `Result`
    ///
    /// # Examples
    ///
    /// ```
    /// use refinery_domain::StoreResponse;
    ///
    /// assert_eq!(StoreResponse::ok(5).into_result(), Ok(5));
    /// assert!(StoreResponse::<i32>::err("gone").into_result().is_err());
    /// ```
    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (_, Some(error)) => Err(error),
            (Some(data), None) => Ok(data),
            (None, None) => Err("Store returned no data".to_string()),
        }
    }
}

/// Trait for storing and retrieving records (posts, templates)
///
/// Implemented by the infrastructure layer (refinery-store)
pub trait RecordStore<T: Record> {
    /// Get a record by id
    fn get(&self, id: uuid::Uuid) -> StoreResponse<T>;

    /// List every record
    fn list(&self) -> StoreResponse<Vec<T>>;

    /// Insert a new record
    fn insert(&mut self, record: T) -> StoreResponse<T>;

    /// Apply a JSON merge patch to a record and return the updated record
    fn update(&mut self, id: uuid::Uuid, patch: serde_json::Value) -> StoreResponse<T>;

    /// Delete a record
    fn delete(&mut self, id: uuid::Uuid) -> StoreResponse<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl CompletionProvider for Echo {
        type Error = String;

        async fn complete(&self, prompt: &str, _max_tokens: Option<u32>) -> Result<String, String> {
            Ok(prompt.to_string())
        }
    }

    #[tokio::test]
    async fn test_provider_default_model_name() {
        let provider = Echo;
        assert_eq!(provider.model_name(), "llm");
        assert!(provider.is_retryable(&"timeout".to_string()));
        assert_eq!(provider.complete("hi", None).await.unwrap(), "hi");
    }

    #[test]
    fn test_store_response_error_wins() {
        let response = StoreResponse {
            data: Some(1),
            error: Some("partial".to_string()),
        };
        assert!(!response.is_ok());
        assert_eq!(response.into_result(), Err("partial".to_string()));
    }

    #[test]
    fn test_store_response_empty() {
        let response: StoreResponse<i32> = StoreResponse {
            data: None,
            error: None,
        };
        assert!(response.into_result().is_err());
    }
}
