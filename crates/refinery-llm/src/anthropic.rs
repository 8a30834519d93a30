//! Anthropic Provider Implementation
//!
//! Integration with the Anthropic Messages API.
//!
//! # Features
//!
//! - Async HTTP communication with the Messages API
//! - Configurable endpoint, model and default response budget
//! - Status-code mapping onto `LlmError`
//!
//! Retries are not done here; the pipeline wraps every call in its own
//! retry policy.
//!
//! # Examples
//!
//! ```no_run
//! use refinery_llm::AnthropicProvider;
//!
//! let provider = AnthropicProvider::new("sk-ant-...", "claude-3-5-sonnet-latest").unwrap();
//! ```

use crate::LlmError;
use async_trait::async_trait;
use refinery_domain::CompletionProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Anthropic API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";

/// Default model
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";

/// API version header value
pub const API_VERSION: &str = "2023-06-01";

/// Default timeout for a single HTTP request (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default response budget when the caller does not pass one
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    default_max_tokens: u32,
}

/// Request body for the Messages API
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the Messages API
#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    ///
    /// # Parameters
    ///
    /// - `api_key`: Anthropic API key
    /// - `model`: Model to use
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the key is empty or the HTTP client
    /// cannot be built.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            api_key,
            client,
            default_max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Create a provider from the `ANTHROPIC_API_KEY` environment variable
    pub fn from_env(model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| LlmError::Config(format!("{} is not set", API_KEY_ENV)))?;
        Self::new(api_key, model)
    }

    /// Override the API endpoint (e.g. a proxy)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the response budget used when the caller passes none
    pub fn with_default_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.endpoint)
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    type Error = LlmError;

    /// Complete a prompt with a single user message
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The API cannot be reached
    /// - The model is not available (404)
    /// - The rate limit is hit (429)
    /// - The API key is rejected (401, 403)
    /// - The response has no text content
    async fn complete(&self, prompt: &str, max_tokens: Option<u32>) -> Result<String, Self::Error> {
        let request_body = MessagesRequest {
            model: &self.model,
            max_tokens: max_tokens.unwrap_or(self.default_max_tokens),
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!("Sending {} char prompt to {}", prompt.len(), self.model);

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LlmError::Config(format!("API key rejected (HTTP {})", status)));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        let body = response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        extract_text(body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn is_retryable(&self, error: &LlmError) -> bool {
        error.is_retryable()
    }
}

fn extract_text(body: MessagesResponse) -> Result<String, LlmError> {
    let text: Vec<String> = body
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.is_empty() {
        return Err(LlmError::InvalidResponse("Response has no text content".to_string()));
    }
    Ok(text.join(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_provider_creation() {
        let provider = AnthropicProvider::new("key", "claude-test").unwrap();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model_name(), "claude-test");
        assert_eq!(provider.default_max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = AnthropicProvider::new("  ", "claude-test");
        assert!(matches!(result, Err(LlmError::Config(_))));
    }

    #[test]
    fn test_with_endpoint_trims_slash() {
        let provider = AnthropicProvider::new("key", "m")
            .unwrap()
            .with_endpoint("http://localhost:8080/");
        assert_eq!(provider.messages_url(), "http://localhost:8080/v1/messages");
    }

    #[test]
    fn test_request_body_shape() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: 10,
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["max_tokens"], 10);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_extract_text_joins_text_blocks() {
        let body: MessagesResponse = serde_json::from_str(
            r#"{"content": [
                {"type": "text", "text": "{\"a\":"},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "1}"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(body).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_extract_text_empty() {
        let body: MessagesResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(matches!(extract_text(body), Err(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_anthropic_error_handling() {
        // Use invalid endpoint to trigger error
        let provider = AnthropicProvider::new("key", "m")
            .unwrap()
            .with_endpoint("http://localhost:99999");

        let result = provider.complete("test", None).await;
        match result {
            Err(LlmError::Communication(_)) => {} // Expected
            other => panic!("Expected Communication error, got {:?}", other.map(|_| ())),
        }
    }
}
