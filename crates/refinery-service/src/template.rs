//! Merging processed content into a post template

use crate::error::ServiceError;
use refinery_domain::CompletionProvider;
use refinery_pipeline::{
    parse_structured_response, validate_input_strict, PipelineConfig, PipelineError, RetryPolicy,
    TokenConfig,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Required field of a merge response
pub const MERGED_CONTENT_FIELD: &str = "mergedContent";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MergeResponse {
    merged_content: String,
}

/// Asks the LLM to fill a template with processed content
pub struct TemplateMerger<P> {
    provider: Arc<P>,
    tokens: TokenConfig,
    retry: RetryPolicy,
}

impl<P: CompletionProvider> TemplateMerger<P> {
    /// Create a merger using the token and retry settings from `config`
    pub fn new(provider: Arc<P>, config: &PipelineConfig) -> Self {
        Self {
            provider,
            tokens: config.tokens.clone(),
            retry: RetryPolicy::from_config(&config.batch),
        }
    }

    /// Merge `content` into `template`
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Either input is blank
    /// - The prompt exceeds the token budget
    /// - The LLM call fails after retries
    /// - Neither JSON nor the field fallback yields `mergedContent`
    pub async fn merge(&self, template: &str, content: &str) -> Result<String, ServiceError> {
        if !validate_input_strict(template) || !validate_input_strict(content) {
            return Err(PipelineError::InvalidInput.into());
        }

        let prompt = build_merge_prompt(template, content);
        let estimated = self.tokens.estimate(&prompt);
        if estimated > self.tokens.max_per_request {
            return Err(PipelineError::TokenBudget {
                chunk_id: 0,
                estimated,
                max: self.tokens.max_per_request,
            }
            .into());
        }

        let provider = &self.provider;
        let prompt = prompt.as_str();
        let max_tokens = Some(self.tokens.response_max_tokens);
        let raw = self
            .retry
            .run(|attempt| async move {
                debug!("Template merge attempt {}", attempt);
                provider
                    .complete(prompt, max_tokens)
                    .await
                    .map_err(|e| PipelineError::Llm {
                        chunk_id: 0,
                        message: e.to_string(),
                        retryable: provider.is_retryable(&e),
                    })
            })
            .await?;

        let parsed: MergeResponse = parse_structured_response(&raw, MERGED_CONTENT_FIELD)
            .map_err(|error| PipelineError::Parse { chunk_id: 0, error })?;

        info!(
            "Merged {} chars of content into template ({} chars out)",
            content.len(),
            parsed.merged_content.len()
        );
        Ok(parsed.merged_content)
    }
}

fn build_merge_prompt(template: &str, content: &str) -> String {
    let mut prompt = String::from(
        "Fill the template below with the content that follows it. Keep the \
         template's headings and layout, replace its placeholder text, and do \
         not invent facts that are not in the content.\n\n",
    );
    prompt.push_str("Template:\n---\n");
    prompt.push_str(template);
    prompt.push_str("\n---\n\nContent:\n---\n");
    prompt.push_str(content);
    prompt.push_str("\n---\n\n");
    prompt.push_str(r#"Respond with JSON only: {"mergedContent": "<the filled template>"}"#);
    prompt
}
