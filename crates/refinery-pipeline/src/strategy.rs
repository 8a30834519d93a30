//! Processing strategies: how one chunk becomes a `ChunkResult`

use crate::combiner::combine_results;
use crate::config::{PipelineConfig, TokenConfig};
use crate::error::PipelineError;
use crate::parser::{parse_structured, ParseOutcome};
use crate::prompt::PromptBuilder;
use crate::retry::RetryPolicy;
use crate::types::{ChunkResponse, CombinedResult, RefineResponse};
use async_trait::async_trait;
use refinery_domain::{ChunkResult, ChunkStatus, CompletionProvider, ProcessingOptions, TextChunk};
use refinery_entities::EntityValidator;
use std::sync::Arc;
use tracing::{debug, warn};

/// Required field of every chunk response
pub const REFINED_CONTENT_FIELD: &str = "refinedContent";

/// Turns chunks into results and results into an output
#[async_trait]
pub trait ProcessingStrategy: Send + Sync {
    /// Combined output type
    type Output: Send;

    /// Process one chunk
    ///
    /// Errors carry the chunk id. Failures are not caught here; the
    /// pipeline records them per chunk.
    async fn process(&self, chunk: &TextChunk) -> Result<ChunkResult, PipelineError>;

    /// Combine results (already in chunk order)
    fn combine(&self, results: Vec<ChunkResult>) -> Result<Self::Output, PipelineError>;

    /// Check a chunk before processing
    fn validate(&self, chunk: &TextChunk) -> bool {
        chunk.is_valid()
    }
}

/// Shared LLM call path: token budget check, then retried completion
struct CompletionCaller<P> {
    provider: Arc<P>,
    tokens: TokenConfig,
    retry: RetryPolicy,
}

impl<P: CompletionProvider> CompletionCaller<P> {
    fn new(provider: Arc<P>, config: &PipelineConfig) -> Self {
        Self {
            provider,
            tokens: config.tokens.clone(),
            retry: RetryPolicy::from_config(&config.batch),
        }
    }

    fn check_budget(&self, chunk_id: usize, prompt: &str) -> Result<(), PipelineError> {
        let estimated = self.tokens.estimate(prompt);
        if estimated > self.tokens.max_per_request {
            return Err(PipelineError::TokenBudget {
                chunk_id,
                estimated,
                max: self.tokens.max_per_request,
            });
        }
        Ok(())
    }

    async fn complete(&self, chunk_id: usize, prompt: &str) -> Result<String, PipelineError> {
        self.check_budget(chunk_id, prompt)?;

        let provider = &self.provider;
        let max_tokens = Some(self.tokens.response_max_tokens);
        let response = self
            .retry
            .run(|attempt| async move {
                debug!("Chunk {} attempt {}: {} char prompt", chunk_id, attempt, prompt.len());
                provider
                    .complete(prompt, max_tokens)
                    .await
                    .map_err(|e| PipelineError::Llm {
                        chunk_id,
                        message: e.to_string(),
                        retryable: provider.is_retryable(&e),
                    })
            })
            .await?;

        debug!("Chunk {} response length: {} chars", chunk_id, response.len());
        Ok(response)
    }
}

/// Full analysis of each chunk: refined text, entities, timeline, sentiment
/// and themes
pub struct AnalysisStrategy<P> {
    caller: CompletionCaller<P>,
    options: ProcessingOptions,
    validator: EntityValidator,
}

impl<P: CompletionProvider> AnalysisStrategy<P> {
    /// Create a new analysis strategy
    pub fn new(provider: Arc<P>, options: ProcessingOptions, config: &PipelineConfig) -> Self {
        Self {
            caller: CompletionCaller::new(provider, config),
            options,
            validator: EntityValidator::with_defaults(),
        }
    }

    /// Use a custom entity validator
    pub fn with_validator(mut self, validator: EntityValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Get the options
    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    fn build_result(&self, chunk: &TextChunk, outcome: ParseOutcome<ChunkResponse>) -> ChunkResult {
        let recovered = outcome.is_recovered();
        let response = outcome.into_inner();

        let mut result = ChunkResult::for_chunk(chunk).with_refined_text(&response.refined_content);
        result.analysis = response.analysis();
        if recovered {
            result.status = ChunkStatus::Partial;
            result.error = Some("Response was not valid JSON; only refined text recovered".to_string());
        }

        if self.options.extract_entities {
            let mut rejected = 0;
            for raw in response.raw_entities() {
                match self.validator.validate_value(raw) {
                    Ok(entity) => result.entities.push(entity),
                    Err(e) => {
                        rejected += 1;
                        warn!("Chunk {}: dropping entity: {}", chunk.id, e);
                    }
                }
            }
            if rejected > 0 {
                debug!("Chunk {}: {} entities rejected", chunk.id, rejected);
            }
        }

        result.timeline = response.timeline;
        result
    }
}

#[async_trait]
impl<P: CompletionProvider> ProcessingStrategy for AnalysisStrategy<P> {
    type Output = CombinedResult;

    async fn process(&self, chunk: &TextChunk) -> Result<ChunkResult, PipelineError> {
        let prompt = PromptBuilder::from_options(chunk.text.clone(), &self.options).build();
        let raw = self.caller.complete(chunk.id, &prompt).await?;

        let outcome = parse_structured::<ChunkResponse>(&raw, REFINED_CONTENT_FIELD).map_err(
            |error| PipelineError::Parse {
                chunk_id: chunk.id,
                error,
            },
        )?;

        Ok(self.build_result(chunk, outcome))
    }

    fn combine(&self, results: Vec<ChunkResult>) -> Result<CombinedResult, PipelineError> {
        Ok(combine_results(results))
    }
}

/// Refine-only strategy, meant for sentence-chunked input
///
/// Output is the refined text of every chunk joined with a space.
pub struct RefineStrategy<P> {
    caller: CompletionCaller<P>,
    options: ProcessingOptions,
}

impl<P: CompletionProvider> RefineStrategy<P> {
    /// Create a new refine strategy
    pub fn new(provider: Arc<P>, options: ProcessingOptions, config: &PipelineConfig) -> Self {
        Self {
            caller: CompletionCaller::new(provider, config),
            options,
        }
    }
}

#[async_trait]
impl<P: CompletionProvider> ProcessingStrategy for RefineStrategy<P> {
    type Output = String;

    async fn process(&self, chunk: &TextChunk) -> Result<ChunkResult, PipelineError> {
        let prompt = PromptBuilder::from_options(chunk.text.clone(), &self.options).build_refine();
        let raw = self.caller.complete(chunk.id, &prompt).await?;

        let outcome = parse_structured::<RefineResponse>(&raw, REFINED_CONTENT_FIELD).map_err(
            |error| PipelineError::Parse {
                chunk_id: chunk.id,
                error,
            },
        )?;

        Ok(ChunkResult::for_chunk(chunk).with_refined_text(outcome.into_inner().refined_content))
    }

    fn combine(&self, mut results: Vec<ChunkResult>) -> Result<String, PipelineError> {
        results.sort_by_key(|r| r.id);
        Ok(results
            .iter()
            .map(|r| r.refined_text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" "))
    }
}
