//! Format adapters
//!
//! Each adapter wraps the same chunk → process → combine pipeline and only
//! differs in the shape of the metadata it attaches to the result.

mod podcast;
mod post;
pub(crate) mod steps;

pub use podcast::PodcastAdapter;
pub use post::PostAdapter;

use crate::error::ServiceError;
use async_trait::async_trait;
use refinery_domain::{
    CompletionProvider, Format, ProcessingOptions, ProcessingResult, ProcessingStatus, ResultId,
    ResultMetadata,
};
use refinery_entities::EntityValidator;
use refinery_pipeline::{
    validate_input_strict, AnalysisStrategy, CancelToken, ChunkOptions, DelimiterChunker,
    PipelineConfig, PipelineError, ProcessingPipeline,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use steps::{StepTracker, CHUNK, COMBINE, PROCESS, VALIDATE};
use tracing::{debug, info, warn};

/// Processes input of one format into a [`ProcessingResult`]
#[async_trait]
pub trait FormatAdapter: Send + Sync {
    /// Format this adapter handles
    fn format(&self) -> Format;

    /// Process an input
    ///
    /// Processing failures come back as a failed result. An `Err` means the
    /// adapter could not even attempt the run.
    async fn process(
        &self,
        input: &str,
        options: &ProcessingOptions,
    ) -> Result<ProcessingResult, ServiceError> {
        self.process_with_cancel(input, options, &CancelToken::new())
            .await
    }

    /// Process an input, stopping early when `cancel` fires
    async fn process_with_cancel(
        &self,
        input: &str,
        options: &ProcessingOptions,
        cancel: &CancelToken,
    ) -> Result<ProcessingResult, ServiceError>;

    /// Look up a result produced by this adapter
    async fn get_status(&self, id: ResultId) -> Result<ProcessingResult, ServiceError>;
}

/// Results each adapter keeps for `get_status`
pub const DEFAULT_RETAINED_RESULTS: usize = 1000;

/// Shared run logic and result storage behind both adapters
///
/// Result ids are UUIDv7, so key order is creation order and the oldest
/// result is evicted first once `retain` is reached.
pub(crate) struct AdapterCore<P> {
    format: Format,
    provider: Arc<P>,
    config: PipelineConfig,
    validator: EntityValidator,
    retain: usize,
    results: RwLock<BTreeMap<ResultId, ProcessingResult>>,
}

impl<P: CompletionProvider + 'static> AdapterCore<P> {
    pub(crate) fn new(format: Format, provider: Arc<P>, config: PipelineConfig) -> Self {
        Self {
            format,
            provider,
            config,
            validator: EntityValidator::with_defaults(),
            retain: DEFAULT_RETAINED_RESULTS,
            results: RwLock::new(BTreeMap::new()),
        }
    }

    pub(crate) fn with_retention(mut self, retain: usize) -> Self {
        self.retain = retain.max(1);
        self
    }

    pub(crate) fn with_validator(mut self, validator: EntityValidator) -> Self {
        self.validator = validator;
        self
    }

    pub(crate) fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline and let `shape` add format-specific fields
    ///
    /// The result is stored before it is returned, failed or not.
    pub(crate) async fn run<F>(
        &self,
        input: &str,
        options: &ProcessingOptions,
        cancel: &CancelToken,
        shape: F,
    ) -> Result<ProcessingResult, ServiceError>
    where
        F: FnOnce(&mut ProcessingResult) + Send,
    {
        if options.format != self.format {
            return Err(ServiceError::FormatMismatch {
                expected: self.format,
                requested: options.format,
            });
        }

        let mut steps = StepTracker::standard();

        steps.start(VALIDATE);
        if !validate_input_strict(input) {
            let error = PipelineError::InvalidInput.to_string();
            warn!("Rejected {} input: {}", self.format, error);
            steps.fail(VALIDATE, &error);
            let result = ProcessingResult::failed(self.format, options, error)
                .with_steps(steps.into_steps());
            return Ok(self.store(result));
        }
        steps.complete(VALIDATE, None);

        let pipeline = ProcessingPipeline::new(
            DelimiterChunker::new(ChunkOptions::from(&self.config.chunk)),
            AnalysisStrategy::new(Arc::clone(&self.provider), options.clone(), &self.config)
                .with_validator(self.validator.clone()),
            &self.config,
        );

        steps.start(CHUNK);
        let chunks = pipeline.chunks(input);
        let chunk_count = chunks.len();
        steps.complete(CHUNK, Some(json!({ "chunks": chunk_count })));
        debug!("{} input split into {} chunks", self.format, chunk_count);

        steps.start(PROCESS);
        let output = match pipeline.process_chunks(chunks, cancel).await {
            Ok(output) => output,
            Err(e) => {
                warn!("{} processing failed: {}", self.format, e);
                steps.fail(PROCESS, &e.to_string());
                let mut result = ProcessingResult::failed(self.format, options, e.to_string())
                    .with_steps(steps.into_steps());
                result.metadata.chunk_count = chunk_count;
                if let PipelineError::BatchProcessing { errors } = e {
                    result.metadata.failed_chunks = errors;
                }
                return Ok(self.store(result));
            }
        };
        steps.complete(
            PROCESS,
            Some(json!({ "failedChunks": output.failed_chunks.len() })),
        );
        if !output.is_complete() {
            warn!(
                "{} result is missing {} of {} chunks",
                self.format,
                output.failed_chunks.len(),
                output.chunks.len()
            );
        }

        steps.start(COMBINE);
        let combined = output.result;
        let mut result = ProcessingResult {
            id: uuid::Uuid::now_v7(),
            format: self.format,
            status: ProcessingStatus::Completed,
            success: true,
            output: combined.output,
            error: None,
            metadata: ResultMetadata {
                chunk_count: output.chunks.len(),
                failed_chunks: output.failed_chunks,
                ..ResultMetadata::new(self.format, options)
            },
            analysis: combined.analysis,
            entities: combined.entities,
            timeline: Some(combined.timeline),
            transcript: combined.transcript,
            chunks: output.chunks,
            steps: Vec::new(),
        };
        shape(&mut result);
        steps.complete(COMBINE, Some(json!({ "entities": result.entities.len() })));
        result.steps = steps.into_steps();

        info!(
            "{} result {} completed: {} chunks, {} entities",
            self.format,
            result.id,
            result.metadata.chunk_count,
            result.entities.len()
        );
        Ok(self.store(result))
    }

    pub(crate) fn get(&self, id: ResultId) -> Result<ProcessingResult, ServiceError> {
        self.read()
            .get(&id)
            .cloned()
            .ok_or(ServiceError::NotFound(id))
    }

    fn store(&self, result: ProcessingResult) -> ProcessingResult {
        let mut results = self.write();
        results.insert(result.id, result.clone());
        while results.len() > self.retain {
            if let Some((evicted, _)) = results.pop_first() {
                debug!("Evicted {} result {}", self.format, evicted);
            }
        }
        result
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<ResultId, ProcessingResult>> {
        self.results.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<ResultId, ProcessingResult>> {
        self.results.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refinery_llm::MockProvider;

    fn core(provider: MockProvider) -> AdapterCore<MockProvider> {
        let mut config = PipelineConfig::default();
        config.batch.max_retries = 0;
        AdapterCore::new(Format::Post, Arc::new(provider), config)
    }

    #[tokio::test]
    async fn test_chunk_step_matches_processed_chunks() {
        let provider = MockProvider::new(r#"{"refinedContent": "Refined."}"#);
        let core = core(provider.clone());

        let result = core
            .run(
                "First paragraph.\n\nSecond paragraph.",
                &ProcessingOptions::new(Format::Post),
                &CancelToken::new(),
                |_| {},
            )
            .await
            .unwrap();

        let chunk_step = result.steps.iter().find(|s| s.id == CHUNK).unwrap();
        assert_eq!(
            chunk_step.result,
            Some(json!({ "chunks": result.chunks.len() }))
        );
        assert_eq!(result.metadata.chunk_count, result.chunks.len());
        assert_eq!(provider.call_count(), result.chunks.len());
    }

    #[tokio::test]
    async fn test_oldest_results_evicted() {
        let core = core(MockProvider::new(r#"{"refinedContent": "ok"}"#)).with_retention(2);
        let options = ProcessingOptions::new(Format::Post);

        let mut ids = Vec::new();
        for _ in 0..3 {
            let result = core
                .run("Some text.", &options, &CancelToken::new(), |_| {})
                .await
                .unwrap();
            ids.push(result.id);
        }

        assert!(matches!(core.get(ids[0]), Err(ServiceError::NotFound(_))));
        assert!(core.get(ids[1]).is_ok());
        assert!(core.get(ids[2]).is_ok());
    }
}
