//! Post adapter

use super::{AdapterCore, FormatAdapter};
use crate::error::ServiceError;
use async_trait::async_trait;
use refinery_domain::{
    CompletionProvider, Format, ProcessingOptions, ProcessingResult, ResultId,
};
use refinery_entities::EntityValidator;
use refinery_pipeline::{CancelToken, PipelineConfig};
use std::sync::Arc;

/// Adapter for blog post drafts
///
/// Same pipeline as the podcast adapter, but posts have no timeline and no
/// speakers.
pub struct PostAdapter<P> {
    core: AdapterCore<P>,
}

impl<P: CompletionProvider + 'static> PostAdapter<P> {
    /// Create a post adapter
    pub fn new(provider: Arc<P>, config: PipelineConfig) -> Self {
        Self {
            core: AdapterCore::new(Format::Post, provider, config),
        }
    }

    /// Use a custom entity validator
    pub fn with_validator(mut self, validator: EntityValidator) -> Self {
        self.core = self.core.with_validator(validator);
        self
    }

    /// Keep at most `retain` results for `get_status`, dropping the oldest
    pub fn with_retention(mut self, retain: usize) -> Self {
        self.core = self.core.with_retention(retain);
        self
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        self.core.config()
    }
}

fn strip_podcast_fields(result: &mut ProcessingResult) {
    result.timeline = None;
    result.metadata.speakers = None;
    result.metadata.duration = None;
}

#[async_trait]
impl<P: CompletionProvider + 'static> FormatAdapter for PostAdapter<P> {
    fn format(&self) -> Format {
        Format::Post
    }

    async fn process_with_cancel(
        &self,
        input: &str,
        options: &ProcessingOptions,
        cancel: &CancelToken,
    ) -> Result<ProcessingResult, ServiceError> {
        self.core
            .run(input, options, cancel, strip_podcast_fields)
            .await
    }

    async fn get_status(&self, id: ResultId) -> Result<ProcessingResult, ServiceError> {
        self.core.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refinery_domain::{ProcessingStatus, StepStatus};
    use refinery_llm::MockProvider;

    #[tokio::test]
    async fn test_post_has_no_timeline() {
        let provider = MockProvider::new(
            r#"{"refinedContent": "Draft.", "timeline": [{"timestamp": "1", "event": "Section"}]}"#,
        );
        let adapter = PostAdapter::new(Arc::new(provider), PipelineConfig::default());
        let result = adapter
            .process("A rough draft.", &ProcessingOptions::new(Format::Post))
            .await
            .unwrap();

        assert_eq!(result.status, ProcessingStatus::Completed);
        assert!(result.timeline.is_none());
        assert!(result.metadata.speakers.is_none());
        assert_eq!(result.metadata.format, Format::Post);
    }

    #[tokio::test]
    async fn test_whitespace_input_fails_validation_step() {
        let provider = MockProvider::default();
        let adapter = PostAdapter::new(Arc::new(provider.clone()), PipelineConfig::default());
        let result = adapter
            .process("   \n\t", &ProcessingOptions::new(Format::Post))
            .await
            .unwrap();

        assert_eq!(result.status, ProcessingStatus::Failed);
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Invalid input"));
        assert_eq!(result.steps[0].status, StepStatus::Failed);
        assert_eq!(result.steps[1].status, StepStatus::Pending);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_failure_becomes_failed_result() {
        let mut provider = MockProvider::default();
        provider.fail_when("");
        let mut config = PipelineConfig::default();
        config.batch.max_retries = 0;

        let adapter = PostAdapter::new(Arc::new(provider), config);
        let result = adapter
            .process("Some text.", &ProcessingOptions::new(Format::Post))
            .await
            .unwrap();

        assert_eq!(result.status, ProcessingStatus::Failed);
        assert_eq!(result.metadata.chunk_count, 1);
        assert_eq!(result.metadata.failed_chunks.len(), 1);
        assert_eq!(result.steps[2].status, StepStatus::Failed);
    }
}
