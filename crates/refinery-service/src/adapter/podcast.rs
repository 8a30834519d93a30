//! Podcast adapter: timeline, speakers and duration

use super::{AdapterCore, FormatAdapter};
use crate::error::ServiceError;
use async_trait::async_trait;
use refinery_domain::{
    CompletionProvider, Format, ProcessingOptions, ProcessingResult, ResultId,
};
use refinery_entities::EntityValidator;
use refinery_pipeline::{CancelToken, PipelineConfig};
use std::collections::HashSet;
use std::sync::Arc;

/// Adapter for podcast transcripts
///
/// Keeps the combined timeline and records speakers and duration in the
/// result metadata.
pub struct PodcastAdapter<P> {
    core: AdapterCore<P>,
}

impl<P: CompletionProvider + 'static> PodcastAdapter<P> {
    /// Create a podcast adapter
    pub fn new(provider: Arc<P>, config: PipelineConfig) -> Self {
        Self {
            core: AdapterCore::new(Format::Podcast, provider, config),
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

/// Speakers are the people found plus anyone named on the timeline
fn attach_podcast_metadata(result: &mut ProcessingResult) {
    let timeline = result.timeline.take().unwrap_or_default();

    let mut seen = HashSet::new();
    let speakers: Vec<String> = result
        .entities
        .people
        .iter()
        .map(|person| person.name.clone())
        .chain(
            timeline
                .iter()
                .flat_map(|event| event.speakers.iter().flatten().cloned()),
        )
        .filter(|name| seen.insert(name.clone()))
        .collect();

    result.metadata.speakers = Some(speakers);
    result.metadata.duration = timeline.last().map(|event| event.timestamp.clone());
    result.timeline = Some(timeline);
}

#[async_trait]
impl<P: CompletionProvider + 'static> FormatAdapter for PodcastAdapter<P> {
    fn format(&self) -> Format {
        Format::Podcast
    }

    async fn process_with_cancel(
        &self,
        input: &str,
        options: &ProcessingOptions,
        cancel: &CancelToken,
    ) -> Result<ProcessingResult, ServiceError> {
        self.core
            .run(input, options, cancel, attach_podcast_metadata)
            .await
    }

    async fn get_status(&self, id: ResultId) -> Result<ProcessingResult, ServiceError> {
        self.core.get(id)
    }
}
