//! Integration tests for the processing service

use refinery_domain::{EntityKind, Format, ProcessingOptions, ProcessingStatus, SentimentLabel};
use refinery_llm::MockProvider;
use refinery_pipeline::{CancelToken, PipelineConfig};
use refinery_service::{
    FormatAdapter, PodcastAdapter, ProcessingService, ServiceError, TemplateMerger,
};
use std::sync::Arc;
use std::time::Duration;

const ANALYSIS_RESPONSE: &str = r#"{
    "refinedContent": "Alice and Bob talked about Rust.",
    "title": "Rust in production",
    "entities": {
        "people": [
            {"name": "Alice", "role": "host", "expertise": ["broadcasting"]},
            {"name": "Bob", "role": "guest", "expertise": ["storage engines"]}
        ],
        "topics": [{"name": "Rust", "relevance": 0.9, "subtopics": ["ownership"]}]
    },
    "timeline": [{"timestamp": "00:03:10", "event": "Migration story", "speakers": ["Bob"]}],
    "sentiment": {"overall": "positive", "score": 0.7}
}"#;

/// Helper to create a config that does not retry
fn test_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.batch.max_retries = 0;
    config.batch.retry_delay_ms = 1;
    config
}

fn service_with(provider: MockProvider) -> ProcessingService {
    ProcessingService::with_defaults(Arc::new(provider), test_config())
}

fn sample_transcript() -> String {
    let sample = "Alice: Welcome back to the show. Today I am talking with Bob about \
                  moving a storage engine to Rust.\n\
                  Bob: Thanks for having me. We started with the write path because \
                  that is where the crashes were.\n\
                  Alice: What surprised you most?\n\
                  Bob: How quickly the team stopped fighting the borrow checker. After \
                  a month it felt normal, and the crash reports dropped to zero.\n\
                  Alice: That is a great place to stop. Thanks again, Bob, and thanks \
                  to everyone listening.";
    vec![sample; 10].join("\n\n")
}

#[tokio::test]
async fn test_podcast_and_post_agree_on_core_fields() {
    let service = service_with(MockProvider::new(ANALYSIS_RESPONSE));
    let input = "Alice and Bob talked about Rust for an hour.";

    let podcast = service
        .process(Format::Podcast, input, &ProcessingOptions::new(Format::Podcast))
        .await
        .unwrap();
    let post = service
        .process(Format::Post, input, &ProcessingOptions::new(Format::Post))
        .await
        .unwrap();

    assert_eq!(podcast.status, ProcessingStatus::Completed);
    assert_eq!(post.status, ProcessingStatus::Completed);
    assert_eq!(podcast.output, post.output);
    assert_eq!(podcast.analysis.sentiment, post.analysis.sentiment);
    for kind in EntityKind::ALL {
        assert_eq!(podcast.entities.names(kind), post.entities.names(kind));
    }

    assert_eq!(podcast.metadata.format, Format::Podcast);
    assert_eq!(post.metadata.format, Format::Post);
    assert_eq!(podcast.timeline.as_ref().map(Vec::len), Some(1));
    assert!(post.timeline.is_none());
    assert_eq!(
        podcast.metadata.speakers,
        Some(vec!["Alice".to_string(), "Bob".to_string()])
    );
    assert!(post.metadata.speakers.is_none());
}

#[tokio::test]
async fn test_empty_input_fails_for_both_formats() {
    let provider = MockProvider::new(ANALYSIS_RESPONSE);
    let service = service_with(provider.clone());

    for format in [Format::Podcast, Format::Post] {
        for input in ["", "   \n"] {
            let result = service
                .process(format, input, &ProcessingOptions::new(format))
                .await
                .unwrap();
            assert_eq!(result.status, ProcessingStatus::Failed);
            assert!(!result.success);
            assert_eq!(result.error.as_deref(), Some("Invalid input"));
            assert_eq!(result.metadata.format, format);
        }
    }
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_multi_paragraph_transcript() {
    let provider = MockProvider::new(ANALYSIS_RESPONSE);
    let service = service_with(provider.clone());
    let input = sample_transcript();
    assert!(input.len() > 4000);

    let result = service
        .process(Format::Podcast, &input, &ProcessingOptions::new(Format::Podcast))
        .await
        .unwrap();

    assert_eq!(result.status, ProcessingStatus::Completed);
    assert!(result.metadata.chunk_count > 1);
    assert_eq!(provider.call_count(), result.metadata.chunk_count);
    let people = result.entities.names(EntityKind::Person);
    assert!(people.contains(&"Alice"));
    assert!(people.contains(&"Bob"));
    assert_eq!(people.len(), 2);
    assert_eq!(
        result.analysis.sentiment.map(|s| s.overall),
        Some(SentimentLabel::Positive)
    );
    assert_eq!(result.metadata.duration.as_deref(), Some("00:03:10"));
}

#[tokio::test]
async fn test_first_batch_failure_is_failed_result() {
    let mut provider = MockProvider::new(ANALYSIS_RESPONSE);
    provider.fail_when("");
    let service = service_with(provider);

    let result = service
        .process(
            Format::Post,
            &sample_transcript(),
            &ProcessingOptions::new(Format::Post),
        )
        .await
        .unwrap();

    assert_eq!(result.status, ProcessingStatus::Failed);
    assert!(result
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("Batch processing failed")));
    assert_eq!(result.metadata.failed_chunks.len(), 3);
    assert!(result
        .metadata
        .failed_chunks
        .iter()
        .all(|f| f.code == "LLM_ERROR"));
}

#[tokio::test]
async fn test_get_status_round_trip() {
    let service = service_with(MockProvider::new(ANALYSIS_RESPONSE));
    let result = service
        .process(Format::Post, "Some text.", &ProcessingOptions::new(Format::Post))
        .await
        .unwrap();

    let found = service.get_status(Format::Post, result.id).await.unwrap();
    assert_eq!(found, result);

    // Results are kept per adapter
    let err = service
        .get_status(Format::Podcast, result.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(id) if id == result.id));
}

#[tokio::test]
async fn test_unregistered_format_surfaces_as_error() {
    let service = ProcessingService::new();
    service.register_adapter(
        Format::Podcast,
        Arc::new(PodcastAdapter::new(
            Arc::new(MockProvider::new(ANALYSIS_RESPONSE)),
            test_config(),
        )),
    );

    let err = service
        .process(Format::Post, "text", &ProcessingOptions::new(Format::Post))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No adapter registered for format: post");
}

#[tokio::test]
async fn test_mismatched_options_become_failed_result() {
    let service = service_with(MockProvider::new(ANALYSIS_RESPONSE));
    let result = service
        .process(Format::Post, "text", &ProcessingOptions::new(Format::Podcast))
        .await
        .unwrap();

    assert_eq!(result.status, ProcessingStatus::Failed);
    assert!(result.error.unwrap().starts_with("Format mismatch"));
}

#[tokio::test]
async fn test_cancelled_run_is_failed_result() {
    let provider = MockProvider::new(ANALYSIS_RESPONSE).with_delay(Duration::from_millis(500));
    let service = service_with(provider);
    let cancel = CancelToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = service
        .process_with_cancel(
            Format::Podcast,
            "Some text.",
            &ProcessingOptions::new(Format::Podcast),
            &cancel,
        )
        .await
        .unwrap();
    assert_eq!(result.status, ProcessingStatus::Failed);
    assert_eq!(result.error.as_deref(), Some("Processing cancelled"));
}

#[tokio::test]
async fn test_adapter_used_directly() {
    let adapter = PodcastAdapter::new(Arc::new(MockProvider::new(ANALYSIS_RESPONSE)), test_config());
    assert_eq!(adapter.format(), Format::Podcast);

    let result = adapter
        .process("Some text.", &ProcessingOptions::new(Format::Podcast))
        .await
        .unwrap();
    assert_eq!(result.steps.len(), 4);
    assert_eq!(result.metadata.chunk_count, 1);
}

#[tokio::test]
async fn test_template_merge_after_processing() {
    let mut provider = MockProvider::new(ANALYSIS_RESPONSE);
    provider.respond_when(
        "Fill the template",
        r##"{"mergedContent": "# Rust in production\nAlice and Bob talked about Rust."}"##,
    );
    let provider = Arc::new(provider);
    let service = ProcessingService::with_defaults(Arc::clone(&provider), test_config());

    let result = service
        .process(Format::Post, "Some text.", &ProcessingOptions::new(Format::Post))
        .await
        .unwrap();

    let merger = TemplateMerger::new(provider, &test_config());
    let merged = merger
        .merge("# {title}\n{body}", &result.output)
        .await
        .unwrap();
    assert!(merged.starts_with("# Rust in production"));
}
