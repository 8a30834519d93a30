//! Scheduler tests for the full pipeline

use crate::{
    AnalysisStrategy, CancelToken, ChunkOptions, ChunkingStrategy, DelimiterChunker,
    PipelineConfig, PipelineError, ProcessingPipeline, ProcessingStrategy, RefineStrategy,
    SentenceChunker,
};
use async_trait::async_trait;
use refinery_domain::{ChunkResult, EntityKind, Format, ProcessingOptions, TextChunk};
use refinery_llm::MockProvider;
use std::sync::Arc;
use std::time::Duration;

fn test_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.batch.max_retries = 0;
    config.batch.retry_delay_ms = 1;
    config
}

fn small_chunks(max_size: usize) -> DelimiterChunker {
    DelimiterChunker::new(ChunkOptions {
        max_size,
        overlap: 0,
        ..ChunkOptions::default()
    })
}

fn analysis_pipeline(
    provider: MockProvider,
    chunker: DelimiterChunker,
    config: &PipelineConfig,
) -> ProcessingPipeline<DelimiterChunker, AnalysisStrategy<MockProvider>> {
    let strategy = AnalysisStrategy::new(
        Arc::new(provider),
        ProcessingOptions::new(Format::Podcast),
        config,
    );
    ProcessingPipeline::new(chunker, strategy, config)
}

#[tokio::test]
async fn test_full_pipeline_flow() {
    let mut provider = MockProvider::default();
    provider.respond_when(
        "Alice",
        r#"{"refinedContent": "Alice opened the show.",
            "entities": [{"name": "Alice", "type": "person", "role": "host", "expertise": ["radio"]}]}"#,
    );
    provider.respond_when(
        "Bob",
        r#"{"refinedContent": "Bob talked about databases.",
            "entities": [{"name": "Bob", "type": "person", "role": "guest", "expertise": ["databases"]}]}"#,
    );

    let config = test_config();
    let pipeline = analysis_pipeline(provider, small_chunks(30), &config);
    let output = pipeline
        .process("Alice opened the show.\nBob talked about databases.\n")
        .await
        .unwrap();

    assert_eq!(output.chunks.len(), 2);
    assert!(output.is_complete());
    assert_eq!(
        output.result.output,
        "Alice opened the show. Bob talked about databases."
    );
    assert_eq!(
        output.result.entities.names(EntityKind::Person),
        vec!["Alice", "Bob"]
    );
}

#[tokio::test]
async fn test_multi_paragraph_scenario() {
    let paragraphs = [
        "Alice welcomed everyone to the show and introduced today's guest. ",
        "Bob described how his team moved their storage layer to Rust. ",
        "Carol asked about the hardest parts of the migration. ",
        "Bob said the borrow checker slowed them down at first. ",
    ];
    let content: String = paragraphs
        .iter()
        .map(|p| p.repeat(15))
        .collect::<Vec<_>>()
        .join("\n");
    assert!(content.len() > 3500);

    let mut provider = MockProvider::new(r#"{"refinedContent": "Segment."}"#);
    for name in ["Alice", "Bob", "Carol"] {
        provider.respond_when(
            name,
            format!(
                r#"{{"refinedContent": "Segment.", "entities": [{{"name": "{}", "type": "person", "role": "speaker", "expertise": ["podcasting"]}}]}}"#,
                name
            ),
        );
    }

    let config = test_config();
    let chunker = DelimiterChunker::new(ChunkOptions::from(&config.chunk));
    let pipeline = analysis_pipeline(provider, chunker, &config);
    let output = pipeline.process(&content).await.unwrap();

    assert!(output.chunks.len() > 1);
    assert!(!output.result.entities.people.is_empty());
}

#[tokio::test]
async fn test_empty_input_is_invalid() {
    let config = test_config();
    let pipeline = analysis_pipeline(MockProvider::default(), small_chunks(10), &config);

    assert_eq!(pipeline.process("").await.unwrap_err(), PipelineError::InvalidInput);
    assert_eq!(pipeline.process("   ").await.unwrap_err(), PipelineError::InvalidInput);
}

#[tokio::test]
async fn test_process_prechunked_input() {
    let provider = MockProvider::new(r#"{"refinedContent": "Refined."}"#);
    let config = test_config();
    let pipeline = analysis_pipeline(provider.clone(), small_chunks(10), &config);

    let chunks = pipeline.chunks("First part.\nSecond part.\n");
    let expected = chunks.clone();
    let output = pipeline
        .process_chunks(chunks, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(output.chunks, expected);
    assert_eq!(provider.call_count(), expected.len());

    assert_eq!(
        pipeline
            .process_chunks(Vec::new(), &CancelToken::new())
            .await
            .unwrap_err(),
        PipelineError::InvalidInput
    );
}

#[tokio::test]
async fn test_first_batch_all_failing_aborts() {
    let mut provider = MockProvider::default();
    provider.fail_when("");

    let config = test_config();
    let pipeline = analysis_pipeline(provider.clone(), small_chunks(5), &config);
    let err = pipeline.process("aaaa\nbbbb\ncccc\ndddd\n").await.unwrap_err();

    assert_eq!(err.code(), "BATCH_PROCESSING_ERROR");
    match err {
        PipelineError::BatchProcessing { errors } => {
            let ids: Vec<_> = errors.iter().map(|e| e.chunk_id).collect();
            assert_eq!(ids, vec![0, 1, 2]);
            assert!(errors.iter().all(|e| e.code == "LLM_ERROR"));
        }
        other => panic!("Expected batch error, got {:?}", other),
    }
    // Second batch never ran
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_partial_batch_failure_is_reported() {
    let mut provider = MockProvider::new(r#"{"refinedContent": "ok"}"#);
    provider.fail_when("bbbb");

    let config = test_config();
    let pipeline = analysis_pipeline(provider, small_chunks(5), &config);
    let output = pipeline.process("aaaa\nbbbb\ncccc\n").await.unwrap();

    assert!(!output.is_complete());
    assert_eq!(output.failed_chunks.len(), 1);
    assert_eq!(output.failed_chunks[0].chunk_id, 1);
    assert_eq!(output.result.output, "ok ok");
}

#[tokio::test]
async fn test_concurrency_bounded_by_batch_size() {
    let provider =
        MockProvider::new(r#"{"refinedContent": "ok"}"#).with_delay(Duration::from_millis(20));

    let config = test_config();
    let pipeline = analysis_pipeline(provider.clone(), small_chunks(5), &config);
    let output = pipeline
        .process("aaaa\nbbbb\ncccc\ndddd\neeee\nffff\ngggg\n")
        .await
        .unwrap();

    assert_eq!(output.chunks.len(), 7);
    assert_eq!(provider.call_count(), 7);
    assert!(provider.max_concurrency() <= 3);
    assert!(provider.max_concurrency() >= 2);
}

#[tokio::test]
async fn test_chunk_timeout_is_recorded() {
    let slow = MockProvider::new(r#"{"refinedContent": "late"}"#)
        .with_delay(Duration::from_millis(200));

    let mut config = test_config();
    config.batch.timeout_ms = 20;
    let pipeline = analysis_pipeline(slow, small_chunks(5), &config);
    let err = pipeline.process("aaaa\n").await.unwrap_err();

    match err {
        PipelineError::BatchProcessing { errors } => assert_eq!(errors[0].code, "TIMEOUT"),
        other => panic!("Expected batch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cancel_before_start() {
    let config = test_config();
    let pipeline = analysis_pipeline(MockProvider::default(), small_chunks(5), &config);
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = pipeline.process_with_cancel("aaaa\n", &cancel).await.unwrap_err();
    assert_eq!(err, PipelineError::Cancelled);
}

#[tokio::test]
async fn test_cancel_during_batch() {
    let provider = MockProvider::new(r#"{"refinedContent": "ok"}"#)
        .with_delay(Duration::from_millis(500));
    let config = test_config();
    let pipeline = analysis_pipeline(provider, small_chunks(5), &config);
    let cancel = CancelToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = pipeline.process_with_cancel("aaaa\nbbbb\n", &cancel).await.unwrap_err();
    assert_eq!(err, PipelineError::Cancelled);
}

#[tokio::test]
async fn test_concurrent_calls_share_pipeline() {
    let mut provider = MockProvider::default();
    provider.respond_when("first", r#"{"refinedContent": "First."}"#);
    provider.respond_when("second", r#"{"refinedContent": "Second."}"#);

    let config = test_config();
    let pipeline = analysis_pipeline(provider, small_chunks(100), &config);
    let (a, b) = tokio::join!(pipeline.process("first"), pipeline.process("second"));

    assert_eq!(a.unwrap().result.output, "First.");
    assert_eq!(b.unwrap().result.output, "Second.");
}

struct RejectAll;

impl ChunkingStrategy for RejectAll {
    fn chunk(&self, content: &str) -> Vec<TextChunk> {
        vec![TextChunk::new(0, content, 0, 0)]
    }
}

#[tokio::test]
async fn test_invalid_chunks_rejected() {
    let config = test_config();
    let strategy = AnalysisStrategy::new(
        Arc::new(MockProvider::default()),
        ProcessingOptions::new(Format::Post),
        &config,
    );
    let pipeline = ProcessingPipeline::new(RejectAll, strategy, &config);

    let err = pipeline.process("text").await.unwrap_err();
    assert_eq!(err, PipelineError::InvalidChunks);
    assert_eq!(err.to_string(), "Invalid chunks generated");
}

/// Finishes chunks in reverse order
struct ReverseDelay;

#[async_trait]
impl ProcessingStrategy for ReverseDelay {
    type Output = Vec<usize>;

    async fn process(&self, chunk: &TextChunk) -> Result<ChunkResult, PipelineError> {
        let delay = 30u64.saturating_sub(chunk.id as u64 * 10);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(ChunkResult::for_chunk(chunk))
    }

    fn combine(&self, results: Vec<ChunkResult>) -> Result<Vec<usize>, PipelineError> {
        Ok(results.iter().map(|r| r.id).collect())
    }
}

#[tokio::test]
async fn test_results_in_chunk_order() {
    let config = test_config();
    let pipeline = ProcessingPipeline::new(small_chunks(5), ReverseDelay, &config);
    let output = pipeline.process("aaaa\nbbbb\ncccc\ndddd\n").await.unwrap();
    assert_eq!(output.result, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_sentence_refine_pipeline() {
    let provider = MockProvider::new(r#"{"refinedContent": "Clean."}"#);
    let config = test_config();
    let strategy = RefineStrategy::new(
        Arc::new(provider),
        ProcessingOptions::new(Format::Post),
        &config,
    );
    let pipeline = ProcessingPipeline::new(SentenceChunker::new(20, 0), strategy, &config);

    let output = pipeline
        .process("One two. Three four. Five six. Seven.")
        .await
        .unwrap();
    assert_eq!(output.chunks.len(), 2);
    assert_eq!(output.result, "Clean. Clean.");
}
