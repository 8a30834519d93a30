//! Batch scheduler: chunk, process in bounded batches, combine

use crate::cancel::CancelToken;
use crate::chunking::ChunkingStrategy;
use crate::config::{BatchConfig, PipelineConfig};
use crate::error::PipelineError;
use crate::strategy::ProcessingStrategy;
use crate::types::PipelineOutput;
use crate::validation::validate_input;
use futures::future::join_all;
use refinery_domain::{ChunkResult, TextChunk};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Runs a chunking strategy and a processing strategy over an input
///
/// All run state lives inside [`ProcessingPipeline::process`], so one
/// pipeline can serve concurrent calls.
pub struct ProcessingPipeline<C, S> {
    chunker: C,
    strategy: S,
    batch: BatchConfig,
}

impl<C, S> ProcessingPipeline<C, S>
where
    C: ChunkingStrategy,
    S: ProcessingStrategy,
{
    /// Create a new pipeline
    pub fn new(chunker: C, strategy: S, config: &PipelineConfig) -> Self {
        Self {
            chunker,
            strategy,
            batch: config.batch.clone(),
        }
    }

    /// Get the strategy
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Chunk an input without processing it
    pub fn chunks(&self, input: &str) -> Vec<TextChunk> {
        self.chunker.chunk(input)
    }

    /// Process an input
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The input is empty or produces no chunks (`InvalidInput`)
    /// - A chunk fails validation (`InvalidChunks`)
    /// - Every chunk of some batch fails (`BatchProcessing`)
    /// - The strategy cannot combine the results
    pub async fn process(&self, input: &str) -> Result<PipelineOutput<S::Output>, PipelineError> {
        self.process_with_cancel(input, &CancelToken::new()).await
    }

    /// Process an input, stopping early when `cancel` fires
    pub async fn process_with_cancel(
        &self,
        input: &str,
        cancel: &CancelToken,
    ) -> Result<PipelineOutput<S::Output>, PipelineError> {
        if !validate_input(input) {
            return Err(PipelineError::InvalidInput);
        }
        self.process_chunks(self.chunker.chunk(input), cancel).await
    }

    /// Process chunks already produced by [`ProcessingPipeline::chunks`]
    ///
    /// Fails the same way as [`ProcessingPipeline::process`], except that
    /// the raw input is not checked.
    pub async fn process_chunks(
        &self,
        chunks: Vec<TextChunk>,
        cancel: &CancelToken,
    ) -> Result<PipelineOutput<S::Output>, PipelineError> {
        if chunks.is_empty() {
            return Err(PipelineError::InvalidInput);
        }
        if let Some(bad) = chunks
            .iter()
            .find(|c| !self.chunker.validate(c) || !self.strategy.validate(c))
        {
            warn!("Chunk {} failed validation", bad.id);
            return Err(PipelineError::InvalidChunks);
        }

        let batch_size = self.batch.batch_size.max(1);
        let batch_count = chunks.len().div_ceil(batch_size);
        info!(
            "Processing {} chunks in {} batches of up to {}",
            chunks.len(),
            batch_count,
            batch_size
        );

        let mut results: Vec<ChunkResult> = Vec::with_capacity(chunks.len());
        let mut failed_chunks = Vec::new();

        for (index, batch) in chunks.chunks(batch_size).enumerate() {
            if cancel.is_cancelled() {
                info!("Cancelled before batch {}/{}", index + 1, batch_count);
                return Err(PipelineError::Cancelled);
            }
            debug!("Processing batch {}/{}", index + 1, batch_count);

            let calls = batch.iter().map(|chunk| self.process_chunk(chunk));
            let outcomes = tokio::select! {
                outcomes = join_all(calls) => outcomes,
                _ = cancel.cancelled() => {
                    info!("Cancelled during batch {}/{}", index + 1, batch_count);
                    return Err(PipelineError::Cancelled);
                }
            };

            let mut batch_failures = Vec::new();
            for (chunk, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        warn!("Chunk {} failed: {}", chunk.id, e);
                        batch_failures.push(e.to_failure(chunk.id));
                    }
                }
            }

            if batch_failures.len() == batch.len() {
                warn!("Every chunk in batch {}/{} failed", index + 1, batch_count);
                return Err(PipelineError::BatchProcessing {
                    errors: batch_failures,
                });
            }
            failed_chunks.extend(batch_failures);
        }

        results.sort_by_key(|r| r.id);
        info!(
            "Pipeline complete: {} chunks succeeded, {} failed",
            results.len(),
            failed_chunks.len()
        );

        let result = self.strategy.combine(results)?;
        Ok(PipelineOutput {
            result,
            chunks,
            failed_chunks,
        })
    }

    async fn process_chunk(&self, chunk: &TextChunk) -> Result<ChunkResult, PipelineError> {
        timeout(self.batch.timeout(), self.strategy.process(chunk))
            .await
            .map_err(|_| PipelineError::Timeout {
                chunk_id: chunk.id,
                timeout_ms: self.batch.timeout_ms,
            })?
    }
}
