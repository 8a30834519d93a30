//! Error types for the pipeline

use crate::parser::ParseError;
use refinery_domain::ChunkFailure;
use thiserror::Error;

/// Errors that can occur while processing content
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Input failed the validation gate
    #[error("Invalid input")]
    InvalidInput,

    /// Chunker produced a chunk that failed validation
    #[error("Invalid chunks generated")]
    InvalidChunks,

    /// Strategy could not produce a result for a chunk
    #[error("Chunk {chunk_id} failed: {message}")]
    ChunkProcessing {
        /// Failing chunk
        chunk_id: usize,
        /// What went wrong
        message: String,
    },

    /// A chunk call exceeded the configured timeout
    #[error("Chunk {chunk_id} timed out after {timeout_ms}ms")]
    Timeout {
        /// Failing chunk
        chunk_id: usize,
        /// Configured timeout
        timeout_ms: u64,
    },

    /// Completion provider error
    #[error("LLM error on chunk {chunk_id}: {message}")]
    Llm {
        /// Failing chunk
        chunk_id: usize,
        /// Provider error message
        message: String,
        /// Whether the provider reported a transient failure
        retryable: bool,
    },

    /// LLM response could not be parsed
    #[error("Parse error on chunk {chunk_id}: {error}")]
    Parse {
        /// Failing chunk
        chunk_id: usize,
        /// Parser error
        error: ParseError,
    },

    /// Prompt is estimated to exceed the per-request token limit
    #[error("Chunk {chunk_id} needs ~{estimated} tokens (max: {max})")]
    TokenBudget {
        /// Failing chunk
        chunk_id: usize,
        /// Estimated prompt tokens
        estimated: usize,
        /// Configured limit
        max: usize,
    },

    /// Every chunk in a batch failed
    #[error("Batch processing failed: {} chunk(s) failed", .errors.len())]
    BatchProcessing {
        /// One entry per failed chunk
        errors: Vec<ChunkFailure>,
    },

    /// Run was cancelled
    #[error("Processing cancelled")]
    Cancelled,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput => "VALIDATION_ERROR",
            PipelineError::InvalidChunks => "INVALID_CHUNKS",
            PipelineError::ChunkProcessing { .. } => "CHUNK_PROCESSING_ERROR",
            PipelineError::Timeout { .. } => "TIMEOUT",
            PipelineError::Llm { .. } => "LLM_ERROR",
            PipelineError::Parse { .. } => "PARSE_ERROR",
            PipelineError::TokenBudget { .. } => "TOKEN_BUDGET_EXCEEDED",
            PipelineError::BatchProcessing { .. } => "BATCH_PROCESSING_ERROR",
            PipelineError::Cancelled => "CANCELLED",
            PipelineError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Chunk the error belongs to, if any
    pub fn chunk_id(&self) -> Option<usize> {
        match self {
            PipelineError::ChunkProcessing { chunk_id, .. }
            | PipelineError::Timeout { chunk_id, .. }
            | PipelineError::Llm { chunk_id, .. }
            | PipelineError::Parse { chunk_id, .. }
            | PipelineError::TokenBudget { chunk_id, .. } => Some(*chunk_id),
            _ => None,
        }
    }

    /// Whether a retry could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Llm { retryable: true, .. })
    }

    /// Record this error as a chunk failure
    ///
    /// `fallback_id` is used for errors that carry no chunk id.
    pub fn to_failure(&self, fallback_id: usize) -> ChunkFailure {
        ChunkFailure {
            chunk_id: self.chunk_id().unwrap_or(fallback_id),
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}
