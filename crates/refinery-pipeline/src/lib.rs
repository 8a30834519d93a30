//! Refinery Pipeline
//!
//! Turns raw content into refined, analyzed output with an LLM.
//!
//! # Architecture
//!
//! ```text
//! Input → Gate → Chunker → Batches of chunks → Strategy (LLM) → Combiner → Output
//! ```
//!
//! # Key Features
//!
//! - **Chunking**: Delimiter-aware windows with overlap, or sentence packing
//! - **Bounded Concurrency**: Chunks run in fixed-size batches with per-chunk timeouts
//! - **Resilient Parsing**: Strict JSON first, field recovery second
//! - **Entity Validation**: Raw entities are schema-checked before they reach a bundle
//! - **Partial Failure**: Failed chunks are reported alongside the combined output
//!
//! # Example Usage
//!
//! ```no_run
//! use refinery_domain::{Format, ProcessingOptions};
//! use refinery_llm::MockProvider;
//! use refinery_pipeline::{
//!     AnalysisStrategy, ChunkOptions, DelimiterChunker, PipelineConfig, ProcessingPipeline,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//! let provider = Arc::new(MockProvider::new(r#"{"refinedContent": "Hello."}"#));
//! let strategy = AnalysisStrategy::new(provider, ProcessingOptions::new(Format::Post), &config);
//! let chunker = DelimiterChunker::new(ChunkOptions::from(&config.chunk));
//!
//! let pipeline = ProcessingPipeline::new(chunker, strategy, &config);
//! let output = pipeline.process("hello").await?;
//!
//! println!("Output: {}", output.result.output);
//! println!("Failed chunks: {}", output.failed_chunks.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod cancel;
mod chunking;
mod combiner;
mod config;
mod error;
mod parser;
mod pipeline;
mod prompt;
mod retry;
mod strategy;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use cancel::CancelToken;
pub use chunking::{ChunkOptions, ChunkingStrategy, DelimiterChunker, SentenceChunker};
pub use combiner::combine_results;
pub use config::{BatchConfig, ChunkConfig, PipelineConfig, TokenConfig};
pub use error::PipelineError;
pub use parser::{parse_structured, parse_structured_response, ParseError, ParseOutcome};
pub use pipeline::ProcessingPipeline;
pub use prompt::PromptBuilder;
pub use retry::RetryPolicy;
pub use strategy::{AnalysisStrategy, ProcessingStrategy, RefineStrategy, REFINED_CONTENT_FIELD};
pub use types::{ChunkResponse, CombinedResult, PipelineOutput, RefineResponse};
pub use validation::{ensure_valid_input, validate_input, validate_input_strict};
