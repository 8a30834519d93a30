//! Chunk command implementation.

use super::read_input;
use crate::cli::ChunkArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use refinery_domain::TextChunk;
use refinery_pipeline::{
    ChunkOptions, ChunkingStrategy, DelimiterChunker, PipelineConfig, SentenceChunker,
};
use tracing::debug;

/// Execute the chunk command.
pub fn execute_chunk(args: ChunkArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let content = read_input(&args.file)?;
    let chunks = chunk_content(&content, &args, &config.pipeline)?;
    println!("{}", formatter.format_chunks(&chunks)?);
    Ok(())
}

/// Chunk `content` with the configured chunker and any overrides.
pub fn chunk_content(content: &str, args: &ChunkArgs, pipeline: &PipelineConfig) -> Result<Vec<TextChunk>> {
    let mut pipeline = pipeline.clone();
    if args.sentence {
        if let Some(max_size) = args.max_size {
            pipeline.chunk.sentence_budget = max_size;
        }
        if let Some(overlap) = args.overlap {
            pipeline.chunk.overlap_words = overlap;
        }
    } else {
        if let Some(max_size) = args.max_size {
            pipeline.chunk.max_size = max_size;
        }
        if let Some(overlap) = args.overlap {
            pipeline.chunk.overlap = overlap;
        }
    }
    pipeline.validate()?;

    let chunks = if args.sentence {
        SentenceChunker::from(&pipeline.chunk).chunk(content)
    } else {
        DelimiterChunker::new(ChunkOptions::from(&pipeline.chunk)).chunk(content)
    };
    debug!("{} bytes -> {} chunk(s)", content.len(), chunks.len());
    Ok(chunks)
}
