//! Refinery Domain Layer
//!
//! Core data model shared by every Refinery crate: chunks, per-chunk results,
//! entities, analysis aggregates, and the final format-tagged processing result.
//! It also defines the trait boundaries to the outside world (completion
//! service and record persistence). Implementations live in other crates.
//!
//! ## Key Concepts
//!
//! - **TextChunk**: A bounded, ordered slice of the source text
//! - **ChunkResult**: What one LLM call produced for one chunk
//! - **Entity**: A named person, organization, location, event, topic or concept
//! - **EntityBundle**: Entities grouped by category
//! - **ProcessingResult**: The combined, format-tagged outcome of a run
//! - **ProcessingStep**: Progress bookkeeping with monotonic status transitions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod chunk;
pub mod entity;
pub mod result;
pub mod step;
pub mod traits;

// Re-exports for convenience
pub use analysis::{KeyPoint, ProcessingAnalysis, Sentiment, SentimentLabel, Theme, TimelineEvent};
pub use chunk::{ChunkFailure, ChunkResult, ChunkStatus, TextChunk};
pub use entity::{Entity, EntityBundle, EntityDetails, EntityId, EntityKind, Mention};
pub use result::{
    Format, ProcessingOptions, ProcessingResult, ProcessingStatus, Quality, ResultId,
    ResultMetadata,
};
pub use step::{ProcessingStep, StepStatus};
pub use traits::{CompletionProvider, Record, RecordStore, StoreResponse};
