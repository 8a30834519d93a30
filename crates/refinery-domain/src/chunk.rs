//! Text chunks and the per-chunk results produced from them

use crate::analysis::{ProcessingAnalysis, TimelineEvent};
use crate::entity::EntityBundle;
use serde::{Deserialize, Serialize};

/// A bounded slice of the source text
///
/// Offsets are byte offsets into the source and always fall on UTF-8
/// character boundaries. Ids are dense and zero-based within one chunking run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChunk {
    /// Sequence index within the chunking run
    pub id: usize,

    /// Chunk text
    pub text: String,

    /// Inclusive start offset in the source
    pub start_offset: usize,

    /// Exclusive end offset in the source
    pub end_offset: usize,
}

impl TextChunk {
    /// Create a new chunk
    pub fn new(id: usize, text: impl Into<String>, start_offset: usize, end_offset: usize) -> Self {
        Self {
            id,
            text: text.into(),
            start_offset,
            end_offset,
        }
    }

    /// A chunk is valid iff it has text and a non-empty span
    ///
    /// # Examples
    ///
    /// ```
    /// use refinery_domain::TextChunk;
    ///
    /// assert!(TextChunk::new(0, "hello", 0, 5).is_valid());
    /// assert!(!TextChunk::new(0, "", 0, 0).is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        !self.text.is_empty() && self.end_offset > self.start_offset
    }

    /// Length of the covered span in bytes
    pub fn span_len(&self) -> usize {
        self.end_offset.saturating_sub(self.start_offset)
    }
}

/// Outcome of processing a single chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStatus {
    /// Chunk processed and parsed successfully
    Completed,
    /// Chunk processed but some optional sections could not be used
    Partial,
    /// Chunk could not be processed
    Failed,
}

/// What the processing strategy produced for one chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkResult {
    /// Matches the source chunk id
    pub id: usize,

    /// Original chunk text
    pub text: String,

    /// Refined (cleaned up) text
    pub refined_text: String,

    /// Validated entities found in this chunk
    #[serde(default)]
    pub entities: EntityBundle,

    /// Partial analysis for this chunk
    #[serde(default)]
    pub analysis: ProcessingAnalysis,

    /// Timeline events found in this chunk
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,

    /// Processing status
    pub status: ChunkStatus,

    /// Error or warning detail, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChunkResult {
    /// Start a result for the given chunk with no refined text yet
    pub fn for_chunk(chunk: &TextChunk) -> Self {
        Self {
            id: chunk.id,
            text: chunk.text.clone(),
            refined_text: String::new(),
            entities: EntityBundle::default(),
            analysis: ProcessingAnalysis::default(),
            timeline: Vec::new(),
            status: ChunkStatus::Completed,
            error: None,
        }
    }

    /// Set the refined text
    pub fn with_refined_text(mut self, refined_text: impl Into<String>) -> Self {
        self.refined_text = refined_text.into();
        self
    }
}

/// A chunk that failed during a pipeline run
///
/// Returned alongside the combined output so callers can decide whether a
/// partial result is acceptable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkFailure {
    /// Id of the failed chunk
    pub chunk_id: usize,

    /// Stable error code
    pub code: String,

    /// Human-readable message
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_validity() {
        assert!(TextChunk::new(0, "abc", 0, 3).is_valid());
        assert!(!TextChunk::new(0, "", 0, 3).is_valid());
        assert!(!TextChunk::new(0, "abc", 3, 3).is_valid());
        assert!(!TextChunk::new(0, "abc", 4, 3).is_valid());
    }

    #[test]
    fn test_span_len_saturates() {
        assert_eq!(TextChunk::new(0, "abc", 2, 7).span_len(), 5);
        assert_eq!(TextChunk::new(0, "abc", 7, 2).span_len(), 0);
    }

    #[test]
    fn test_chunk_result_for_chunk() {
        let chunk = TextChunk::new(4, "Some text", 10, 19);
        let result = ChunkResult::for_chunk(&chunk).with_refined_text("Some refined text");

        assert_eq!(result.id, 4);
        assert_eq!(result.text, "Some text");
        assert_eq!(result.refined_text, "Some refined text");
        assert_eq!(result.status, ChunkStatus::Completed);
        assert!(result.entities.is_empty());
        assert!(result.timeline.is_empty());
    }

    #[test]
    fn test_chunk_result_tolerates_missing_sections() {
        let json = r#"{"id": 1, "text": "t", "refinedText": "r", "status": "completed"}"#;
        let result: ChunkResult = serde_json::from_str(json).unwrap();
        assert!(result.entities.is_empty());
        assert!(result.analysis.summary.is_none());
        assert!(result.timeline.is_empty());
    }
}
