//! Types for pipeline requests and results

use refinery_domain::{
    ChunkFailure, ChunkResult, EntityBundle, KeyPoint, ProcessingAnalysis, Sentiment, TextChunk,
    Theme, TimelineEvent,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a pipeline run returns
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput<T> {
    /// Combined output of the strategy
    pub result: T,

    /// Chunks the input was split into
    pub chunks: Vec<TextChunk>,

    /// Chunks that failed in batches where at least one chunk succeeded
    pub failed_chunks: Vec<ChunkFailure>,
}

impl<T> PipelineOutput<T> {
    /// Whether every chunk succeeded
    pub fn is_complete(&self) -> bool {
        self.failed_chunks.is_empty()
    }
}

/// Chunk results combined into one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedResult {
    /// Refined texts joined with a space
    pub output: String,

    /// Refined texts joined with a newline
    pub transcript: String,

    /// Merged document-level analysis
    pub analysis: ProcessingAnalysis,

    /// Entities merged by name
    pub entities: EntityBundle,

    /// Timeline sorted by timestamp
    pub timeline: Vec<TimelineEvent>,

    /// Per-chunk results in chunk order
    pub chunks: Vec<ChunkResult>,
}

/// Expected shape of the analysis response for one chunk
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkResponse {
    /// Cleaned-up chunk text (required)
    pub refined_content: String,

    /// Short title
    #[serde(default)]
    pub title: Option<String>,

    /// Chunk summary
    #[serde(default)]
    pub summary: Option<String>,

    /// Either an array of typed entities or an object keyed by category
    #[serde(default)]
    pub entities: Option<Value>,

    /// Timeline events
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,

    /// Sentiment
    #[serde(default)]
    pub sentiment: Option<Sentiment>,

    /// Topics
    #[serde(default)]
    pub topics: Vec<String>,

    /// Themes
    #[serde(default)]
    pub themes: Vec<Theme>,

    /// Key points
    #[serde(default)]
    pub key_points: Vec<KeyPoint>,

    /// Quick facts
    #[serde(default)]
    pub quick_facts: Vec<String>,
}

impl ChunkResponse {
    /// Raw entity objects with a `type` on each
    ///
    /// Entities listed under a category key inherit the category as their
    /// type when they carry none.
    pub fn raw_entities(&self) -> Vec<Value> {
        match &self.entities {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Object(categories)) => categories
                .iter()
                .filter_map(|(category, items)| items.as_array().map(|items| (category, items)))
                .flat_map(|(category, items)| {
                    items.iter().cloned().map(move |mut item| {
                        if let Value::Object(fields) = &mut item {
                            fields
                                .entry("type")
                                .or_insert_with(|| Value::String(category.clone()));
                        }
                        item
                    })
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Chunk-level analysis from the optional sections
    pub fn analysis(&self) -> ProcessingAnalysis {
        fn non_empty<T: Clone>(items: &[T]) -> Option<Vec<T>> {
            (!items.is_empty()).then(|| items.to_vec())
        }

        ProcessingAnalysis {
            title: self.title.clone(),
            summary: self.summary.clone(),
            sentiment: self.sentiment.clone(),
            topics: non_empty(&self.topics),
            themes: non_empty(&self.themes),
            key_points: non_empty(&self.key_points),
            quick_facts: non_empty(&self.quick_facts),
            ..ProcessingAnalysis::default()
        }
    }
}

/// Expected shape of a refine-only response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineResponse {
    /// Cleaned-up chunk text
    pub refined_content: String,
}
