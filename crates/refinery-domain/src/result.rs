//! Final, format-tagged processing results

use crate::analysis::{ProcessingAnalysis, TimelineEvent};
use crate::chunk::{ChunkFailure, TextChunk};
use crate::entity::EntityBundle;
use crate::step::ProcessingStep;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a processing result
pub type ResultId = uuid::Uuid;

/// Content format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Podcast transcript (timeline and speakers)
    Podcast,
    /// Blog post draft
    Post,
}

impl Format {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Podcast => "podcast",
            Format::Post => "post",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "podcast" => Ok(Format::Podcast),
            "post" | "blog" => Ok(Format::Post),
            other => Err(format!("Unknown format: {}", other)),
        }
    }
}

/// Requested output quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Fast, lower-effort pass
    #[default]
    Draft,
    /// Publication-ready pass
    Final,
}

/// Per-call processing options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
    /// Content format
    pub format: Format,

    /// Output quality
    #[serde(default)]
    pub quality: Quality,

    /// Platform the output is intended for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_platform: Option<String>,

    /// Ask for sentiment analysis
    #[serde(default = "default_true")]
    pub analyze_sentiment: bool,

    /// Ask for entity extraction
    #[serde(default = "default_true")]
    pub extract_entities: bool,

    /// Ask for timestamps on timeline events
    #[serde(default = "default_true")]
    pub include_timestamps: bool,
}

fn default_true() -> bool {
    true
}

impl ProcessingOptions {
    /// Default options for a format: draft quality, every analysis enabled
    pub fn new(format: Format) -> Self {
        Self {
            format,
            quality: Quality::Draft,
            target_platform: None,
            analyze_sentiment: true,
            extract_entities: true,
            include_timestamps: true,
        }
    }

    /// Set the output quality
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Set the target platform
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.target_platform = Some(platform.into());
        self
    }

    /// Platform name used in result metadata
    pub fn platform(&self) -> String {
        self.target_platform
            .clone()
            .unwrap_or_else(|| "web".to_string())
    }
}

/// Lifecycle status of a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    /// Not started
    Pending,
    /// In progress
    Processing,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

/// Metadata attached by the format adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    /// Content format
    pub format: Format,

    /// Target platform
    pub platform: String,

    /// When processing finished
    pub processed_at: DateTime<Utc>,

    /// Requested quality
    pub quality: Quality,

    /// Speakers (podcast only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speakers: Option<Vec<String>>,

    /// Duration as the last timeline timestamp (podcast only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// Number of chunks the input was split into
    #[serde(default)]
    pub chunk_count: usize,

    /// Chunks dropped from the combined output
    #[serde(default)]
    pub failed_chunks: Vec<ChunkFailure>,
}

impl ResultMetadata {
    /// Metadata with no chunk information yet
    pub fn new(format: Format, options: &ProcessingOptions) -> Self {
        Self {
            format,
            platform: options.platform(),
            processed_at: Utc::now(),
            quality: options.quality,
            speakers: None,
            duration: None,
            chunk_count: 0,
            failed_chunks: Vec::new(),
        }
    }
}

/// The combined, format-tagged outcome of one processing call
///
/// Created fresh per call and never mutated after it is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    /// Unique identifier
    pub id: ResultId,

    /// Content format
    pub format: Format,

    /// Lifecycle status
    pub status: ProcessingStatus,

    /// Whether processing succeeded
    pub success: bool,

    /// Combined refined output
    pub output: String,

    /// Error message when failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Format-specific metadata
    pub metadata: ResultMetadata,

    /// Combined analysis
    #[serde(default)]
    pub analysis: ProcessingAnalysis,

    /// Combined entities
    #[serde(default)]
    pub entities: EntityBundle,

    /// Timeline (podcast only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Vec<TimelineEvent>>,

    /// Newline-joined refined transcript
    #[serde(default)]
    pub transcript: String,

    /// Chunks the input was split into
    #[serde(default)]
    pub chunks: Vec<TextChunk>,

    /// Progress bookkeeping
    #[serde(default)]
    pub steps: Vec<ProcessingStep>,
}

impl ProcessingResult {
    /// A failed result carrying only the error
    ///
    /// # Examples
    ///
    /// ```
    /// use refinery_domain::{Format, ProcessingOptions, ProcessingResult, ProcessingStatus};
    ///
    /// let options = ProcessingOptions::new(Format::Post);
    /// let result = ProcessingResult::failed(Format::Post, &options, "Invalid input");
    /// assert_eq!(result.status, ProcessingStatus::Failed);
    /// assert!(!result.success);
    /// assert_eq!(result.error.as_deref(), Some("Invalid input"));
    /// ```
    pub fn failed(format: Format, options: &ProcessingOptions, error: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::now_v7(),
            format,
            status: ProcessingStatus::Failed,
            success: false,
            output: String::new(),
            error: Some(error.into()),
            metadata: ResultMetadata::new(format, options),
            analysis: ProcessingAnalysis::default(),
            entities: EntityBundle::default(),
            timeline: None,
            transcript: String::new(),
            chunks: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Attach progress steps
    pub fn with_steps(mut self, steps: Vec<ProcessingStep>) -> Self {
        self.steps = steps;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!("podcast".parse::<Format>().unwrap(), Format::Podcast);
        assert_eq!("POST".parse::<Format>().unwrap(), Format::Post);
        assert_eq!("blog".parse::<Format>().unwrap(), Format::Post);
        assert!("video".parse::<Format>().is_err());
    }

    #[test]
    fn test_options_defaults() {
        let options = ProcessingOptions::new(Format::Podcast);
        assert_eq!(options.quality, Quality::Draft);
        assert!(options.analyze_sentiment);
        assert!(options.extract_entities);
        assert!(options.include_timestamps);
        assert_eq!(options.platform(), "web");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ProcessingOptions =
            serde_json::from_str(r#"{"format": "post", "quality": "final"}"#).unwrap();
        assert_eq!(options.format, Format::Post);
        assert_eq!(options.quality, Quality::Final);
        assert!(options.extract_entities);
    }

    #[test]
    fn test_failed_result_metadata() {
        let options = ProcessingOptions::new(Format::Podcast).with_platform("spotify");
        let result = ProcessingResult::failed(Format::Podcast, &options, "boom");

        assert_eq!(result.metadata.format, Format::Podcast);
        assert_eq!(result.metadata.platform, "spotify");
        assert!(result.output.is_empty());
        assert!(result.timeline.is_none());
    }
}
