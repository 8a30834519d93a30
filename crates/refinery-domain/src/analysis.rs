//! Analysis aggregates: timeline, themes, key points, sentiment

use crate::entity::EntityBundle;
use serde::{Deserialize, Serialize};

/// A point on the content timeline
///
/// `timestamp` is compared as a plain string (`HH:MM:SS` or a section id), so
/// producers should zero-pad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Position in the source
    #[serde(alias = "time")]
    pub timestamp: String,

    /// What happened
    pub event: String,

    /// Who was speaking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speakers: Option<Vec<String>>,

    /// Topics touched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
}

impl TimelineEvent {
    /// Create an event with no speaker or topic metadata
    pub fn new(timestamp: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            event: event.into(),
            speakers: None,
            topics: None,
        }
    }
}

/// A recurring theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme title; identity key for deduplication
    #[serde(alias = "name")]
    pub title: String,

    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A key point made in the content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    /// Point title; identity key for deduplication
    #[serde(alias = "name", alias = "point")]
    pub title: String,

    /// Supporting detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Coarse sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    /// Mostly positive
    Positive,
    /// Neither positive nor negative
    Neutral,
    /// Mostly negative
    Negative,
    /// Strong positive and negative passages
    Mixed,
    /// Label the producer used that we do not recognise
    #[serde(other)]
    Unknown,
}

impl SentimentLabel {
    /// Label for a score in [-1, 1]
    ///
    /// # Examples
    ///
    /// ```
    /// use refinery_domain::SentimentLabel;
    ///
    /// assert_eq!(SentimentLabel::from_score(0.6), SentimentLabel::Positive);
    /// assert_eq!(SentimentLabel::from_score(0.0), SentimentLabel::Neutral);
    /// assert_eq!(SentimentLabel::from_score(-0.5), SentimentLabel::Negative);
    /// ```
    pub fn from_score(score: f64) -> Self {
        if score > 0.2 {
            SentimentLabel::Positive
        } else if score < -0.2 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Sentiment of a passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Overall label
    pub overall: SentimentLabel,

    /// Score in [-1, 1]
    #[serde(default)]
    pub score: f64,
}

impl Sentiment {
    /// Sentiment from a score, with the label derived from it
    pub fn from_score(score: f64) -> Self {
        let score = score.clamp(-1.0, 1.0);
        Self {
            overall: SentimentLabel::from_score(score),
            score,
        }
    }
}

/// Optional-heavy analysis aggregate
///
/// A partial result may carry any subset of these sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingAnalysis {
    /// Content title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Entities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<EntityBundle>,

    /// Timeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Vec<TimelineEvent>>,

    /// Sentiment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,

    /// Topic names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,

    /// Themes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<Theme>>,

    /// Key points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_points: Option<Vec<KeyPoint>>,

    /// Short standalone facts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_facts: Option<Vec<String>>,
}
