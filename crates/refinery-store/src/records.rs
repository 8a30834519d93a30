//! Persisted record types: posts and templates

use chrono::{DateTime, Utc};
use refinery_domain::{Format, ProcessingAnalysis, ProcessingResult, Record};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Publication status of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Editable draft
    #[default]
    Draft,
    /// Published
    Published,
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostStatus::Draft => f.write_str("draft"),
            PostStatus::Published => f.write_str("published"),
        }
    }
}

/// A processed piece of content saved for editing and publishing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identifier
    pub id: Uuid,

    /// Title
    pub title: String,

    /// Body text
    pub content: String,

    /// Format the content was processed as
    pub format: Format,

    /// Publication status
    #[serde(default)]
    pub status: PostStatus,

    /// Template the post was merged into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Uuid>,

    /// Analysis from processing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ProcessingAnalysis>,

    /// When the post was created
    pub created_at: DateTime<Utc>,

    /// When the post was last changed
    pub updated_at: DateTime<Utc>,

    /// When the post was published
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a draft post
    pub fn new(title: impl Into<String>, content: impl Into<String>, format: Format) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            content: content.into(),
            format,
            status: PostStatus::Draft,
            template_id: None,
            analysis: None,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    /// Draft post from a completed processing result
    ///
    /// The title comes from the analysis when there is one.
    pub fn from_result(result: &ProcessingResult) -> Self {
        let title = result
            .analysis
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled".to_string());
        let mut post = Self::new(title, result.output.clone(), result.format);
        post.analysis = Some(result.analysis.clone());
        post
    }

    /// Whether the post is published
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}

impl Record for Post {
    const TABLE: &'static str = "posts";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// A reusable layout that processed content is merged into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Unique identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Template text with placeholders
    pub body: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the template was created
    pub created_at: DateTime<Utc>,

    /// When the template was last changed
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// Create a template
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            body: body.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Record for Template {
    const TABLE: &'static str = "templates";

    fn id(&self) -> Uuid {
        self.id
    }
}
