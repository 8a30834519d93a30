//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use refinery_domain::{EntityKind, ProcessingResult, TextChunk};
use refinery_store::{Post, Template};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const PREVIEW_CHARS: usize = 48;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a processing result.
    ///
    /// Quiet mode prints only the refined output.
    pub fn format_result(&self, result: &ProcessingResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(result),
            OutputFormat::Quiet => Ok(result.output.clone()),
            OutputFormat::Table => Ok(self.format_result_table(result)),
        }
    }

    fn format_result_table(&self, result: &ProcessingResult) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        builder.push_record(["ID".to_string(), result.id.to_string()]);
        builder.push_record(["Format".to_string(), result.format.to_string()]);
        builder.push_record(["Status".to_string(), status_label(result)]);
        builder.push_record(["Chunks".to_string(), result.metadata.chunk_count.to_string()]);
        builder.push_record([
            "Failed chunks".to_string(),
            result.metadata.failed_chunks.len().to_string(),
        ]);
        if let Some(title) = &result.analysis.title {
            builder.push_record(["Title".to_string(), title.clone()]);
        }
        if let Some(sentiment) = &result.analysis.sentiment {
            builder.push_record([
                "Sentiment".to_string(),
                format!("{:?} ({:.2})", sentiment.overall, sentiment.score),
            ]);
        }
        if let Some(speakers) = &result.metadata.speakers {
            builder.push_record(["Speakers".to_string(), speakers.join(", ")]);
        }
        if let Some(duration) = &result.metadata.duration {
            builder.push_record(["Duration".to_string(), duration.clone()]);
        }

        let mut sections = vec![table(builder)];

        if let Some(error) = &result.error {
            sections.push(self.error(error));
        }
        if !result.metadata.failed_chunks.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Chunk", "Code", "Message"]);
            for failure in &result.metadata.failed_chunks {
                builder.push_record([
                    failure.chunk_id.to_string(),
                    failure.code.clone(),
                    failure.message.clone(),
                ]);
            }
            sections.push(table(builder));
        }
        if !result.entities.is_empty() {
            sections.push(entity_table(result));
        }
        if !result.output.is_empty() {
            sections.push(result.output.clone());
        }

        sections.join("\n\n")
    }

    /// Format chunks.
    pub fn format_chunks(&self, chunks: &[TextChunk]) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(&chunks),
            OutputFormat::Quiet => Ok(chunks.len().to_string()),
            OutputFormat::Table => {
                if chunks.is_empty() {
                    return Ok(self.colorize("No chunks produced.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "Start", "End", "Bytes", "Preview"]);
                for chunk in chunks {
                    builder.push_record([
                        chunk.id.to_string(),
                        chunk.start_offset.to_string(),
                        chunk.end_offset.to_string(),
                        chunk.span_len().to_string(),
                        preview(&chunk.text),
                    ]);
                }
                Ok(table(builder))
            }
        }
    }

    /// Format posts.
    pub fn format_posts(&self, posts: &[Post]) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(&posts),
            OutputFormat::Quiet => Ok(ids(posts.iter().map(|p| p.id.to_string()))),
            OutputFormat::Table => {
                if posts.is_empty() {
                    return Ok(self.colorize("No posts found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "Title", "Format", "Status", "Updated"]);
                for post in posts {
                    builder.push_record([
                        post.id.to_string(),
                        post.title.clone(),
                        post.format.to_string(),
                        post.status.to_string(),
                        post.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                    ]);
                }
                Ok(table(builder))
            }
        }
    }

    /// Format a single post with its content.
    pub fn format_post(&self, post: &Post) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(format!(
                "{}\n\n{}",
                self.format_posts(std::slice::from_ref(post))?,
                post.content
            )),
            _ => self.format_posts(std::slice::from_ref(post)),
        }
    }

    /// Format templates.
    pub fn format_templates(&self, templates: &[Template]) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(&templates),
            OutputFormat::Quiet => Ok(ids(templates.iter().map(|t| t.id.to_string()))),
            OutputFormat::Table => {
                if templates.is_empty() {
                    return Ok(self.colorize("No templates found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "Name", "Description", "Preview"]);
                for template in templates {
                    builder.push_record([
                        template.id.to_string(),
                        template.name.clone(),
                        template.description.clone().unwrap_or_default(),
                        preview(&template.body),
                    ]);
                }
                Ok(table(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn table(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn ids(ids: impl Iterator<Item = String>) -> String {
    ids.collect::<Vec<_>>().join("\n")
}

fn status_label(result: &ProcessingResult) -> String {
    serde_json::to_value(result.status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", result.status))
}

fn entity_table(result: &ProcessingResult) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Kind", "Names"]);
    for kind in EntityKind::ALL {
        let names = result.entities.names(kind);
        if !names.is_empty() {
            builder.push_record([kind.category().to_string(), names.join(", ")]);
        }
    }
    table(builder)
}

/// First characters of `text` on one line
fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use refinery_domain::{Entity, EntityDetails, Format, ProcessingOptions};

    fn sample_result() -> ProcessingResult {
        let options = ProcessingOptions::new(Format::Post);
        let mut result = ProcessingResult::failed(Format::Post, &options, "Invalid input");
        result.output = "Refined text.".to_string();
        result.entities.push(Entity::new(
            "Acme",
            EntityDetails::Organization {
                industry: "manufacturing".to_string(),
                size: String::new(),
            },
        ));
        result
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_result(&sample_result()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["output"], "Refined text.");
        assert_eq!(value["format"], "post");
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_result(&sample_result()).unwrap();
        assert_eq!(output, "Refined text.");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_result(&sample_result()).unwrap();
        assert!(output.contains("Status"));
        assert!(output.contains("failed"));
        assert!(output.contains("✗ Invalid input"));
        assert!(output.contains("Acme"));
        assert!(output.ends_with("Refined text."));
    }

    #[test]
    fn test_chunk_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let chunks = vec![TextChunk::new(0, "First chunk.", 0, 12)];
        let output = formatter.format_chunks(&chunks).unwrap();
        assert!(output.contains("Preview"));
        assert!(output.contains("First chunk."));

        let empty = formatter.format_chunks(&[]).unwrap();
        assert!(empty.contains("No chunks produced"));
    }

    #[test]
    fn test_empty_posts() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_posts(&[]).unwrap();
        assert!(output.contains("No posts found"));
    }

    #[test]
    fn test_quiet_posts_are_ids() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let post = Post::new("Title", "Body", Format::Post);
        let output = formatter.format_posts(std::slice::from_ref(&post)).unwrap();
        assert_eq!(output, post.id.to_string());
    }

    #[test]
    fn test_preview_truncates() {
        let long = "word ".repeat(40);
        let short = preview(&long);
        assert_eq!(short.chars().count(), PREVIEW_CHARS + 1);
        assert!(short.ends_with('…'));
        assert_eq!(preview("two\nlines"), "two lines");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }
}
