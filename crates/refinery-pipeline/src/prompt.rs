//! LLM prompt engineering for chunk analysis

use refinery_domain::{Format, ProcessingOptions, Quality};

/// Builds prompts for the LLM to refine and analyze a chunk
pub struct PromptBuilder {
    text: String,
    format: Format,
    quality: Quality,
    platform: String,
    extract_entities: bool,
    analyze_sentiment: bool,
    include_timestamps: bool,
}

impl PromptBuilder {
    /// Create a new prompt builder with default options for `format`
    pub fn new(text: String, format: Format) -> Self {
        Self::from_options(text, &ProcessingOptions::new(format))
    }

    /// Create a prompt builder from processing options
    pub fn from_options(text: String, options: &ProcessingOptions) -> Self {
        Self {
            text,
            format: options.format,
            quality: options.quality,
            platform: options.platform(),
            extract_entities: options.extract_entities,
            analyze_sentiment: options.analyze_sentiment,
            include_timestamps: options.include_timestamps,
        }
    }

    /// Build the full analysis prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Instruction for the format
        prompt.push_str(self.instructions());
        prompt.push_str("\n\n");

        // 2. Target and polish level
        prompt.push_str(&format!("Target platform: {}\n", self.platform));
        prompt.push_str(&format!("Editing level: {}\n\n", self.editing_level()));

        // 3. Optional sections
        if self.extract_entities {
            prompt.push_str(ENTITY_INSTRUCTIONS);
            prompt.push_str("\n\n");
        }
        if self.wants_timeline() {
            prompt.push_str(TIMELINE_INSTRUCTIONS);
            prompt.push_str("\n\n");
        }
        if self.analyze_sentiment {
            prompt.push_str(SENTIMENT_INSTRUCTIONS);
            prompt.push_str("\n\n");
        }

        // 4. The text to analyze
        self.push_text(&mut prompt);

        // 5. Output format reminder
        prompt.push_str(&self.output_format());
        prompt
    }

    /// Build a prompt that only asks for the refined text
    pub fn build_refine(&self) -> String {
        let mut prompt = String::new();
        prompt.push_str(REFINE_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(&format!("Editing level: {}\n\n", self.editing_level()));
        self.push_text(&mut prompt);
        prompt.push_str(REFINE_OUTPUT_FORMAT);
        prompt
    }

    fn push_text(&self, prompt: &mut String) {
        prompt.push_str("Text to process:\n");
        prompt.push_str("---\n");
        prompt.push_str(&self.text);
        prompt.push_str("\n---\n\n");
    }

    fn instructions(&self) -> &'static str {
        match self.format {
            Format::Podcast => PODCAST_INSTRUCTIONS,
            Format::Post => POST_INSTRUCTIONS,
        }
    }

    fn editing_level(&self) -> &'static str {
        match self.quality {
            Quality::Draft => "light cleanup, keep the original wording where possible",
            Quality::Final => "publication-ready, fix flow and structure",
        }
    }

    fn wants_timeline(&self) -> bool {
        self.format == Format::Podcast && self.include_timestamps
    }

    fn output_format(&self) -> String {
        let mut fields = vec![
            r#"  "refinedContent": "the cleaned-up text""#,
            r#"  "title": "short title or null""#,
            r#"  "summary": "one or two sentences""#,
            r#"  "topics": ["topic"]"#,
            r#"  "themes": [{"title": "theme", "description": "why it matters"}]"#,
            r#"  "keyPoints": [{"title": "point", "description": "detail"}]"#,
            r#"  "quickFacts": ["fact"]"#,
        ];
        if self.extract_entities {
            fields.push(r#"  "entities": [{"name": "...", "type": "person", "context": "...", ...}]"#);
        }
        if self.wants_timeline() {
            fields.push(r#"  "timeline": [{"timestamp": "HH:MM:SS", "event": "...", "speakers": ["..."]}]"#);
        }
        if self.analyze_sentiment {
            fields.push(r#"  "sentiment": {"overall": "positive|neutral|negative|mixed", "score": -1.0-1.0}"#);
        }

        format!(
            "Output format (JSON object only, no additional text):\n{{\n{}\n}}\n\n\
             Remember: Return ONLY valid JSON, no markdown code blocks, no explanations.",
            fields.join(",\n")
        )
    }
}

const PODCAST_INSTRUCTIONS: &str = r#"You are editing one segment of a podcast transcript.
Clean up the spoken text: remove filler words, false starts and repetitions,
fix punctuation, and keep every speaker's meaning and voice intact.
Do not summarize inside refinedContent; it must cover the whole segment."#;

const POST_INSTRUCTIONS: &str = r#"You are editing one section of a written post.
Tighten the prose, fix grammar and punctuation, and keep the author's
meaning, structure and tone. Do not summarize inside refinedContent; it must
cover the whole section."#;

const ENTITY_INSTRUCTIONS: &str = r#"Extract entities mentioned in the text. Every entity needs "name", "type" and
"context". Required fields per type:
- person: "role" (e.g. host, guest, author) and "expertise" (at least one area)
- organization: "industry" and "size"
- location: "locationType" (city, country, venue, ...)
- event: "date" (YYYY-MM-DD), "duration" and "participants" (at least one)
- topic: "relevance" (0.0-1.0) and "subtopics" (at least one)
- concept: "definition" and "examples" (at least one)
Only include entities you can fill in completely."#;

const TIMELINE_INSTRUCTIONS: &str = r#"Build a timeline of notable moments. Use the timestamps present in the text
("HH:MM:SS"); name the speakers and topics of each moment when known."#;

const SENTIMENT_INSTRUCTIONS: &str = r#"Rate the overall sentiment of the text with a score from -1.0 (negative) to
1.0 (positive)."#;

const REFINE_INSTRUCTIONS: &str = r#"Clean up the following text: fix grammar, punctuation and flow while keeping
its meaning. The text may start mid-thought; it overlaps the previous
section."#;

const REFINE_OUTPUT_FORMAT: &str = r#"Output format (JSON object only, no additional text):
{
  "refinedContent": "the cleaned-up text"
}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_text() {
        let prompt = PromptBuilder::new("Alice met Bob".to_string(), Format::Post).build();
        assert!(prompt.contains("Alice met Bob"));
        assert!(prompt.contains("refinedContent"));
    }

    #[test]
    fn test_podcast_prompt_asks_for_timeline() {
        let prompt = PromptBuilder::new("[00:01:00] Hi".to_string(), Format::Podcast).build();
        assert!(prompt.contains("podcast transcript"));
        assert!(prompt.contains("\"timeline\""));
    }

    #[test]
    fn test_post_prompt_has_no_timeline() {
        let prompt = PromptBuilder::new("Text".to_string(), Format::Post).build();
        assert!(prompt.contains("written post"));
        assert!(!prompt.contains("\"timeline\""));
    }

    #[test]
    fn test_options_toggle_sections() {
        let mut options = ProcessingOptions::new(Format::Podcast);
        options.extract_entities = false;
        options.analyze_sentiment = false;
        options.include_timestamps = false;

        let prompt = PromptBuilder::from_options("Text".to_string(), &options).build();
        assert!(!prompt.contains("Extract entities"));
        assert!(!prompt.contains("\"sentiment\""));
        assert!(!prompt.contains("\"timeline\""));
    }

    #[test]
    fn test_platform_and_quality() {
        let options = ProcessingOptions::new(Format::Post)
            .with_quality(Quality::Final)
            .with_platform("newsletter");
        let prompt = PromptBuilder::from_options("Text".to_string(), &options).build();
        assert!(prompt.contains("Target platform: newsletter"));
        assert!(prompt.contains("publication-ready"));
    }

    #[test]
    fn test_refine_prompt_is_minimal() {
        let prompt = PromptBuilder::new("Some text".to_string(), Format::Post).build_refine();
        assert!(prompt.contains("Some text"));
        assert!(prompt.contains("refinedContent"));
        assert!(!prompt.contains("entities"));
    }
}
