//! Parse LLM output into structured responses
//!
//! Responses are read as strict JSON first. When that fails, the required
//! field is pulled out with a regex so a chunk with a truncated or chatty
//! response still yields its refined text.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from structured response parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Response is empty
    #[error("Empty response")]
    Empty,

    /// Required field is absent from both the JSON and the raw text
    #[error("Missing required field '{0}'")]
    MissingField(String),

    /// Response is neither valid JSON nor recoverable
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// JSON parsed but did not match the expected shape
    #[error("Unexpected response shape: {0}")]
    Schema(String),
}

/// How a response was parsed
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    /// Strict JSON parse
    Complete(T),
    /// Only the required field was recovered
    Recovered(T),
}

impl<T> ParseOutcome<T> {
    /// Whether only the required field was recovered
    pub fn is_recovered(&self) -> bool {
        matches!(self, ParseOutcome::Recovered(_))
    }

    /// Unwrap the parsed value
    pub fn into_inner(self) -> T {
        match self {
            ParseOutcome::Complete(value) | ParseOutcome::Recovered(value) => value,
        }
    }
}

/// Parse a response into `T`, requiring `required_field`
///
/// # Examples
///
/// ```
/// use refinery_pipeline::parse_structured_response;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Refined {
///     refined_content: String,
/// }
///
/// let raw = r#"Sure! {"refinedContent": "Hello there.", "summary": "#;
/// let parsed: Refined = parse_structured_response(raw, "refinedContent").unwrap();
/// assert_eq!(parsed.refined_content, "Hello there.");
/// ```
pub fn parse_structured_response<T: DeserializeOwned>(
    raw: &str,
    required_field: &str,
) -> Result<T, ParseError> {
    parse_structured(raw, required_field).map(ParseOutcome::into_inner)
}

/// Like [`parse_structured_response`], but reports whether the fallback was used
pub fn parse_structured<T: DeserializeOwned>(
    raw: &str,
    required_field: &str,
) -> Result<ParseOutcome<T>, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let json_str = extract_json(trimmed);
    let strict_error = match serde_json::from_str::<Value>(json_str) {
        Ok(value) if has_field(&value, required_field) => {
            match serde_json::from_value::<T>(value) {
                Ok(parsed) => return Ok(ParseOutcome::Complete(parsed)),
                Err(e) => ParseError::Schema(e.to_string()),
            }
        }
        Ok(_) => ParseError::MissingField(required_field.to_string()),
        Err(e) => ParseError::InvalidJson(e.to_string()),
    };
    debug!("Strict parse failed ({}), trying field recovery", strict_error);

    match extract_field(trimmed, required_field) {
        Some(value) => {
            let mut fields = Map::new();
            fields.insert(required_field.to_string(), Value::String(value));
            let parsed = serde_json::from_value::<T>(Value::Object(fields))
                .map_err(|e| ParseError::Schema(e.to_string()))?;
            warn!("Recovered '{}' from malformed response", required_field);
            Ok(ParseOutcome::Recovered(parsed))
        }
        None => Err(strict_error),
    }
}

/// Extract JSON from response, handling markdown code blocks and chatter
/// around a single object
fn extract_json(response: &str) -> &str {
    let mut body = response.trim();

    if body.starts_with("```") {
        // Drop the opening fence line (```json or ```) and the closing fence
        body = match body.find('\n') {
            Some(newline) => &body[newline + 1..],
            None => "",
        };
        if let Some(close) = body.rfind("```") {
            body = &body[..close];
        }
        body = body.trim();
    }

    if body.starts_with('{') || body.starts_with('[') {
        return body;
    }
    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if end > start => &body[start..=end],
        _ => body,
    }
}

fn has_field(value: &Value, field: &str) -> bool {
    value.get(field).map(|v| !v.is_null()).unwrap_or(false)
}

/// Pull a string field out of text that is not valid JSON
fn extract_field(raw: &str, field: &str) -> Option<String> {
    let pattern = format!(
        r#""{}"\s*:\s*"(?P<value>(?:[^"\\]|\\.)*)""#,
        regex::escape(field)
    );
    let re = Regex::new(&pattern).ok()?;
    let captured = re.captures(raw)?.name("value")?.as_str();

    // Reuse the JSON string grammar for escapes; keep the raw text if it is
    // not a valid JSON string body
    Some(
        serde_json::from_str::<String>(&format!("\"{}\"", captured))
            .unwrap_or_else(|_| captured.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Response {
        refined_content: String,
        #[serde(default)]
        summary: Option<String>,
    }

    #[test]
    fn test_parse_valid_json() {
        let raw = r#"{"refinedContent": "Clean text.", "summary": "Short."}"#;
        let outcome = parse_structured::<Response>(raw, "refinedContent").unwrap();

        assert!(!outcome.is_recovered());
        let parsed = outcome.into_inner();
        assert_eq!(parsed.refined_content, "Clean text.");
        assert_eq!(parsed.summary.as_deref(), Some("Short."));
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let raw = "```json\n{\"refinedContent\": \"Fenced.\"}\n```";
        let parsed: Response = parse_structured_response(raw, "refinedContent").unwrap();
        assert_eq!(parsed.refined_content, "Fenced.");
    }

    #[test]
    fn test_parse_json_with_chatter() {
        let raw = "Here you go:\n{\"refinedContent\": \"Chatty.\"}\nHope that helps!";
        let outcome = parse_structured::<Response>(raw, "refinedContent").unwrap();
        assert!(!outcome.is_recovered());
        assert_eq!(outcome.into_inner().refined_content, "Chatty.");
    }

    #[test]
    fn test_recovers_field_from_truncated_json() {
        let raw = r#"{"refinedContent": "Line one.\nShe said \"hi\".", "summary": "cut of"#;
        let outcome = parse_structured::<Response>(raw, "refinedContent").unwrap();

        assert!(outcome.is_recovered());
        let parsed = outcome.into_inner();
        assert_eq!(parsed.refined_content, "Line one.\nShe said \"hi\".");
        assert_eq!(parsed.summary, None);
    }

    #[test]
    fn test_recovers_field_when_shape_is_wrong() {
        // summary has the wrong type, so the strict parse fails
        let raw = r#"{"refinedContent": "Kept.", "summary": 42}"#;
        let outcome = parse_structured::<Response>(raw, "refinedContent").unwrap();
        assert!(outcome.is_recovered());
        assert_eq!(outcome.into_inner().refined_content, "Kept.");
    }

    #[test]
    fn test_missing_required_field() {
        let raw = r#"{"summary": "No content here."}"#;
        let result = parse_structured_response::<Response>(raw, "refinedContent");
        assert_eq!(
            result,
            Err(ParseError::MissingField("refinedContent".to_string()))
        );
    }

    #[test]
    fn test_null_required_field_is_missing() {
        let raw = r#"{"refinedContent": null}"#;
        let result = parse_structured_response::<Response>(raw, "refinedContent");
        assert!(matches!(result, Err(ParseError::MissingField(_))));
    }

    #[test]
    fn test_not_json_at_all() {
        let result = parse_structured_response::<Response>("This is not JSON", "refinedContent");
        assert!(matches!(result, Err(ParseError::InvalidJson(_))));
    }

    #[test]
    fn test_empty_response() {
        let result = parse_structured_response::<Response>("  \n", "refinedContent");
        assert_eq!(result, Err(ParseError::Empty));
    }

    #[test]
    fn test_extract_json_from_plain_json() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json), json);
    }

    #[test]
    fn test_extract_json_from_markdown_without_language() {
        let response = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(response), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_field_name_is_escaped() {
        assert_eq!(extract_field(r#"{"a.b": "x"}"#, "a.b"), Some("x".to_string()));
        assert_eq!(extract_field(r#"{"axb": "x"}"#, "a.b"), None);
    }
}
