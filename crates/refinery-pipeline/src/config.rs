//! Configuration for the pipeline

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chunking settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Maximum chunk size (bytes)
    pub max_size: usize,

    /// Bytes repeated at the start of the next chunk
    pub overlap: usize,

    /// Preferred cut point
    pub delimiter: String,

    /// Keep the delimiter at the end of the chunk it closes
    pub preserve_delimiter: bool,

    /// Sentence chunker budget (bytes of new material per chunk)
    pub sentence_budget: usize,

    /// Words of the previous chunk repeated as lead-in by the sentence chunker
    pub overlap_words: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            overlap: 100,
            delimiter: "\n".to_string(),
            preserve_delimiter: true,
            sentence_budget: 4000,
            overlap_words: 50,
        }
    }
}

/// Batch scheduling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Chunks processed concurrently per batch
    pub batch_size: usize,

    /// Retries after the first failed completion call
    pub max_retries: u32,

    /// Base delay between retries (milliseconds), doubled per attempt
    pub retry_delay_ms: u64,

    /// Timeout for one chunk, retries included (milliseconds)
    pub timeout_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 3,
            max_retries: 3,
            retry_delay_ms: 1000,
            timeout_ms: 30_000,
        }
    }
}

impl BatchConfig {
    /// Get the chunk timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get the base retry delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Token budget settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Largest estimated prompt accepted for one request
    pub max_per_request: usize,

    /// Estimated tokens per character of prompt
    pub estimated_tokens_per_char: f64,

    /// Response budget passed to the provider
    pub response_max_tokens: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            max_per_request: 90_000,
            estimated_tokens_per_char: 1.3,
            response_max_tokens: 4096,
        }
    }
}

impl TokenConfig {
    /// Estimate the token count of a prompt
    pub fn estimate(&self, prompt: &str) -> usize {
        (prompt.chars().count() as f64 * self.estimated_tokens_per_char).ceil() as usize
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Chunking settings
    pub chunk: ChunkConfig,

    /// Batch scheduling settings
    pub batch: BatchConfig,

    /// Token budget settings
    pub tokens: TokenConfig,
}

impl PipelineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), PipelineError> {
        let fail = |msg: &str| Err(PipelineError::Config(msg.to_string()));

        if self.chunk.max_size == 0 {
            return fail("chunk.max_size must be greater than 0");
        }
        if self.chunk.overlap >= self.chunk.max_size {
            return fail("chunk.overlap must be smaller than chunk.max_size");
        }
        if self.chunk.sentence_budget == 0 {
            return fail("chunk.sentence_budget must be greater than 0");
        }
        if self.batch.batch_size == 0 {
            return fail("batch.batch_size must be greater than 0");
        }
        if self.batch.timeout_ms == 0 {
            return fail("batch.timeout_ms must be greater than 0");
        }
        if self.tokens.max_per_request == 0 {
            return fail("tokens.max_per_request must be greater than 0");
        }
        if !(self.tokens.estimated_tokens_per_char > 0.0) {
            return fail("tokens.estimated_tokens_per_char must be positive");
        }
        Ok(())
    }

    /// Draft preset: larger chunks, wider batches, fewer retries
    pub fn draft() -> Self {
        Self {
            chunk: ChunkConfig {
                max_size: 1500,
                overlap: 100,
                ..ChunkConfig::default()
            },
            batch: BatchConfig {
                batch_size: 5,
                max_retries: 1,
                retry_delay_ms: 500,
                timeout_ms: 15_000,
            },
            tokens: TokenConfig::default(),
        }
    }

    /// Thorough preset: smaller overlapping chunks, patient retries
    pub fn thorough() -> Self {
        Self {
            chunk: ChunkConfig {
                max_size: 800,
                overlap: 150,
                ..ChunkConfig::default()
            },
            batch: BatchConfig {
                batch_size: 2,
                max_retries: 5,
                retry_delay_ms: 1000,
                timeout_ms: 60_000,
            },
            tokens: TokenConfig {
                response_max_tokens: 8192,
                ..TokenConfig::default()
            },
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, PipelineError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| PipelineError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk.max_size, 1000);
        assert_eq!(config.chunk.overlap, 100);
        assert_eq!(config.batch.batch_size, 3);
        assert_eq!(config.batch.max_retries, 3);
        assert_eq!(config.batch.retry_delay_ms, 1000);
        assert_eq!(config.batch.timeout_ms, 30_000);
        assert_eq!(config.tokens.max_per_request, 90_000);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(PipelineConfig::draft().validate().is_ok());
        assert!(PipelineConfig::thorough().validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_below_max_size() {
        let mut config = PipelineConfig::default();
        config.chunk.overlap = config.chunk.max_size;
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = PipelineConfig::default();
        config.batch.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_estimate() {
        let tokens = TokenConfig::default();
        assert_eq!(tokens.estimate(""), 0);
        assert_eq!(tokens.estimate("abcdefghij"), 13);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PipelineConfig::from_toml("[batch]\nbatch_size = 8\n").unwrap();
        assert_eq!(config.batch.batch_size, 8);
        assert_eq!(config.batch.timeout_ms, 30_000);
        assert_eq!(config.chunk, ChunkConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::thorough();
        let toml_str = config.to_toml().unwrap();
        let parsed = PipelineConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = PipelineConfig::from_toml("[chunk]\nmax_size = \"big\"\n");
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }
}
