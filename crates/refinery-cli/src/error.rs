//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] refinery_llm::LlmError),

    /// Pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] refinery_pipeline::PipelineError),

    /// Service error
    #[error("Service error: {0}")]
    Service(#[from] refinery_service::ServiceError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] refinery_store::StoreError),

    /// Store call reported an error
    #[error("Store error: {0}")]
    Record(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Processing finished with a failed result
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}
