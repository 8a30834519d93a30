//! Input validation gate

use crate::error::PipelineError;

/// Basic gate: input must be non-empty
pub fn validate_input(input: &str) -> bool {
    !input.is_empty()
}

/// Adapter-level gate: input must have non-whitespace content
pub fn validate_input_strict(input: &str) -> bool {
    !input.trim().is_empty()
}

/// Apply the strict gate, returning `PipelineError::InvalidInput` on failure
pub fn ensure_valid_input(input: &str) -> Result<(), PipelineError> {
    if validate_input_strict(input) {
        Ok(())
    } else {
        Err(PipelineError::InvalidInput)
    }
}
