//! Service error types

use refinery_domain::{Format, ResultId};
use refinery_pipeline::PipelineError;
use thiserror::Error;

/// Service error
///
/// Only routing problems reach callers of
/// [`ProcessingService`](crate::ProcessingService) as errors. Everything an
/// adapter reports is folded into a failed result.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No adapter registered for the format
    #[error("No adapter registered for format: {0}")]
    UnregisteredFormat(Format),

    /// No result with this id
    #[error("Result not found: {0}")]
    NotFound(ResultId),

    /// Options name a different format than the adapter handles
    #[error("Format mismatch: adapter handles {expected}, options request {requested}")]
    FormatMismatch {
        /// Format the adapter handles
        expected: Format,
        /// Format named by the options
        requested: Format,
    },

    /// Pipeline failure outside a processing run
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

impl ServiceError {
    /// Whether the error is a routing error rather than a processing failure
    pub fn is_routing(&self) -> bool {
        matches!(
            self,
            ServiceError::UnregisteredFormat(_) | ServiceError::NotFound(_)
        )
    }
}
