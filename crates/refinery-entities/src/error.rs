//! Entity error types

use refinery_domain::EntityKind;
use std::fmt;
use thiserror::Error;

/// Why an entity failed schema validation
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// Name is empty or whitespace
    EmptyName,

    /// Name longer than the configured maximum
    NameTooLong {
        /// Actual length in characters
        length: usize,
        /// Configured maximum
        max: usize,
    },

    /// A required text field is empty
    MissingField(&'static str),

    /// A required list field has no items
    EmptyList(&'static str),

    /// Event date is not ISO-8601
    InvalidDate(String),

    /// Topic relevance outside [0, 1]
    RelevanceOutOfRange(f64),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::EmptyName => write!(f, "name is empty"),
            RejectionReason::NameTooLong { length, max } => {
                write!(f, "name is {} chars (max: {})", length, max)
            }
            RejectionReason::MissingField(field) => write!(f, "{} is empty", field),
            RejectionReason::EmptyList(field) => write!(f, "{} needs at least one item", field),
            RejectionReason::InvalidDate(date) => write!(f, "date '{}' is not ISO-8601", date),
            RejectionReason::RelevanceOutOfRange(value) => {
                write!(f, "relevance {} out of range [0.0, 1.0]", value)
            }
        }
    }
}

/// Errors that can occur while creating, validating or updating entities
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityError {
    /// Entity failed schema validation
    #[error("Entity '{name}' ({kind}) rejected: {}", join_reasons(.reasons))]
    Rejected {
        /// Entity name
        name: String,
        /// Entity kind
        kind: EntityKind,
        /// Every failed rule
        reasons: Vec<RejectionReason>,
    },

    /// `type` is missing or not one of the six known kinds
    #[error("Unknown entity type: {0}")]
    UnknownType(String),

    /// Input could not be interpreted as an entity
    #[error("Malformed entity: {0}")]
    Malformed(String),
}

fn join_reasons(reasons: &[RejectionReason]) -> String {
    reasons
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for EntityError {
    fn from(e: serde_json::Error) -> Self {
        EntityError::Malformed(e.to_string())
    }
}
