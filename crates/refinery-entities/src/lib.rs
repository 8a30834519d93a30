//! Refinery Entities
//!
//! Schema validation, creation and merging of extracted entities.
//!
//! The validator provides:
//! - Per-kind schema checks (person needs a role and expertise, events need an
//!   ISO date and participants, ...)
//! - Rejection of unknown entity types in raw LLM output
//! - Entity creation with kind defaults and caller metadata overlaid
//! - Immutable, re-validated updates
//! - Bundle merging with deduplication by name
//!
//! # Examples
//!
//! ```
//! use refinery_domain::EntityKind;
//! use refinery_entities::{create_validated_entity, validate_value};
//! use serde_json::json;
//!
//! let alice = create_validated_entity(
//!     "Alice",
//!     EntityKind::Person,
//!     json!({"expertise": ["databases"]}),
//! ).unwrap();
//! assert_eq!(alice.name, "Alice");
//!
//! // Unknown kinds are rejected
//! assert!(validate_value(json!({"name": "Mars", "type": "planet"})).is_err());
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod merge;
mod validator;

pub use config::ValidationConfig;
pub use error::{EntityError, RejectionReason};
pub use merge::{dedup_by_name, merge_entities, merge_into};
pub use validator::{
    create_validated_entity, update_entity, validate_entity, validate_value, EntityValidator,
};
