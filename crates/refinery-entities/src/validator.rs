//! Entity validator implementation

use crate::{EntityError, RejectionReason, ValidationConfig};
use chrono::{DateTime, NaiveDate, Utc};
use refinery_domain::{Entity, EntityDetails, EntityId, EntityKind};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// List-valued detail fields; a bare string in raw input is read as a
/// one-item list
const LIST_FIELDS: [&str; 5] = [
    "expertise",
    "affiliations",
    "participants",
    "subtopics",
    "examples",
];

/// Fields an update may never change
const IMMUTABLE_FIELDS: [&str; 3] = ["id", "type", "createdAt"];

/// Identity fields assigned on creation, never taken from raw input
const GENERATED_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// Entity validator
///
/// Checks kind-specific schema rules before an entity is allowed into a
/// bundle. Every failed rule is collected so the error names all of them.
#[derive(Debug, Clone)]
pub struct EntityValidator {
    config: ValidationConfig,
}

impl EntityValidator {
    /// Create a new validator with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a validator with default configuration
    pub fn with_defaults() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Collect every rule the entity breaks
    pub fn check(&self, entity: &Entity) -> Vec<RejectionReason> {
        let mut reasons = Vec::new();

        let name_length = entity.name.trim().chars().count();
        if name_length == 0 {
            reasons.push(RejectionReason::EmptyName);
        } else if name_length > self.config.max_name_length {
            reasons.push(RejectionReason::NameTooLong {
                length: name_length,
                max: self.config.max_name_length,
            });
        }

        match &entity.details {
            EntityDetails::Person {
                role, expertise, ..
            } => {
                require_text(&mut reasons, "role", role);
                require_items(&mut reasons, "expertise", expertise);
            }
            EntityDetails::Organization { industry, size } => {
                require_text(&mut reasons, "industry", industry);
                require_text(&mut reasons, "size", size);
            }
            EntityDetails::Location { location_type, .. } => {
                require_text(&mut reasons, "locationType", location_type);
            }
            EntityDetails::Event {
                date,
                duration,
                participants,
            } => {
                if date.trim().is_empty() {
                    reasons.push(RejectionReason::MissingField("date"));
                } else if self.config.require_iso_dates && !is_iso_date(date) {
                    reasons.push(RejectionReason::InvalidDate(date.clone()));
                }
                require_text(&mut reasons, "duration", duration);
                require_items(&mut reasons, "participants", participants);
            }
            EntityDetails::Topic {
                relevance,
                subtopics,
            } => {
                if self.config.check_relevance_bounds && !(0.0..=1.0).contains(relevance) {
                    reasons.push(RejectionReason::RelevanceOutOfRange(*relevance));
                }
                require_items(&mut reasons, "subtopics", subtopics);
            }
            EntityDetails::Concept { examples, .. } => {
                require_items(&mut reasons, "examples", examples);
            }
        }

        reasons
    }

    /// Validate an entity, handing it back unchanged when it passes
    ///
    /// # Errors
    ///
    /// Returns `EntityError::Rejected` listing every broken rule.
    pub fn validate(&self, entity: Entity) -> Result<Entity, EntityError> {
        let reasons = self.check(&entity);
        if reasons.is_empty() {
            return Ok(entity);
        }

        debug!(
            "Rejected {} '{}': {} rule(s) failed",
            entity.kind(),
            entity.name,
            reasons.len()
        );
        let kind = entity.kind();
        Err(EntityError::Rejected {
            name: entity.name,
            kind,
            reasons,
        })
    }

    /// Validate a raw JSON entity (e.g. straight from an LLM response)
    ///
    /// `type` may be a kind (`"person"`) or a category (`"people"`), in any
    /// case. Any `id`, `createdAt` or `updatedAt` in `raw` is dropped and
    /// assigned fresh. Missing common fields are filled in the same way
    /// [`EntityValidator::create`] fills them.
    ///
    /// # Errors
    ///
    /// Returns `EntityError::UnknownType` when `type` is missing or unknown,
    /// otherwise the errors of [`EntityValidator::create`].
    pub fn validate_value(&self, raw: Value) -> Result<Entity, EntityError> {
        let Value::Object(mut fields) = raw else {
            return Err(EntityError::Malformed("entity must be a JSON object".to_string()));
        };

        let kind = match fields.get("type") {
            Some(Value::String(tag)) => {
                EntityKind::parse(tag).ok_or_else(|| EntityError::UnknownType(tag.clone()))?
            }
            Some(other) => return Err(EntityError::UnknownType(other.to_string())),
            None => return Err(EntityError::UnknownType("<missing>".to_string())),
        };
        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        for field in GENERATED_FIELDS {
            fields.remove(field);
        }
        self.create(&name, kind, Value::Object(fields))
    }

    /// Create and validate an entity
    ///
    /// Layers, later ones winning: common defaults (fresh id, current
    /// timestamps, empty context and mentions), kind defaults, then
    /// `metadata`. `name` and `kind` always come from the arguments.
    ///
    /// # Errors
    ///
    /// Returns `EntityError::Malformed` if `metadata` is not an object or a
    /// field has the wrong JSON type, and `EntityError::Rejected` if the
    /// result breaks a schema rule.
    pub fn create(
        &self,
        name: &str,
        kind: EntityKind,
        metadata: Value,
    ) -> Result<Entity, EntityError> {
        let metadata = match metadata {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(EntityError::Malformed(format!(
                    "metadata must be an object, got {}",
                    other
                )))
            }
        };

        let now = Utc::now();
        let mut fields = Map::new();
        fields.insert("id".to_string(), json!(EntityId::new()));
        fields.insert("context".to_string(), json!(""));
        fields.insert("mentions".to_string(), json!([]));
        fields.insert("createdAt".to_string(), json!(now));
        fields.insert("updatedAt".to_string(), json!(now));
        overlay(&mut fields, kind_defaults(kind, now));
        overlay(&mut fields, metadata);
        fields.insert("name".to_string(), json!(name));
        fields.insert("type".to_string(), json!(kind.as_str()));

        normalize(&mut fields);
        let entity: Entity = serde_json::from_value(Value::Object(fields))?;
        self.validate(entity)
    }

    /// Apply `updates` to a copy of `entity` and re-validate it
    ///
    /// `updatedAt` is refreshed; `id`, `type` and `createdAt` are kept. The
    /// original entity is never modified.
    ///
    /// # Errors
    ///
    /// Returns `EntityError::Malformed` if `updates` is not an object, and
    /// `EntityError::Rejected` if the updated entity breaks a schema rule.
    pub fn update(&self, entity: &Entity, updates: Value) -> Result<Entity, EntityError> {
        let Value::Object(mut updates) = updates else {
            return Err(EntityError::Malformed("updates must be a JSON object".to_string()));
        };
        for field in IMMUTABLE_FIELDS {
            if updates.remove(field).is_some() {
                warn!("Ignoring update to immutable field '{}' of '{}'", field, entity.name);
            }
        }

        let Value::Object(mut fields) = serde_json::to_value(entity)? else {
            return Err(EntityError::Malformed("entity did not serialize to an object".to_string()));
        };
        overlay(&mut fields, updates);
        let updated_at = Utc::now().max(entity.updated_at);
        fields.insert("updatedAt".to_string(), json!(updated_at));

        normalize(&mut fields);
        let updated: Entity = serde_json::from_value(Value::Object(fields))?;
        self.validate(updated)
    }
}

impl Default for EntityValidator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Validate an entity with the default rules
pub fn validate_entity(entity: Entity) -> Result<Entity, EntityError> {
    EntityValidator::with_defaults().validate(entity)
}

/// Validate a raw JSON entity with the default rules
pub fn validate_value(raw: Value) -> Result<Entity, EntityError> {
    EntityValidator::with_defaults().validate_value(raw)
}

/// Create and validate an entity with the default rules
pub fn create_validated_entity(
    name: &str,
    kind: EntityKind,
    metadata: Value,
) -> Result<Entity, EntityError> {
    EntityValidator::with_defaults().create(name, kind, metadata)
}

/// Update an entity with the default rules
pub fn update_entity(entity: &Entity, updates: Value) -> Result<Entity, EntityError> {
    EntityValidator::with_defaults().update(entity, updates)
}

fn kind_defaults(kind: EntityKind, now: DateTime<Utc>) -> Map<String, Value> {
    let defaults = match kind {
        EntityKind::Person => json!({"role": "speaker"}),
        EntityKind::Organization => json!({"industry": "unknown"}),
        EntityKind::Event => json!({"date": now.to_rfc3339()}),
        EntityKind::Topic => json!({"relevance": 1.0}),
        EntityKind::Location | EntityKind::Concept => json!({}),
    };
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn overlay(base: &mut Map<String, Value>, layer: Map<String, Value>) {
    for (key, value) in layer {
        base.insert(key, value);
    }
}

/// Tolerate common shapes from LLM output: bare strings for lists and
/// plain-string mentions
fn normalize(fields: &mut Map<String, Value>) {
    for field in LIST_FIELDS {
        if let Some(value) = fields.get_mut(field) {
            match value {
                Value::String(s) => *value = json!([s.clone()]),
                Value::Null => *value = json!([]),
                _ => {}
            }
        }
    }

    if let Some(Value::Array(mentions)) = fields.get_mut("mentions") {
        for mention in mentions.iter_mut() {
            if let Value::String(text) = mention {
                *mention = json!({"text": text.clone()});
            }
        }
    }

    if fields.get("context").map(Value::is_null).unwrap_or(false) {
        fields.insert("context".to_string(), json!(""));
    }
}

fn require_text(reasons: &mut Vec<RejectionReason>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        reasons.push(RejectionReason::MissingField(field));
    }
}

fn require_items(reasons: &mut Vec<RejectionReason>, field: &'static str, items: &[String]) {
    if items.iter().all(|item| item.trim().is_empty()) {
        reasons.push(RejectionReason::EmptyList(field));
    }
}

fn is_iso_date(value: &str) -> bool {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
