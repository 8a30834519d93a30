//! Entities - named things extracted from content
//!
//! Every entity shares a common header (id, name, context, mentions,
//! timestamps) and carries kind-specific details in [`EntityDetails`], a sum
//! type tagged by `type` on the wire. Schema validation of those details lives
//! in `refinery-entities`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an entity based on UUIDv7
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(uuid::Uuid);

impl EntityId {
    /// Generate a new UUIDv7-based EntityId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Parse an EntityId from its string form
    ///
    /// # Examples
    ///
    /// ```
    /// use refinery_domain::EntityId;
    ///
    /// let id = EntityId::new();
    /// let parsed = EntityId::parse(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid entity id: {}", e))
    }

    /// Borrow the underlying UUID
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The six entity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A person (speaker, guest, author, ...)
    Person,
    /// A company, institution or group
    Organization,
    /// A place
    Location,
    /// Something that happened at a point in time
    Event,
    /// A subject of discussion
    Topic,
    /// An abstract idea
    Concept,
}

impl EntityKind {
    /// All kinds in bundle order
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Person,
        EntityKind::Organization,
        EntityKind::Location,
        EntityKind::Event,
        EntityKind::Topic,
        EntityKind::Concept,
    ];

    /// Wire name of the kind (the `type` tag)
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Organization => "organization",
            EntityKind::Location => "location",
            EntityKind::Event => "event",
            EntityKind::Topic => "topic",
            EntityKind::Concept => "concept",
        }
    }

    /// Name of the bundle category holding this kind
    pub fn category(&self) -> &'static str {
        match self {
            EntityKind::Person => "people",
            EntityKind::Organization => "organizations",
            EntityKind::Location => "locations",
            EntityKind::Event => "events",
            EntityKind::Topic => "topics",
            EntityKind::Concept => "concepts",
        }
    }

    /// Parse a kind from either its wire name or its category name
    ///
    /// Matching is case-insensitive, so `"PERSON"` and `"people"` both
    /// resolve to [`EntityKind::Person`].
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_ascii_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower || kind.category() == lower)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A place in the source where an entity is mentioned
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mention {
    /// The mentioning text
    pub text: String,

    /// Timestamp in the source (e.g. `HH:MM:SS`) if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Chunk the mention was found in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<usize>,
}

fn default_relevance() -> f64 {
    1.0
}

/// Kind-specific entity fields, tagged by `type`
///
/// Fields default to empty on deserialization so that an incomplete entity
/// can be parsed and then rejected by schema validation with a precise reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntityDetails {
    /// Person details
    Person {
        /// Role in the content (speaker, host, guest, author, ...)
        #[serde(default)]
        role: String,
        /// Areas of expertise
        #[serde(default)]
        expertise: Vec<String>,
        /// Organizations the person is affiliated with
        #[serde(default)]
        affiliations: Vec<String>,
    },
    /// Organization details
    Organization {
        /// Industry
        #[serde(default)]
        industry: String,
        /// Size class (startup, enterprise, ...)
        #[serde(default)]
        size: String,
    },
    /// Location details
    Location {
        /// Kind of place (city, country, venue, ...)
        #[serde(default, rename = "locationType")]
        location_type: String,
        /// Enclosing region, if known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        region: Option<String>,
    },
    /// Event details
    Event {
        /// ISO-8601 date
        #[serde(default)]
        date: String,
        /// Duration description
        #[serde(default)]
        duration: String,
        /// Participant names
        #[serde(default)]
        participants: Vec<String>,
    },
    /// Topic details
    Topic {
        /// Relevance in [0, 1]
        #[serde(default = "default_relevance")]
        relevance: f64,
        /// Subtopics
        #[serde(default)]
        subtopics: Vec<String>,
    },
    /// Concept details
    Concept {
        /// Short definition
        #[serde(default, skip_serializing_if = "Option::is_none")]
        definition: Option<String>,
        /// Illustrative examples
        #[serde(default)]
        examples: Vec<String>,
    },
}

impl EntityDetails {
    /// Kind of these details
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityDetails::Person { .. } => EntityKind::Person,
            EntityDetails::Organization { .. } => EntityKind::Organization,
            EntityDetails::Location { .. } => EntityKind::Location,
            EntityDetails::Event { .. } => EntityKind::Event,
            EntityDetails::Topic { .. } => EntityKind::Topic,
            EntityDetails::Concept { .. } => EntityKind::Concept,
        }
    }
}

/// A named entity with kind-specific details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Unique identifier
    pub id: EntityId,

    /// Display name; identity key for deduplication within a category
    pub name: String,

    /// Surrounding context
    #[serde(default)]
    pub context: String,

    /// Places in the source where the entity appears
    #[serde(default)]
    pub mentions: Vec<Mention>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last update time
    pub updated_at: DateTime<Utc>,

    /// Kind-specific fields
    #[serde(flatten)]
    pub details: EntityDetails,
}

impl Entity {
    /// Create an entity with a fresh id and timestamps
    ///
    /// No schema validation happens here; use `refinery-entities` for that.
    pub fn new(name: impl Into<String>, details: EntityDetails) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(),
            name: name.into(),
            context: String::new(),
            mentions: Vec::new(),
            created_at: now,
            updated_at: now,
            details,
        }
    }

    /// Kind of this entity
    pub fn kind(&self) -> EntityKind {
        self.details.kind()
    }
}

/// Entities grouped by category
///
/// All six categories are always present (possibly empty).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityBundle {
    /// Person entities
    #[serde(default)]
    pub people: Vec<Entity>,
    /// Organization entities
    #[serde(default)]
    pub organizations: Vec<Entity>,
    /// Location entities
    #[serde(default)]
    pub locations: Vec<Entity>,
    /// Event entities
    #[serde(default)]
    pub events: Vec<Entity>,
    /// Topic entities
    #[serde(default)]
    pub topics: Vec<Entity>,
    /// Concept entities
    #[serde(default)]
    pub concepts: Vec<Entity>,
}

impl EntityBundle {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities of one kind
    pub fn category(&self, kind: EntityKind) -> &[Entity] {
        match kind {
            EntityKind::Person => &self.people,
            EntityKind::Organization => &self.organizations,
            EntityKind::Location => &self.locations,
            EntityKind::Event => &self.events,
            EntityKind::Topic => &self.topics,
            EntityKind::Concept => &self.concepts,
        }
    }

    /// Mutable access to the entities of one kind
    pub fn category_mut(&mut self, kind: EntityKind) -> &mut Vec<Entity> {
        match kind {
            EntityKind::Person => &mut self.people,
            EntityKind::Organization => &mut self.organizations,
            EntityKind::Location => &mut self.locations,
            EntityKind::Event => &mut self.events,
            EntityKind::Topic => &mut self.topics,
            EntityKind::Concept => &mut self.concepts,
        }
    }

    /// Append an entity to the category matching its kind
    pub fn push(&mut self, entity: Entity) {
        self.category_mut(entity.kind()).push(entity);
    }

    /// Iterate over every entity, category by category
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        EntityKind::ALL
            .into_iter()
            .flat_map(move |kind| self.category(kind).iter())
    }

    /// Names in one category, in order
    pub fn names(&self, kind: EntityKind) -> Vec<&str> {
        self.category(kind).iter().map(|e| e.name.as_str()).collect()
    }

    /// Total number of entities
    pub fn len(&self) -> usize {
        EntityKind::ALL.iter().map(|k| self.category(*k).len()).sum()
    }

    /// Whether every category is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
