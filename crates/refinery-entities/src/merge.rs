//! Bundle merging
//!
//! Entities are identified by name within a category. When two bundles carry
//! the same name, the later entity replaces the earlier one but keeps the
//! position where the name was first seen.

use refinery_domain::{Entity, EntityBundle, EntityKind};
use std::collections::HashMap;

/// Merge bundles in order, deduplicating each category by name
///
/// # Examples
///
/// ```
/// use refinery_domain::{Entity, EntityBundle, EntityDetails};
/// use refinery_entities::merge_entities;
///
/// let topic = |relevance| Entity::new(
///     "Rust",
///     EntityDetails::Topic { relevance, subtopics: vec!["traits".into()] },
/// );
/// let mut first = EntityBundle::new();
/// first.push(topic(0.4));
/// let mut second = EntityBundle::new();
/// second.push(topic(0.9));
///
/// let merged = merge_entities(&[first, second]);
/// assert_eq!(merged.topics.len(), 1);
/// ```
pub fn merge_entities(bundles: &[EntityBundle]) -> EntityBundle {
    let mut merged = EntityBundle::new();
    for bundle in bundles {
        merge_into(&mut merged, bundle.clone());
    }
    merged
}

/// Merge `other` into `target`, category by category
pub fn merge_into(target: &mut EntityBundle, mut other: EntityBundle) {
    for kind in EntityKind::ALL {
        let incoming = std::mem::take(other.category_mut(kind));
        if incoming.is_empty() {
            continue;
        }
        let existing = std::mem::take(target.category_mut(kind));
        *target.category_mut(kind) = dedup_by_name(existing.into_iter().chain(incoming));
    }
}

/// Keep one entity per name: the last one wins, at the first one's position
pub fn dedup_by_name(entities: impl IntoIterator<Item = Entity>) -> Vec<Entity> {
    let mut out: Vec<Entity> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for entity in entities {
        match positions.get(&entity.name) {
            Some(&index) => out[index] = entity,
            None => {
                positions.insert(entity.name.clone(), out.len());
                out.push(entity);
            }
        }
    }
    out
}
