//! JSON merge patches for record updates

use crate::error::StoreError;
use chrono::Utc;
use refinery_domain::Record;
use serde_json::Value;

/// Fields a patch can never change
const PROTECTED_FIELDS: [&str; 2] = ["id", "createdAt"];

/// Apply a JSON merge patch (RFC 7386) to `target`
///
/// Objects merge key by key, `null` removes a key, anything else replaces
/// the target value.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(fields) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(existing) = target {
        for (key, value) in fields {
            if value.is_null() {
                existing.remove(key);
            } else {
                merge_patch(existing.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

/// Patch a record, returning the updated copy
///
/// `id` and `createdAt` in the patch are ignored. `updatedAt` is refreshed
/// when the record has one. The patched document must still deserialize
/// into `T`.
pub fn apply_patch<T: Record>(record: &T, patch: &Value) -> Result<T, StoreError> {
    if !patch.is_object() {
        return Err(StoreError::InvalidData("patch must be a JSON object".to_string()));
    }
    let mut patch = patch.clone();
    if let Value::Object(fields) = &mut patch {
        for field in PROTECTED_FIELDS {
            fields.remove(field);
        }
    }

    let mut document = serde_json::to_value(record)?;
    merge_patch(&mut document, &patch);
    if let Value::Object(fields) = &mut document {
        if fields.contains_key("updatedAt") {
            fields.insert("updatedAt".to_string(), serde_json::to_value(Utc::now())?);
        }
    }

    Ok(serde_json::from_value(document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Post;
    use refinery_domain::Format;
    use serde_json::json;

    #[test]
    fn test_merge_patch_rfc_example() {
        let mut target = json!({
            "title": "Goodbye!",
            "author": {"givenName": "John", "familyName": "Doe"},
            "tags": ["example", "sample"],
            "content": "This will be unchanged"
        });
        let patch = json!({
            "title": "Hello!",
            "phoneNumber": "+01-123-456-7890",
            "author": {"familyName": null},
            "tags": ["example"]
        });

        merge_patch(&mut target, &patch);

        assert_eq!(
            target,
            json!({
                "title": "Hello!",
                "author": {"givenName": "John"},
                "tags": ["example"],
                "content": "This will be unchanged",
                "phoneNumber": "+01-123-456-7890"
            })
        );
    }

    #[test]
    fn test_merge_patch_replaces_non_object() {
        let mut target = json!({"a": "b"});
        merge_patch(&mut target, &json!(["c"]));
        assert_eq!(target, json!(["c"]));

        let mut target = json!("scalar");
        merge_patch(&mut target, &json!({"a": 1}));
        assert_eq!(target, json!({"a": 1}));
    }

    #[test]
    fn test_apply_patch_keeps_identity() {
        let post = Post::new("Draft", "Body", Format::Post);
        let patch = json!({
            "id": uuid::Uuid::now_v7(),
            "createdAt": "2001-01-01T00:00:00Z",
            "title": "Final"
        });

        let updated = apply_patch(&post, &patch).unwrap();

        assert_eq!(updated.id, post.id);
        assert_eq!(updated.created_at, post.created_at);
        assert_eq!(updated.title, "Final");
        assert!(updated.updated_at >= post.updated_at);
    }

    #[test]
    fn test_apply_patch_rejects_non_object() {
        let post = Post::new("Draft", "Body", Format::Post);
        assert!(matches!(
            apply_patch(&post, &json!(["title"])),
            Err(StoreError::InvalidData(_))
        ));
    }
}
