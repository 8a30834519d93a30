//! Post status transitions

use crate::error::StoreError;
use crate::records::{Post, PostStatus};
use chrono::Utc;
use refinery_domain::{RecordStore, StoreResponse};
use serde_json::json;
use uuid::Uuid;

/// Publish a draft post
///
/// Publishing an already published post is an error.
pub fn publish<S: RecordStore<Post>>(store: &mut S, id: Uuid) -> StoreResponse<Post> {
    transition(store, id, PostStatus::Published)
}

/// Move a published post back to draft
pub fn unpublish<S: RecordStore<Post>>(store: &mut S, id: Uuid) -> StoreResponse<Post> {
    transition(store, id, PostStatus::Draft)
}

fn transition<S: RecordStore<Post>>(store: &mut S, id: Uuid, to: PostStatus) -> StoreResponse<Post> {
    let post = match store.get(id).into_result() {
        Ok(post) => post,
        Err(error) => return StoreResponse::err(error),
    };
    if post.status == to {
        let error = StoreError::InvalidTransition(format!("post {} is already {}", id, to));
        return StoreResponse::err(error.to_string());
    }

    let published_at = match to {
        PostStatus::Published => json!(Utc::now()),
        PostStatus::Draft => json!(null),
    };
    store.update(
        id,
        json!({
            "status": to,
            "publishedAt": published_at,
        }),
    )
}
