//! Refinery Storage Layer
//!
//! Persistence for posts and templates behind the
//! [`RecordStore`](refinery_domain::RecordStore) trait.
//!
//! # Architecture
//!
//! - SQLite for durable storage, one table per record type holding JSON documents
//! - An in-memory map store for tests and short-lived sessions
//! - Updates are JSON merge patches; `id` and `createdAt` never change
//!
//! Store calls never return `Err`: each returns a
//! [`StoreResponse`](refinery_domain::StoreResponse) with either `data` or
//! `error` set.
//!
//! # Examples
//!
//! ```
//! use refinery_domain::{Format, RecordStore, StoreResponse};
//! use refinery_store::{publish, Post, SqliteStore};
//!
//! let mut store = SqliteStore::in_memory().unwrap();
//! let post = Post::new("Hello", "First post", Format::Post);
//! let id = post.id;
//!
//! let inserted: StoreResponse<Post> = store.insert(post);
//! assert!(inserted.is_ok());
//! assert!(publish(&mut store, id).into_result().unwrap().is_published());
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod patch;
pub mod publish;
pub mod records;
pub mod sqlite;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use patch::{apply_patch, merge_patch};
pub use publish::{publish, unpublish};
pub use records::{Post, PostStatus, Template};
pub use sqlite::SqliteStore;
