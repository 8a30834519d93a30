//! Refinery Service
//!
//! Format adapters and the processing service that routes a format to its
//! adapter. Adapters run the chunk → process → combine pipeline and attach
//! format-specific metadata; the service turns every adapter failure into a
//! failed result so callers only see routing errors as `Err`.
//!
//! # Example
//!
//! ```
//! use refinery_domain::{Format, ProcessingOptions, ProcessingStatus};
//! use refinery_pipeline::PipelineConfig;
//! use refinery_service::ProcessingService;
//! use std::sync::Arc;
//! # use async_trait::async_trait;
//! # use refinery_domain::CompletionProvider;
//! # struct Fixed;
//! # #[async_trait]
//! # impl CompletionProvider for Fixed {
//! #     type Error = String;
//! #     async fn complete(&self, _: &str, _: Option<u32>) -> Result<String, String> {
//! #         Ok(r#"{"refinedContent": "Hello."}"#.to_string())
//! #     }
//! # }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let service = ProcessingService::with_defaults(Arc::new(Fixed), PipelineConfig::default());
//! let options = ProcessingOptions::new(Format::Post);
//!
//! let result = service.process(Format::Post, "hello", &options).await.unwrap();
//! assert_eq!(result.status, ProcessingStatus::Completed);
//! assert_eq!(result.output, "Hello.");
//! # }
//! ```

#![warn(missing_docs)]

pub mod adapter;
pub mod error;
pub mod service;
pub mod template;

pub use adapter::{FormatAdapter, PodcastAdapter, PostAdapter};
pub use error::ServiceError;
pub use service::{ProcessingService, ServiceState};
pub use template::{TemplateMerger, MERGED_CONTENT_FIELD};
