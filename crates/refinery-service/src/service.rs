//! Routes a format to its adapter and normalizes failures

use crate::adapter::{FormatAdapter, PodcastAdapter, PostAdapter};
use crate::error::ServiceError;
use refinery_domain::{
    CompletionProvider, Format, ProcessingOptions, ProcessingResult, ProcessingStatus, ResultId,
};
use refinery_pipeline::{validate_input, CancelToken, PipelineConfig};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Where a single `process` call is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Not started
    Idle,
    /// Checking the request
    Validating,
    /// Adapter running
    Processing,
    /// Finished successfully
    Completed,
    /// Finished with a failed result
    Failed,
}

impl ServiceState {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceState::Idle => "idle",
            ServiceState::Validating => "validating",
            ServiceState::Processing => "processing",
            ServiceState::Completed => "completed",
            ServiceState::Failed => "failed",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct CallState {
    format: Format,
    state: ServiceState,
}

impl CallState {
    fn new(format: Format) -> Self {
        Self {
            format,
            state: ServiceState::Idle,
        }
    }

    fn advance(&mut self, next: ServiceState) {
        debug!("{} call: {} -> {}", self.format, self.state, next);
        self.state = next;
    }

    fn finish(&mut self, result: &ProcessingResult) {
        match result.status {
            ProcessingStatus::Completed => self.advance(ServiceState::Completed),
            _ => self.advance(ServiceState::Failed),
        }
    }
}

/// Format adapter registry and processing entry point
///
/// Callers never receive a processing failure as an error: every adapter
/// failure is turned into a result with `status: failed`. Only routing
/// problems (no adapter for the format, unknown result id) are returned as
/// `Err`.
pub struct ProcessingService {
    adapters: RwLock<HashMap<Format, Arc<dyn FormatAdapter>>>,
}

impl ProcessingService {
    /// Create a service with no adapters
    pub fn new() -> Self {
        Self {
            adapters: RwLock::new(HashMap::new()),
        }
    }

    /// Create a service with the podcast and post adapters registered
    pub fn with_defaults<P>(provider: Arc<P>, config: PipelineConfig) -> Self
    where
        P: CompletionProvider + 'static,
    {
        let service = Self::new();
        service.register_adapter(
            Format::Podcast,
            Arc::new(PodcastAdapter::new(Arc::clone(&provider), config.clone())),
        );
        service.register_adapter(Format::Post, Arc::new(PostAdapter::new(provider, config)));
        service
    }

    /// Register an adapter, replacing any previous one for the format
    pub fn register_adapter(
        &self,
        format: Format,
        adapter: Arc<dyn FormatAdapter>,
    ) -> Option<Arc<dyn FormatAdapter>> {
        if adapter.format() != format {
            warn!(
                "Registering {} adapter under format {}",
                adapter.format(),
                format
            );
        }
        let previous = self.write().insert(format, adapter);
        if previous.is_some() {
            info!("Replaced adapter for {}", format);
        } else {
            info!("Registered adapter for {}", format);
        }
        previous
    }

    /// Registered formats
    pub fn formats(&self) -> Vec<Format> {
        let mut formats: Vec<Format> = self.read().keys().copied().collect();
        formats.sort_by_key(|f| f.as_str());
        formats
    }

    /// Get the adapter for a format
    ///
    /// # Errors
    ///
    /// Returns `UnregisteredFormat` if no adapter is registered.
    pub fn adapter(&self, format: Format) -> Result<Arc<dyn FormatAdapter>, ServiceError> {
        self.read()
            .get(&format)
            .cloned()
            .ok_or(ServiceError::UnregisteredFormat(format))
    }

    /// Process an input with the adapter for `format`
    ///
    /// # Errors
    ///
    /// Returns `UnregisteredFormat` if no adapter is registered. Every other
    /// failure is reported through the returned result.
    pub async fn process(
        &self,
        format: Format,
        input: &str,
        options: &ProcessingOptions,
    ) -> Result<ProcessingResult, ServiceError> {
        self.process_with_cancel(format, input, options, &CancelToken::new())
            .await
    }

    /// Like [`ProcessingService::process`], stopping early when `cancel` fires
    pub async fn process_with_cancel(
        &self,
        format: Format,
        input: &str,
        options: &ProcessingOptions,
        cancel: &CancelToken,
    ) -> Result<ProcessingResult, ServiceError> {
        let adapter = self.adapter(format)?;
        let mut call = CallState::new(format);

        call.advance(ServiceState::Validating);
        if !validate_input(input) {
            warn!("Empty {} input", format);
            let result = ProcessingResult::failed(format, options, "Invalid input");
            call.finish(&result);
            return Ok(result);
        }

        call.advance(ServiceState::Processing);
        let result = match adapter.process_with_cancel(input, options, cancel).await {
            Ok(result) => result,
            Err(e) => {
                warn!("{} adapter error: {}", format, e);
                ProcessingResult::failed(format, options, e.to_string())
            }
        };

        call.finish(&result);
        info!(
            "{} result {}: {}",
            format,
            result.id,
            call.state
        );
        Ok(result)
    }

    /// Look up a result by id
    ///
    /// # Errors
    ///
    /// Returns `UnregisteredFormat` if no adapter is registered and
    /// `NotFound` if the adapter has no such result.
    pub async fn get_status(
        &self,
        format: Format,
        id: ResultId,
    ) -> Result<ProcessingResult, ServiceError> {
        let adapter = self.adapter(format)?;
        adapter.get_status(id).await
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Format, Arc<dyn FormatAdapter>>> {
        self.adapters.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Format, Arc<dyn FormatAdapter>>> {
        self.adapters.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ProcessingService {
    fn default() -> Self {
        Self::new()
    }
}
