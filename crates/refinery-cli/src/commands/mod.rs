//! Command implementations.

pub mod chunk;
pub mod config;
pub mod merge;
pub mod posts;
pub mod process;
pub mod templates;

pub use self::chunk::execute_chunk;
pub use self::config::execute_config;
pub use self::merge::execute_merge;
pub use self::posts::execute_posts;
pub use self::process::execute_process;
pub use self::templates::execute_templates;

use crate::config::Config;
use crate::error::{CliError, Result};
use refinery_llm::AnthropicProvider;
use refinery_pipeline::CancelToken;
use refinery_store::SqliteStore;
use std::io::Read;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Read a file, or stdin when `path` is "-".
pub fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Build the Anthropic provider from the config and `ANTHROPIC_API_KEY`.
pub fn build_provider(config: &Config) -> Result<AnthropicProvider> {
    let mut provider = AnthropicProvider::from_env(config.llm.model.clone())?
        .with_default_max_tokens(config.pipeline.tokens.response_max_tokens);
    if let Some(endpoint) = &config.llm.endpoint {
        provider = provider.with_endpoint(endpoint.clone());
    }
    debug!("Using model {}", config.llm.model);
    Ok(provider)
}

/// Open the post and template database.
pub fn open_store(config: &Config) -> Result<SqliteStore> {
    let path = config.database_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(SqliteStore::new(path)?)
}

/// Parse a record id.
pub fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|e| CliError::InvalidInput(format!("Invalid ID '{}': {}", id, e)))
}

/// Cancel `token` on Ctrl-C. Abort the handle once the work is done.
pub fn cancel_on_interrupt(token: &CancelToken) -> JoinHandle<()> {
    let token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping before the next batch");
            token.cancel();
        }
    })
}
