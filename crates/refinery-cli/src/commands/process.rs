//! Process command implementation.

use super::{build_provider, cancel_on_interrupt, open_store, read_input};
use crate::cli::ProcessArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use refinery_domain::{CompletionProvider, Format, ProcessingOptions, ProcessingResult};
use refinery_pipeline::{CancelToken, PipelineConfig};
use refinery_service::ProcessingService;
use refinery_store::Post;
use std::sync::Arc;
use tracing::info;

/// Execute the process command.
pub async fn execute_process(args: ProcessArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let input = read_input(&args.file)?;
    let pipeline = args.preset.map(PipelineConfig::from).unwrap_or_else(|| config.pipeline.clone());
    let provider = Arc::new(build_provider(config)?);

    let cancel = CancelToken::new();
    let watcher = cancel_on_interrupt(&cancel);
    let result = process_content(provider, pipeline, &input, &args, &cancel).await;
    watcher.abort();
    let result = result?;

    println!("{}", formatter.format_result(&result)?);

    if !result.success {
        return Err(CliError::ProcessingFailed(
            result.error.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }

    if args.save {
        let mut store = open_store(config)?;
        let post = Post::from_result(&result);
        store.put(&post)?;
        eprintln!("{}", formatter.success(&format!("Saved draft post {}", post.id)));
    }

    Ok(())
}

/// Run `input` through the processing service.
pub async fn process_content<P>(
    provider: Arc<P>,
    pipeline: PipelineConfig,
    input: &str,
    args: &ProcessArgs,
    cancel: &CancelToken,
) -> Result<ProcessingResult>
where
    P: CompletionProvider + 'static,
{
    let format = Format::from(args.format);
    let options = processing_options(args);
    let service = ProcessingService::with_defaults(provider, pipeline);

    info!("Processing {} bytes as {}", input.len(), format);
    Ok(service.process_with_cancel(format, input, &options, cancel).await?)
}

/// Options for a process invocation.
pub fn processing_options(args: &ProcessArgs) -> ProcessingOptions {
    let mut options = ProcessingOptions::new(args.format.into()).with_quality(args.quality.into());
    if let Some(platform) = &args.platform {
        options = options.with_platform(platform.clone());
    }
    options.analyze_sentiment = !args.no_sentiment;
    options.extract_entities = !args.no_entities;
    options.include_timestamps = !args.no_timestamps;
    options
}
