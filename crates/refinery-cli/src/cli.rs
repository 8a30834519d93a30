//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use refinery_domain::{Format, Quality};

/// Refinery CLI - Refine podcast transcripts and post drafts with an LLM.
#[derive(Debug, Parser)]
#[command(name = "refinery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log filter (e.g. "info", "refinery_pipeline=debug")
    #[arg(long, global = true, env = "REFINERY_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (output text or IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process a transcript or draft through the LLM pipeline
    Process(ProcessArgs),

    /// Show how a document would be chunked (no LLM calls)
    Chunk(ChunkArgs),

    /// Fill a template with processed content
    Merge(MergeArgs),

    /// Manage saved posts
    Posts(PostsArgs),

    /// Manage saved templates
    Templates(TemplatesArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the process command.
#[derive(Debug, Parser)]
pub struct ProcessArgs {
    /// Input file ("-" reads stdin)
    pub file: String,

    /// Content format
    #[arg(short, long, value_enum, default_value = "post")]
    pub format: FormatArg,

    /// Requested quality
    #[arg(short, long, value_enum, default_value = "draft")]
    pub quality: QualityArg,

    /// Target platform recorded in the result metadata
    #[arg(long)]
    pub platform: Option<String>,

    /// Pipeline preset (overrides the configured pipeline settings)
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Skip entity extraction
    #[arg(long)]
    pub no_entities: bool,

    /// Skip sentiment analysis
    #[arg(long)]
    pub no_sentiment: bool,

    /// Do not ask for timestamps
    #[arg(long)]
    pub no_timestamps: bool,

    /// Save the result as a draft post
    #[arg(long)]
    pub save: bool,
}

/// Arguments for the chunk command.
#[derive(Debug, Parser)]
pub struct ChunkArgs {
    /// Input file ("-" reads stdin)
    pub file: String,

    /// Pack whole sentences instead of cutting at a delimiter
    #[arg(long)]
    pub sentence: bool,

    /// Override the maximum chunk size (bytes)
    #[arg(long)]
    pub max_size: Option<usize>,

    /// Override the overlap (bytes, or words with --sentence)
    #[arg(long)]
    pub overlap: Option<usize>,
}

/// Arguments for the merge command.
#[derive(Debug, Parser)]
pub struct MergeArgs {
    /// Template file, or the id of a saved template
    pub template: String,

    /// Content file ("-" reads stdin)
    pub content: String,
}

/// Arguments for post management.
#[derive(Debug, Parser)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub action: PostsAction,
}

/// Post management actions.
#[derive(Debug, Subcommand)]
pub enum PostsAction {
    /// List all posts
    List,

    /// Show a post
    Show {
        /// Post ID
        id: String,
    },

    /// Publish a draft post
    Publish {
        /// Post ID
        id: String,
    },

    /// Move a published post back to draft
    Unpublish {
        /// Post ID
        id: String,
    },

    /// Delete a post
    Delete {
        /// Post ID
        id: String,
    },
}

/// Arguments for template management.
#[derive(Debug, Parser)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub action: TemplatesAction,
}

/// Template management actions.
#[derive(Debug, Subcommand)]
pub enum TemplatesAction {
    /// List all templates
    List,

    /// Save a template from a file
    Add {
        /// Template name
        name: String,
        /// Template file
        file: String,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a template
    Delete {
        /// Template ID
        id: String,
    },
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Format argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum FormatArg {
    /// Podcast transcript
    Podcast,
    /// Blog post draft
    Post,
}

/// Quality argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum QualityArg {
    /// Fast pass
    Draft,
    /// Publication-ready pass
    Final,
}

/// Pipeline preset argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Larger chunks, fewer retries
    Draft,
    /// Smaller overlapping chunks, patient retries
    Thorough,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<FormatArg> for Format {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Podcast => Format::Podcast,
            FormatArg::Post => Format::Post,
        }
    }
}

impl From<QualityArg> for Quality {
    fn from(quality: QualityArg) -> Self {
        match quality {
            QualityArg::Draft => Quality::Draft,
            QualityArg::Final => Quality::Final,
        }
    }
}

impl From<PresetArg> for refinery_pipeline::PipelineConfig {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Draft => refinery_pipeline::PipelineConfig::draft(),
            PresetArg::Thorough => refinery_pipeline::PipelineConfig::thorough(),
        }
    }
}
