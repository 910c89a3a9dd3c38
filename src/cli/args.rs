//! Command-line argument parsing for Tube Fetcher
//!
//! This module defines the CLI structure using clap derive macros, providing
//! a user-friendly interface for queueing acquisitions, inspecting the queue
//! and history, managing naming templates, and moving library snapshots.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::models::{MediaKind, QueueStatus};

/// Tube Fetcher - persistent download queue for video study libraries
#[derive(Parser, Debug)]
#[command(
    name = "tube_fetcher",
    version,
    about = "Track, resume and deduplicate video downloads in a durable local library",
    long_about = "A durable download queue and resumable-transfer tracker. Jobs survive \
process restarts, interrupted transfers resume from the exact byte they stopped at, and \
completed acquisitions are remembered so nothing is fetched twice."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Data directory holding the library database
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Queue a new acquisition
    Add(AddArgs),

    /// Inspect and manage the download queue
    Queue(QueueArgs),

    /// Inspect and manage acquisition history
    History(HistoryArgs),

    /// Manage filename templates
    Template(TemplateArgs),

    /// Export or import the library as a snapshot file
    Snapshot(SnapshotArgs),
}

/// Arguments for the add command
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Source item identifier (e.g. a video id)
    pub source_id: String,

    /// URL the transfer driver will fetch from
    pub source_ref: String,

    /// Display title
    #[arg(short, long)]
    pub title: String,

    /// Quality label (e.g. 720p)
    #[arg(long, default_value = "720p")]
    pub quality: String,

    /// Container format (e.g. mp4)
    #[arg(long, default_value = "mp4")]
    pub format: String,

    /// Kind of artifact: video, audio, caption or thumbnail
    #[arg(long, default_value = "video")]
    pub kind: String,

    /// Collaborator-specific stream selector
    #[arg(long, default_value = "")]
    pub transfer_format: String,

    /// Re-acquire even if history already has this item at this quality
    #[arg(short = 'F', long)]
    pub force: bool,
}

/// Arguments for queue management
#[derive(Args, Debug)]
pub struct QueueArgs {
    #[command(subcommand)]
    pub action: QueueAction,
}

/// Queue management actions
#[derive(Subcommand, Debug)]
pub enum QueueAction {
    /// List queued jobs
    List {
        /// Show only jobs in one status (pending, active, paused, failed)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Put a failed job back in line
    Retry {
        /// Job id
        id: String,
    },

    /// Remove a job and its resume checkpoint
    Cancel {
        /// Job id
        id: String,
    },
}

/// Arguments for history management
#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub action: HistoryAction,
}

/// History management actions
#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List completed acquisitions
    List {
        /// Show only acquisitions of one source item
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Delete all history records
    Clear,
}

/// Arguments for template management
#[derive(Args, Debug)]
pub struct TemplateArgs {
    #[command(subcommand)]
    pub action: TemplateAction,
}

/// Template management actions
#[derive(Subcommand, Debug)]
pub enum TemplateAction {
    /// List stored templates
    List,

    /// Store a new template
    Add {
        /// Preset name
        name: String,
        /// Pattern string, e.g. "{channel} - {title} [{quality}].{format}"
        template: String,
        /// Make this the default template
        #[arg(long)]
        default: bool,
    },

    /// Make a stored template the default
    SetDefault {
        /// Template id
        id: String,
    },

    /// Delete a stored template
    Remove {
        /// Template id
        id: String,
    },

    /// Preview a template against sample fields
    Render {
        /// Template id (falls back to the default template)
        #[arg(long)]
        id: Option<String>,
        /// Sample title
        #[arg(long, default_value = "Sample Lecture 1")]
        title: String,
    },
}

/// Arguments for snapshot export/import
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    #[command(subcommand)]
    pub action: SnapshotAction,
}

/// Snapshot actions
#[derive(Subcommand, Debug)]
pub enum SnapshotAction {
    /// Write the library to a snapshot file
    Export {
        /// Output file path
        file: PathBuf,
    },

    /// Load a snapshot file into the library
    Import {
        /// Input file path
        file: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl AddArgs {
    /// Validate field combinations before touching the store
    pub fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.source_ref)
            .map_err(|e| format!("Invalid source URL '{}': {}", self.source_ref, e))?;

        MediaKind::parse(&self.kind)
            .ok_or_else(|| format!("Unknown kind '{}' (expected video, audio, caption or thumbnail)", self.kind))?;

        if self.title.trim().is_empty() {
            return Err("Title must not be empty".to_string());
        }
        Ok(())
    }

    /// The parsed artifact kind; call after `validate`
    pub fn media_kind(&self) -> MediaKind {
        MediaKind::parse(&self.kind).unwrap_or(MediaKind::Video)
    }
}

/// Parse a user-supplied status filter
pub fn parse_status_filter(value: &str) -> Result<QueueStatus, String> {
    QueueStatus::parse(value).ok_or_else(|| {
        format!(
            "Unknown status '{}' (expected pending, active, paused, completed or failed)",
            value
        )
    })
}
