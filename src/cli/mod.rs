//! Command-line interface components
//!
//! This module contains CLI-specific code for the Tube Fetcher application,
//! including argument parsing and command handlers.

pub mod args;
pub mod commands;

pub use args::{
    AddArgs, Cli, Commands, GlobalArgs, HistoryAction, HistoryArgs, QueueAction, QueueArgs,
    SnapshotAction, SnapshotArgs, TemplateAction, TemplateArgs,
};
pub use commands::{
    handle_add, handle_history, handle_queue, handle_snapshot, handle_template, open_store,
};
