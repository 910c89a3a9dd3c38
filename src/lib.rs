//! Tube Fetcher Library
//!
//! A Rust library implementing the durable-state engine behind a video study
//! library: a persistent download queue with a crash-consistent lifecycle,
//! byte-exact resumable-transfer tracking, duplicate detection against
//! acquisition history, and filename templating.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
