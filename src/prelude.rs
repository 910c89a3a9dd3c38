//! Prelude module for Tube Fetcher Library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use tube_fetcher::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tube_fetcher::prelude::*;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = MediaStore::open(Path::new("library.db")).await?;
//!     let queue = QueueManager::new(store.clone());
//!
//!     // Continue with queue setup...
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Essential app components that are used in most integrations
pub use crate::app::{
    ChunkRange, EnqueueRequest, HistoryRecord, MediaKind, MediaStore, NameFields, PartialTransfer,
    QueueItem, QueueManager, QueueStatus, ResumeTracker,
};

// Domain errors callers commonly match on
pub use crate::errors::{QueueError, ResumeError, StoreError};
