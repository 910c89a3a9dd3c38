//! Core application logic for Tube Fetcher
//!
//! This module contains the durable-state engine: the persistent store and
//! its record collections, the queue manager driving the job lifecycle, the
//! resume tracker making interruptions byte-exact, filename generation, and
//! snapshot export/import.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tube_fetcher::app::models::MediaKind;
//! use tube_fetcher::app::queue::{EnqueueRequest, QueueManager};
//! use tube_fetcher::app::store::MediaStore;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MediaStore::open(Path::new("library.db")).await?;
//! let queue = QueueManager::new(store);
//!
//! let request = EnqueueRequest::new(
//!     "dQw4w9WgXcQ",
//!     "https://example.com/watch?v=dQw4w9WgXcQ",
//!     "Linear Algebra 14",
//!     "720p",
//!     "mp4",
//!     MediaKind::Video,
//!     "22",
//! );
//! let job_id = queue.enqueue(request, false).await?;
//! println!("tracking job {}", job_id);
//! # Ok(())
//! # }
//! ```

pub mod models;
pub mod naming;
pub mod queue;
pub mod resume;
pub mod snapshot;
pub mod store;

// Re-export commonly used types for convenience
pub use models::{
    ChunkRange, Collection, HistoryRecord, MediaKind, NamingTemplate, PartialTransfer, QueueItem,
    QueueStatus, Tag,
};
pub use naming::{render, NameFields};
pub use queue::{EnqueueRequest, QueueManager};
pub use resume::ResumeTracker;
pub use snapshot::{ImportReport, Snapshot};
pub use store::MediaStore;
