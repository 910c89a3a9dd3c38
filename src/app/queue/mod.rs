//! Persistent download queue
//!
//! This module provides the durable job queue that survives interruption:
//! every job is a row in the store, every lifecycle transition is persisted
//! before the call that caused it returns, and a reload of the process finds
//! the queue exactly where it left off.
//!
//! # Features
//!
//! - **Durable state machine**: pending, active, paused, completed and
//!   failed statuses with validated, persisted transitions
//! - **Duplicate detection**: completed acquisitions in history block
//!   re-enqueue unless explicitly forced
//! - **Resume integration**: interruptions hand byte state to the resume
//!   tracker so transfers continue instead of restarting
//! - **Crash consistency**: completion promotes into history first, and a
//!   documented history-wins rule heals the non-atomic window
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use tube_fetcher::app::queue::{EnqueueRequest, QueueManager};
//! use tube_fetcher::app::models::MediaKind;
//! use tube_fetcher::app::store::MediaStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MediaStore::in_memory()?;
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
//! queue.mark_started(&job_id).await?;
//! # Ok(())
//! # }
//! ```

mod manager;
mod types;

pub use manager::QueueManager;
pub use types::EnqueueRequest;

#[cfg(test)]
mod tests;
