//! Queue manager: the job lifecycle state machine
//!
//! Single source of truth for what is happening to each tracked acquisition.
//! Every transition is persisted through the store before the call returns;
//! the transfer driver only ever reports events (started, progress,
//! interrupted, completed, failed) and the manager decides what they mean.
//!
//! Completion is a two-collection transition (history insert, queue delete)
//! and is deliberately not atomic across them. The documented recovery rule
//! is that history wins: a lingering `completed` queue row whose acquisition
//! already exists in history is deleted by whichever reader sees it first.

use tracing::{debug, info, warn};

use crate::app::models::{HistoryRecord, QueueItem, QueueStatus};
use crate::app::resume::ResumeTracker;
use crate::app::store::MediaStore;
use crate::errors::{QueueError, QueueResult};

use super::types::EnqueueRequest;

/// Orchestrates job lifecycle transitions over the queue collection
#[derive(Debug, Clone)]
pub struct QueueManager {
    store: MediaStore,
    tracker: ResumeTracker,
}

impl QueueManager {
    /// Create a manager over the given store
    pub fn new(store: MediaStore) -> Self {
        let tracker = ResumeTracker::new(store.clone());
        Self { store, tracker }
    }

    /// The resume tracker sharing this manager's store
    pub fn tracker(&self) -> &ResumeTracker {
        &self.tracker
    }

    /// Add a new acquisition job to the queue
    ///
    /// # Arguments
    ///
    /// * `request` - What to acquire
    /// * `force` - Re-acquire even when history already has this acquisition
    ///
    /// # Errors
    ///
    /// `QueueError::DuplicateJob` when a history record with the same
    /// `(source_id, quality, format)` exists and `force` is false.
    pub async fn enqueue(&self, request: EnqueueRequest, force: bool) -> QueueResult<String> {
        if !force {
            let existing = self
                .store
                .history()
                .find_acquisition(&request.source_id, &request.quality, &request.format)
                .await?;
            if existing.is_some() {
                debug!(
                    "Rejecting duplicate enqueue of {} ({}, {})",
                    request.source_id, request.quality, request.format
                );
                return Err(QueueError::DuplicateJob {
                    source_id: request.source_id,
                    quality: request.quality,
                    format: request.format,
                });
            }
        }

        let item = request.into_item();
        self.store.queue().put(&item).await?;
        info!(
            "Enqueued job {} for {} ({}, {})",
            item.id, item.source_id, item.quality, item.format
        );
        Ok(item.id)
    }

    /// Record that the transfer driver picked the job up
    ///
    /// Pending jobs become active; an already active job is left alone so a
    /// restarted driver can safely re-announce itself.
    pub async fn mark_started(&self, id: &str) -> QueueResult<()> {
        let mut item = self.require(id).await?;
        match item.status {
            QueueStatus::Active => Ok(()),
            QueueStatus::Pending => {
                item.status = QueueStatus::Active;
                self.store.queue().put(&item).await?;
                debug!("Job {} started", id);
                Ok(())
            }
            other => Err(QueueError::InvalidTransition {
                from: other.to_string(),
                to: QueueStatus::Active.to_string(),
            }),
        }
    }

    /// Record a progress report from the transfer driver
    ///
    /// Recomputes the derived percentage. Reports for jobs that are not
    /// active are dropped: a late packet from a paused or cancelled transfer
    /// must not resurrect the job.
    ///
    /// # Errors
    ///
    /// `QueueError::ProgressExceedsTotal` when the report claims more bytes
    /// than the known total.
    pub async fn update_progress(
        &self,
        id: &str,
        downloaded_bytes: u64,
        total_bytes: Option<u64>,
    ) -> QueueResult<()> {
        let mut item = self.require(id).await?;
        if !item.status.is_active() {
            debug!(
                "Dropping progress report for job {} in status {}",
                id, item.status
            );
            return Ok(());
        }

        if let Some(total) = total_bytes.or(item.total_bytes) {
            if downloaded_bytes > total {
                return Err(QueueError::ProgressExceedsTotal {
                    downloaded_bytes,
                    total_bytes: total,
                });
            }
        }

        item.record_progress(downloaded_bytes, total_bytes);
        self.store.queue().put(&item).await?;
        Ok(())
    }

    /// Record an interruption (network loss, process exit) of an active job
    ///
    /// The job moves to `paused` and is guaranteed to have a resume
    /// checkpoint afterwards, even when the driver never reported a chunk.
    pub async fn mark_interrupted(&self, id: &str) -> QueueResult<()> {
        let mut item = self.require(id).await?;
        if !item.status.is_active() {
            return Err(QueueError::InvalidTransition {
                from: item.status.to_string(),
                to: QueueStatus::Paused.to_string(),
            });
        }

        item.status = QueueStatus::Paused;
        self.store.queue().put(&item).await?;
        self.tracker.ensure_checkpoint(&item).await?;
        info!(
            "Job {} interrupted at {} bytes",
            id, item.downloaded_bytes
        );
        Ok(())
    }

    /// Resume a paused job; returns the byte offset the transfer should
    /// continue from (0 when no checkpoint survived)
    pub async fn resume(&self, id: &str) -> QueueResult<u64> {
        let mut item = self.require(id).await?;
        match item.status {
            QueueStatus::Paused => {
                item.status = QueueStatus::Active;
                self.store.queue().put(&item).await?;
            }
            QueueStatus::Active => {}
            other => {
                return Err(QueueError::InvalidTransition {
                    from: other.to_string(),
                    to: QueueStatus::Active.to_string(),
                });
            }
        }

        let offset = self.tracker.resume_offset(id).await?;
        info!("Job {} resuming from byte {}", id, offset);
        Ok(offset)
    }

    /// Promote a fully received job into history and drop it from the queue
    ///
    /// Idempotent: calling again after success is a no-op, and a crash
    /// between the history write and the queue delete is healed on the next
    /// call (or by any reader via the history-wins rule).
    pub async fn mark_completed(&self, id: &str) -> QueueResult<()> {
        let Some(mut item) = self.store.queue().get(id).await? else {
            debug!("mark_completed for {}: already promoted", id);
            return Ok(());
        };

        match item.status {
            QueueStatus::Active => {
                // Persist the transition first so a crash below leaves a
                // recognizably stale row instead of a silently lost one
                item.status = QueueStatus::Completed;
                self.store.queue().put(&item).await?;
            }
            QueueStatus::Completed => {}
            other => {
                return Err(QueueError::InvalidTransition {
                    from: other.to_string(),
                    to: QueueStatus::Completed.to_string(),
                });
            }
        }

        let already_recorded = self
            .store
            .history()
            .find_acquisition(&item.source_id, &item.quality, &item.format)
            .await?
            .is_some();
        if !already_recorded {
            let record = HistoryRecord::from_completed(&item);
            self.store.history().put(&record).await?;
            info!(
                "Job {} completed: {} ({}, {}) recorded as {}",
                id, item.source_id, item.quality, item.format, record.id
            );
        }

        self.store.queue().delete(id).await?;
        self.tracker.discard(id).await?;
        Ok(())
    }

    /// Record an unrecoverable failure
    ///
    /// The row is kept, error attached, for user-driven retry or removal.
    /// There is no automatic retry: silently re-running a job that failed on
    /// revoked access or quota exhaustion only masks the cause.
    pub async fn mark_failed(&self, id: &str, error: &str) -> QueueResult<()> {
        let mut item = self.require(id).await?;
        match item.status {
            QueueStatus::Failed => Ok(()),
            QueueStatus::Pending | QueueStatus::Active | QueueStatus::Paused => {
                item.status = QueueStatus::Failed;
                item.error = Some(error.to_string());
                self.store.queue().put(&item).await?;
                warn!("Job {} failed: {}", id, error);
                Ok(())
            }
            other => Err(QueueError::InvalidTransition {
                from: other.to_string(),
                to: QueueStatus::Failed.to_string(),
            }),
        }
    }

    /// Put a failed job back in line at the caller's explicit request
    pub async fn retry(&self, id: &str) -> QueueResult<()> {
        let mut item = self.require(id).await?;
        if !item.status.is_failed() {
            return Err(QueueError::InvalidTransition {
                from: item.status.to_string(),
                to: QueueStatus::Pending.to_string(),
            });
        }

        item.status = QueueStatus::Pending;
        item.error = None;
        self.store.queue().put(&item).await?;
        info!("Job {} queued for retry", id);
        Ok(())
    }

    /// Remove a job in any state; a cancelled job leaves no resumable trace
    ///
    /// Missing ids are a no-op, matching delete semantics elsewhere.
    pub async fn cancel(&self, id: &str) -> QueueResult<()> {
        if self.store.queue().delete(id).await? {
            self.tracker.invalidate(id).await?;
            info!("Job {} cancelled", id);
        }
        Ok(())
    }

    /// Get a job by id, applying the history-wins rule to stale rows
    pub async fn get(&self, id: &str) -> QueueResult<Option<QueueItem>> {
        match self.store.queue().get(id).await? {
            Some(item) => self.reconcile(item).await,
            None => Ok(None),
        }
    }

    /// Jobs in one status, ordered by enqueue time
    pub async fn list_by_status(&self, status: QueueStatus) -> QueueResult<Vec<QueueItem>> {
        let mut live = Vec::new();
        for item in self.store.queue().get_all_by_status(status).await? {
            if let Some(item) = self.reconcile(item).await? {
                live.push(item);
            }
        }
        Ok(live)
    }

    /// Every live job, ordered by enqueue time
    pub async fn list_all(&self) -> QueueResult<Vec<QueueItem>> {
        let mut live = Vec::new();
        for item in self.store.queue().get_all().await? {
            if let Some(item) = self.reconcile(item).await? {
                live.push(item);
            }
        }
        Ok(live)
    }

    /// Drop a stale completed row whose acquisition history already records;
    /// any reader is allowed (and expected) to perform this deletion
    async fn reconcile(&self, item: QueueItem) -> QueueResult<Option<QueueItem>> {
        if item.status != QueueStatus::Completed {
            return Ok(Some(item));
        }

        let recorded = self
            .store
            .history()
            .find_acquisition(&item.source_id, &item.quality, &item.format)
            .await?
            .is_some();
        if recorded {
            debug!("Sweeping stale completed queue row {}", item.id);
            self.store.queue().delete(&item.id).await?;
            self.tracker.discard(&item.id).await?;
            return Ok(None);
        }
        Ok(Some(item))
    }

    async fn require(&self, id: &str) -> QueueResult<QueueItem> {
        self.store
            .queue()
            .get(id)
            .await?
            .ok_or_else(|| QueueError::NotFound { id: id.to_string() })
    }
}
