//! Resume tracking for interrupted transfers
//!
//! Makes interruption-then-continuation byte-exact: every chunk the transfer
//! driver reports is appended to the job's checkpoint, and a checkpoint can
//! only ever describe a contiguous prefix of the target artifact. A chunk
//! that does not start exactly at the stored offset is rejected without
//! touching stored state; a stored checkpoint found to have a gap is deleted,
//! never partially trusted.
//!
//! Corruption of the remote resource itself (changed length, changed ETag) is
//! the caller's to detect; `invalidate` is the hook for that. The tracker
//! guarantees only that what it stores is internally contiguous and
//! byte-accurate to what it was told.
//!
//! Concurrent checkpoints for the same job must be serialized by the caller;
//! the tracker assumes a single active transfer driver per job.

use chrono::Utc;
use tracing::{debug, warn};

use crate::app::models::{ChunkRange, PartialTransfer, QueueItem};
use crate::app::store::MediaStore;
use crate::errors::{ResumeError, ResumeResult, StoreError};

/// Reads and writes resume checkpoints for the queue's jobs
#[derive(Debug, Clone)]
pub struct ResumeTracker {
    store: MediaStore,
}

impl ResumeTracker {
    /// Create a tracker over the given store
    pub fn new(store: MediaStore) -> Self {
        Self { store }
    }

    /// Append a received chunk to the job's checkpoint
    ///
    /// The first checkpoint for a job creates the record from the queue
    /// item's metadata; subsequent calls append. Returns the updated
    /// checkpoint.
    ///
    /// # Errors
    ///
    /// - `ResumeError::OutOfOrderChunk` when the chunk does not start at the
    ///   current offset (stored state is left unchanged), or is empty
    /// - `ResumeError::UnknownJob` when neither a checkpoint nor a queue row
    ///   exists for `job_id`
    pub async fn checkpoint(
        &self,
        job_id: &str,
        chunk: ChunkRange,
    ) -> ResumeResult<PartialTransfer> {
        let mut transfer = match self.load_valid(job_id).await? {
            Some(existing) => existing,
            None => {
                let item = self
                    .store
                    .queue()
                    .get(job_id)
                    .await?
                    .ok_or_else(|| ResumeError::UnknownJob {
                        job_id: job_id.to_string(),
                    })?;
                PartialTransfer::empty_for(&item)
            }
        };

        let expected_offset = transfer.expected_offset();
        if chunk.start != expected_offset || chunk.len == 0 {
            return Err(ResumeError::OutOfOrderChunk {
                job_id: job_id.to_string(),
                expected_offset,
                chunk_start: chunk.start,
            });
        }

        transfer.chunks.push(chunk);
        transfer.downloaded_bytes = chunk.end();
        transfer.last_updated = Utc::now();
        self.store.transfers().put(&transfer).await?;

        debug!(
            "Checkpointed job {}: {} bytes in {} chunks",
            job_id,
            transfer.downloaded_bytes,
            transfer.chunks.len()
        );
        Ok(transfer)
    }

    /// Offset a resumed transfer should continue from
    ///
    /// Returns 0 when no valid checkpoint exists, meaning a fresh start.
    pub async fn resume_offset(&self, job_id: &str) -> ResumeResult<u64> {
        Ok(self
            .load_valid(job_id)
            .await?
            .map(|t| t.downloaded_bytes)
            .unwrap_or(0))
    }

    /// Make sure the job has a checkpoint, creating an empty one if the
    /// driver never reported a chunk before the interruption
    pub async fn ensure_checkpoint(&self, item: &QueueItem) -> ResumeResult<PartialTransfer> {
        if let Some(mut existing) = self.load_valid(&item.id).await? {
            existing.last_updated = Utc::now();
            self.store.transfers().put(&existing).await?;
            return Ok(existing);
        }

        let transfer = PartialTransfer::empty_for(item);
        self.store.transfers().put(&transfer).await?;
        debug!("Created empty checkpoint for interrupted job {}", item.id);
        Ok(transfer)
    }

    /// Drop a checkpoint the caller has found to be unusable (corrupt data,
    /// remote resource changed). No-op when absent.
    pub async fn invalidate(&self, job_id: &str) -> ResumeResult<()> {
        if self.store.transfers().delete(job_id).await? {
            warn!("Invalidated resume checkpoint for job {}", job_id);
        }
        Ok(())
    }

    /// Drop a checkpoint after the job completed. No-op when absent.
    pub async fn discard(&self, job_id: &str) -> ResumeResult<()> {
        if self.store.transfers().delete(job_id).await? {
            debug!("Discarded resume checkpoint for completed job {}", job_id);
        }
        Ok(())
    }

    /// Load a checkpoint, deleting it when it cannot be trusted
    async fn load_valid(&self, job_id: &str) -> ResumeResult<Option<PartialTransfer>> {
        match self.store.transfers().get(job_id).await {
            Ok(Some(transfer)) if transfer.is_contiguous() => Ok(Some(transfer)),
            Ok(Some(transfer)) => {
                warn!(
                    "Checkpoint for job {} has a gap ({} chunks, {} bytes claimed), deleting",
                    job_id,
                    transfer.chunks.len(),
                    transfer.downloaded_bytes
                );
                self.store.transfers().delete(job_id).await?;
                Ok(None)
            }
            Ok(None) => Ok(None),
            Err(StoreError::Sqlite(rusqlite::Error::FromSqlConversionFailure(..))) => {
                warn!("Checkpoint for job {} is unreadable, deleting", job_id);
                self.store.transfers().delete(job_id).await?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
