//! Request types for the download queue
//!
//! `EnqueueRequest` carries everything a caller knows about an acquisition
//! before it becomes a tracked job; the queue manager turns it into a
//! `QueueItem` with a generated id and a `Pending` status.

use chrono::Utc;
use uuid::Uuid;

use crate::app::models::{MediaKind, QueueItem, QueueStatus};

/// A caller's request to acquire one artifact
#[derive(Debug, Clone)]
pub struct EnqueueRequest {
    /// External identifier of the source item
    pub source_id: String,
    /// Locator the transfer driver will fetch from
    pub source_ref: String,
    /// Display title
    pub title: String,
    /// Reference to the thumbnail artifact, if any
    pub thumbnail_ref: Option<String>,
    /// Quality label (e.g. "720p")
    pub quality: String,
    /// Container format (e.g. "mp4")
    pub format: String,
    /// Kind of artifact to acquire
    pub kind: MediaKind,
    /// Collaborator-specific stream selector
    pub transfer_format_id: String,
}

impl EnqueueRequest {
    /// Create a request with the required fields
    pub fn new(
        source_id: impl Into<String>,
        source_ref: impl Into<String>,
        title: impl Into<String>,
        quality: impl Into<String>,
        format: impl Into<String>,
        kind: MediaKind,
        transfer_format_id: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            source_ref: source_ref.into(),
            title: title.into(),
            thumbnail_ref: None,
            quality: quality.into(),
            format: format.into(),
            kind,
            transfer_format_id: transfer_format_id.into(),
        }
    }

    /// Attach a thumbnail reference
    pub fn with_thumbnail(mut self, thumbnail_ref: impl Into<String>) -> Self {
        self.thumbnail_ref = Some(thumbnail_ref.into());
        self
    }

    /// Materialize the request as a pending queue item with a fresh id
    pub fn into_item(self) -> QueueItem {
        QueueItem {
            id: Uuid::new_v4().to_string(),
            source_id: self.source_id,
            source_ref: self.source_ref,
            title: self.title,
            thumbnail_ref: self.thumbnail_ref,
            quality: self.quality,
            format: self.format,
            kind: self.kind,
            status: QueueStatus::Pending,
            progress_pct: 0.0,
            downloaded_bytes: 0,
            total_bytes: None,
            transfer_format_id: self.transfer_format_id,
            enqueued_at: Utc::now(),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_item_starts_pending_with_fresh_id() {
        let request = EnqueueRequest::new(
            "abc",
            "https://example.com/watch?v=abc",
            "Statistics 1",
            "720p",
            "mp4",
            MediaKind::Video,
            "22",
        );
        let item = request.clone().into_item();
        let other = request.into_item();

        assert_eq!(item.status, QueueStatus::Pending);
        assert_eq!(item.downloaded_bytes, 0);
        assert!(item.error.is_none());
        assert_ne!(item.id, other.id);
    }

    #[test]
    fn test_with_thumbnail() {
        let request = EnqueueRequest::new(
            "abc",
            "https://example.com/watch?v=abc",
            "Statistics 1",
            "720p",
            "mp4",
            MediaKind::Video,
            "22",
        )
        .with_thumbnail("thumbs/abc.jpg");
        assert_eq!(request.thumbnail_ref.as_deref(), Some("thumbs/abc.jpg"));
    }
}
