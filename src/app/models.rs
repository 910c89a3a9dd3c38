//! Data models for Tube Fetcher
//!
//! This module defines the core record types used throughout the application:
//! completed-acquisition history, queued jobs, resume checkpoints, naming
//! templates, and the study-library records (collections and tags) that ride
//! along in snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::queue::PROGRESS_MAX;

/// Kind of artifact a job acquires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Muxed or video-only stream
    Video,
    /// Audio-only stream
    Audio,
    /// Subtitle/caption track
    Caption,
    /// Cover image
    Thumbnail,
}

impl MediaKind {
    /// Stable text form used in database columns
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Caption => "caption",
            Self::Thumbnail => "thumbnail",
        }
    }

    /// Parse the database text form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            "caption" => Some(Self::Caption),
            "thumbnail" => Some(Self::Thumbnail),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a job in the download queue
///
/// Transitions are driven by the queue manager:
///
/// ```text
/// pending -> active -> completed
///    |         |  \
///    |         |   -> paused -> active
///    v         v        |
///  failed <- failed <---+      failed -> pending (explicit retry)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    /// Waiting for a transfer driver to pick the job up
    Pending,
    /// Transfer in flight
    Active,
    /// Interrupted; a resume checkpoint may exist
    Paused,
    /// Bytes fully received and verified; row is promoted to history
    Completed,
    /// Terminal until the caller explicitly retries
    Failed,
}

impl QueueStatus {
    /// Stable text form used in database columns
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse the database text form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Check whether the state machine allows moving to `next`
    pub fn can_transition_to(&self, next: QueueStatus) -> bool {
        use QueueStatus::*;
        matches!(
            (self, next),
            (Pending, Active)
                | (Active, Paused)
                | (Active, Completed)
                | (Paused, Active)
                | (Pending, Failed)
                | (Active, Failed)
                | (Paused, Failed)
                | (Failed, Pending)
        )
    }

    /// Check if this status represents a pending job
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Check if this status represents an in-flight job
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Check if this status represents an interrupted job
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Check if this status represents a failed job
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Completed and failed jobs take no further transitions on their own
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One completed acquisition, kept for duplicate detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Opaque unique id, generated at insert and never reused
    pub id: String,
    /// External identifier of the source item (e.g. a video id); an item may
    /// recur at a different quality
    pub source_id: String,
    /// Display title at the time of acquisition
    pub title: String,
    /// Reference to the thumbnail artifact, if any
    pub thumbnail_ref: Option<String>,
    /// Quality label (e.g. "720p")
    pub quality: String,
    /// Container format (e.g. "mp4")
    pub format: String,
    /// Set exactly once, at creation
    pub completed_at: DateTime<Utc>,
    /// Final artifact size, when the transfer reported one
    pub size_bytes: Option<u64>,
}

impl HistoryRecord {
    /// Promote a finished queue item into a history record
    pub fn from_completed(item: &QueueItem) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_id: item.source_id.clone(),
            title: item.title.clone(),
            thumbnail_ref: item.thumbnail_ref.clone(),
            quality: item.quality.clone(),
            format: item.format.clone(),
            completed_at: Utc::now(),
            size_bytes: item
                .total_bytes
                .or_else(|| (item.downloaded_bytes > 0).then_some(item.downloaded_bytes)),
        }
    }
}

/// One job currently tracked by the queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Opaque unique id, generated at enqueue
    pub id: String,
    /// External identifier of the source item
    pub source_id: String,
    /// Locator handed to the transfer driver
    pub source_ref: String,
    /// Display title
    pub title: String,
    /// Reference to the thumbnail artifact, if any
    pub thumbnail_ref: Option<String>,
    /// Quality label
    pub quality: String,
    /// Container format
    pub format: String,
    /// Kind of artifact being acquired
    pub kind: MediaKind,
    /// Current lifecycle status
    pub status: QueueStatus,
    /// Derived percentage in [0, 100]; consistent with the byte counters
    /// whenever `total_bytes` is known
    pub progress_pct: f64,
    /// Bytes received so far
    pub downloaded_bytes: u64,
    /// Total size, known once the transfer driver has read headers
    pub total_bytes: Option<u64>,
    /// Collaborator-specific stream selector
    pub transfer_format_id: String,
    /// When the job entered the queue
    pub enqueued_at: DateTime<Utc>,
    /// Human-readable cause, set only while `status == Failed`
    pub error: Option<String>,
}

impl QueueItem {
    /// Update the byte counters and recompute the derived percentage
    ///
    /// When the total is unknown the percentage is left untouched; there is
    /// nothing meaningful to derive it from.
    pub fn record_progress(&mut self, downloaded_bytes: u64, total_bytes: Option<u64>) {
        self.downloaded_bytes = downloaded_bytes;
        if total_bytes.is_some() {
            self.total_bytes = total_bytes;
        }
        if let Some(total) = self.total_bytes {
            if total > 0 {
                self.progress_pct =
                    ((downloaded_bytes as f64 / total as f64) * PROGRESS_MAX).min(PROGRESS_MAX);
            }
        }
    }
}

/// Half-open byte range `[start, start + len)` received from the transfer driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRange {
    /// Offset of the first byte in the chunk
    pub start: u64,
    /// Number of bytes in the chunk
    pub len: u64,
}

impl ChunkRange {
    /// Create a new chunk range
    pub fn new(start: u64, len: u64) -> Self {
        Self { start, len }
    }

    /// Offset one past the last byte
    pub fn end(&self) -> u64 {
        self.start + self.len
    }
}

/// Resume checkpoint; at most one per job, keyed by the job id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialTransfer {
    /// Job id (1:1 with a queue item)
    pub id: String,
    /// External identifier of the source item
    pub source_id: String,
    /// Collaborator-specific stream selector
    pub transfer_format_id: String,
    /// Kind of artifact being acquired
    pub kind: MediaKind,
    /// Bytes represented by `chunks`
    pub downloaded_bytes: u64,
    /// Total size, when known at checkpoint time
    pub total_bytes: Option<u64>,
    /// Byte ranges already retrieved, contiguous from offset 0
    pub chunks: Vec<ChunkRange>,
    /// Last checkpoint time
    pub last_updated: DateTime<Utc>,
}

impl PartialTransfer {
    /// Create an empty checkpoint for a job that has received no bytes yet
    pub fn empty_for(item: &QueueItem) -> Self {
        Self {
            id: item.id.clone(),
            source_id: item.source_id.clone(),
            transfer_format_id: item.transfer_format_id.clone(),
            kind: item.kind,
            downloaded_bytes: 0,
            total_bytes: item.total_bytes,
            chunks: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Offset the next chunk must start at
    pub fn expected_offset(&self) -> u64 {
        self.downloaded_bytes
    }

    /// Verify the stored chunk set reconstructs exactly the first
    /// `downloaded_bytes` bytes: contiguous from 0, no gaps or overlaps
    ///
    /// A checkpoint failing this check cannot be resumed from and must be
    /// deleted, not partially trusted.
    pub fn is_contiguous(&self) -> bool {
        let mut offset = 0u64;
        for chunk in &self.chunks {
            if chunk.start != offset || chunk.len == 0 {
                return false;
            }
            offset = chunk.end();
        }
        offset == self.downloaded_bytes
    }
}

/// Filename-pattern preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingTemplate {
    /// Opaque unique id
    pub id: String,
    /// User-facing preset name
    pub name: String,
    /// Pattern string with `{placeholder}` tokens
    pub template: String,
    /// At most one template is the default at any time
    pub is_default: bool,
}

impl NamingTemplate {
    /// Create a new, non-default template
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            template: template.into(),
            is_default: false,
        }
    }
}

/// User-curated grouping of saved videos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Opaque unique id
    pub id: String,
    /// Collection name
    pub name: String,
    /// Source ids of the member videos, in user order
    pub video_ids: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Collection {
    /// Create a new collection
    pub fn new(name: impl Into<String>, video_ids: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            video_ids,
            created_at: Utc::now(),
        }
    }
}

/// Label attachable to saved videos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Opaque unique id
    pub id: String,
    /// Tag name
    pub name: String,
    /// Optional display color (hex string)
    pub color: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Create a new tag
    pub fn new(name: impl Into<String>, color: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            color,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_item() -> QueueItem {
        QueueItem {
            id: "job-1".to_string(),
            source_id: "abc".to_string(),
            source_ref: "https://example.com/watch?v=abc".to_string(),
            title: "Intro to Thermodynamics".to_string(),
            thumbnail_ref: None,
            quality: "720p".to_string(),
            format: "mp4".to_string(),
            kind: MediaKind::Video,
            status: QueueStatus::Pending,
            progress_pct: 0.0,
            downloaded_bytes: 0,
            total_bytes: None,
            transfer_format_id: "22".to_string(),
            enqueued_at: Utc::now(),
            error: None,
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            QueueStatus::Pending,
            QueueStatus::Active,
            QueueStatus::Paused,
            QueueStatus::Completed,
            QueueStatus::Failed,
        ] {
            assert_eq!(QueueStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(QueueStatus::parse("bogus"), None);
    }

    #[test]
    fn test_allowed_transitions() {
        use QueueStatus::*;
        assert!(Pending.can_transition_to(Active));
        assert!(Active.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Active));
        assert!(Active.can_transition_to(Completed));
        assert!(Failed.can_transition_to(Pending));
        for from in [Pending, Active, Paused] {
            assert!(from.can_transition_to(Failed));
        }
    }

    #[test]
    fn test_forbidden_transitions() {
        use QueueStatus::*;
        assert!(!Pending.can_transition_to(Paused));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Paused.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Failed.can_transition_to(Active));
    }

    #[test]
    fn test_media_kind_round_trip() {
        for kind in [
            MediaKind::Video,
            MediaKind::Audio,
            MediaKind::Caption,
            MediaKind::Thumbnail,
        ] {
            assert_eq!(MediaKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_record_progress_derives_percentage() {
        let mut item = test_item();
        item.record_progress(250, Some(1000));
        assert_eq!(item.downloaded_bytes, 250);
        assert_eq!(item.total_bytes, Some(1000));
        assert!((item.progress_pct - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_progress_without_total_keeps_percentage() {
        let mut item = test_item();
        item.record_progress(500, None);
        assert_eq!(item.downloaded_bytes, 500);
        assert_eq!(item.progress_pct, 0.0);
    }

    #[test]
    fn test_record_progress_remembers_total() {
        let mut item = test_item();
        item.record_progress(100, Some(1000));
        // Later reports may omit the total once it has been seen
        item.record_progress(500, None);
        assert_eq!(item.total_bytes, Some(1000));
        assert!((item.progress_pct - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_history_from_completed_sets_fresh_id() {
        let item = test_item();
        let record = HistoryRecord::from_completed(&item);
        assert_ne!(record.id, item.id);
        assert_eq!(record.source_id, item.source_id);
        assert_eq!(record.quality, item.quality);
    }

    #[test]
    fn test_chunk_range_end() {
        let chunk = ChunkRange::new(1000, 500);
        assert_eq!(chunk.end(), 1500);
    }

    #[test]
    fn test_contiguous_chunks() {
        let mut transfer = PartialTransfer::empty_for(&test_item());
        assert!(transfer.is_contiguous());

        transfer.chunks.push(ChunkRange::new(0, 1000));
        transfer.chunks.push(ChunkRange::new(1000, 500));
        transfer.downloaded_bytes = 1500;
        assert!(transfer.is_contiguous());
    }

    #[test]
    fn test_gap_is_not_contiguous() {
        let mut transfer = PartialTransfer::empty_for(&test_item());
        transfer.chunks.push(ChunkRange::new(0, 1000));
        transfer.chunks.push(ChunkRange::new(1100, 500));
        transfer.downloaded_bytes = 1500;
        assert!(!transfer.is_contiguous());
    }

    #[test]
    fn test_byte_count_mismatch_is_not_contiguous() {
        let mut transfer = PartialTransfer::empty_for(&test_item());
        transfer.chunks.push(ChunkRange::new(0, 1000));
        transfer.downloaded_bytes = 900;
        assert!(!transfer.is_contiguous());
    }

    #[test]
    fn test_zero_length_chunk_is_not_contiguous() {
        let mut transfer = PartialTransfer::empty_for(&test_item());
        transfer.chunks.push(ChunkRange::new(0, 0));
        transfer.downloaded_bytes = 0;
        assert!(!transfer.is_contiguous());
    }
}
