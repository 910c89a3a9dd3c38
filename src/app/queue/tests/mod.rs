//! State machine tests for the queue manager
//!
//! These exercise every lifecycle transition against an in-memory store,
//! including the crash-recovery and idempotency rules.

use chrono::Utc;

use crate::app::models::{ChunkRange, MediaKind, QueueStatus};
use crate::app::queue::{EnqueueRequest, QueueManager};
use crate::app::store::MediaStore;
use crate::errors::QueueError;

fn request(source_id: &str, quality: &str) -> EnqueueRequest {
    EnqueueRequest::new(
        source_id,
        format!("https://example.com/watch?v={}", source_id),
        "Microeconomics 4",
        quality,
        "mp4",
        MediaKind::Video,
        "22",
    )
}

fn manager() -> (MediaStore, QueueManager) {
    let store = MediaStore::in_memory().unwrap();
    let queue = QueueManager::new(store.clone());
    (store, queue)
}

#[tokio::test]
async fn test_enqueue_returns_pending_job() {
    let (_store, queue) = manager();

    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();
    let item = queue.get(&id).await.unwrap().unwrap();

    assert_eq!(item.status, QueueStatus::Pending);
    assert_eq!(item.source_id, "abc");
    assert!(item.error.is_none());
}

#[tokio::test]
async fn test_enqueue_duplicate_after_completion_is_rejected() {
    let (_store, queue) = manager();

    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();
    queue.mark_started(&id).await.unwrap();
    queue.mark_completed(&id).await.unwrap();

    let result = queue.enqueue(request("abc", "720p"), false).await;
    assert!(matches!(result, Err(QueueError::DuplicateJob { .. })));
}

#[tokio::test]
async fn test_enqueue_different_quality_is_not_a_duplicate() {
    let (_store, queue) = manager();

    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();
    queue.mark_started(&id).await.unwrap();
    queue.mark_completed(&id).await.unwrap();

    assert!(queue.enqueue(request("abc", "1080p"), false).await.is_ok());
}

#[tokio::test]
async fn test_forced_enqueue_overrides_duplicate_check() {
    let (_store, queue) = manager();

    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();
    queue.mark_started(&id).await.unwrap();
    queue.mark_completed(&id).await.unwrap();

    assert!(queue.enqueue(request("abc", "720p"), true).await.is_ok());
}

#[tokio::test]
async fn test_progress_updates_only_active_jobs() {
    let (_store, queue) = manager();
    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();

    // Pending: report is dropped, not an error
    queue.update_progress(&id, 100, Some(1000)).await.unwrap();
    let item = queue.get(&id).await.unwrap().unwrap();
    assert_eq!(item.downloaded_bytes, 0);

    queue.mark_started(&id).await.unwrap();
    queue.update_progress(&id, 250, Some(1000)).await.unwrap();
    let item = queue.get(&id).await.unwrap().unwrap();
    assert_eq!(item.downloaded_bytes, 250);
    assert!((item.progress_pct - 25.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_progress_cannot_exceed_total() {
    let (_store, queue) = manager();
    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();
    queue.mark_started(&id).await.unwrap();

    let result = queue.update_progress(&id, 2000, Some(1000)).await;
    assert!(matches!(
        result,
        Err(QueueError::ProgressExceedsTotal { .. })
    ));
}

#[tokio::test]
async fn test_progress_for_unknown_job_is_an_error() {
    let (_store, queue) = manager();
    let result = queue.update_progress("ghost", 10, None).await;
    assert!(matches!(result, Err(QueueError::NotFound { .. })));
}

#[tokio::test]
async fn test_interrupt_pauses_and_creates_checkpoint() {
    let (store, queue) = manager();
    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();
    queue.mark_started(&id).await.unwrap();

    queue.mark_interrupted(&id).await.unwrap();

    let item = queue.get(&id).await.unwrap().unwrap();
    assert_eq!(item.status, QueueStatus::Paused);
    assert!(store.transfers().get(&id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_interrupt_requires_active_status() {
    let (_store, queue) = manager();
    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();

    let result = queue.mark_interrupted(&id).await;
    assert!(matches!(result, Err(QueueError::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_resume_reports_checkpointed_offset() {
    let (_store, queue) = manager();
    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();
    queue.mark_started(&id).await.unwrap();
    queue
        .tracker()
        .checkpoint(&id, ChunkRange::new(0, 1000))
        .await
        .unwrap();
    queue.mark_interrupted(&id).await.unwrap();

    let offset = queue.resume(&id).await.unwrap();
    assert_eq!(offset, 1000);
    let item = queue.get(&id).await.unwrap().unwrap();
    assert_eq!(item.status, QueueStatus::Active);

    // Contiguity is still enforced after the resume
    assert!(queue
        .tracker()
        .checkpoint(&id, ChunkRange::new(1000, 500))
        .await
        .is_ok());
    assert!(queue
        .tracker()
        .checkpoint(&id, ChunkRange::new(900, 100))
        .await
        .is_err());
}

#[tokio::test]
async fn test_completion_promotes_to_history() {
    let (store, queue) = manager();
    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();
    queue.mark_started(&id).await.unwrap();
    queue
        .tracker()
        .checkpoint(&id, ChunkRange::new(0, 1000))
        .await
        .unwrap();

    queue.mark_completed(&id).await.unwrap();

    // Row and checkpoint are gone; history has the acquisition
    assert!(store.queue().get(&id).await.unwrap().is_none());
    assert!(store.transfers().get(&id).await.unwrap().is_none());
    let recorded = store
        .history()
        .find_acquisition("abc", "720p", "mp4")
        .await
        .unwrap();
    assert!(recorded.is_some());
    assert_eq!(recorded.unwrap().title, "Microeconomics 4");
}

#[tokio::test]
async fn test_mark_completed_is_idempotent() {
    let (store, queue) = manager();
    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();
    queue.mark_started(&id).await.unwrap();

    queue.mark_completed(&id).await.unwrap();
    queue.mark_completed(&id).await.unwrap();

    assert_eq!(store.history().get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_stale_completed_row_is_swept_by_readers() {
    let (store, queue) = manager();
    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();
    queue.mark_started(&id).await.unwrap();
    queue.mark_completed(&id).await.unwrap();

    // Simulate the crash window: resurrect the queue row after the history
    // write, as if the delete never happened
    let mut stale = request("abc", "720p").into_item();
    stale.id = id.clone();
    stale.status = QueueStatus::Completed;
    stale.enqueued_at = Utc::now();
    store.queue().put(&stale).await.unwrap();

    // Any reader drops the stale row; history remains the single record
    assert!(queue.get(&id).await.unwrap().is_none());
    assert!(store.queue().get(&id).await.unwrap().is_none());
    assert_eq!(store.history().get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_half_promoted_row_finishes_on_next_call() {
    let (store, queue) = manager();
    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();
    queue.mark_started(&id).await.unwrap();

    // Simulate a crash after the status flip but before the history write
    let mut item = store.queue().get(&id).await.unwrap().unwrap();
    item.status = QueueStatus::Completed;
    store.queue().put(&item).await.unwrap();

    queue.mark_completed(&id).await.unwrap();

    assert!(store.queue().get(&id).await.unwrap().is_none());
    assert_eq!(store.history().get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failure_keeps_row_with_error() {
    let (_store, queue) = manager();
    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();
    queue.mark_started(&id).await.unwrap();

    queue.mark_failed(&id, "HTTP 403 from origin").await.unwrap();

    let item = queue.get(&id).await.unwrap().unwrap();
    assert_eq!(item.status, QueueStatus::Failed);
    assert_eq!(item.error.as_deref(), Some("HTTP 403 from origin"));
}

#[tokio::test]
async fn test_failure_allowed_from_pending_active_and_paused() {
    let (_store, queue) = manager();

    for setup in 0..3 {
        let id = queue
            .enqueue(request(&format!("src{}", setup), "720p"), false)
            .await
            .unwrap();
        if setup >= 1 {
            queue.mark_started(&id).await.unwrap();
        }
        if setup >= 2 {
            queue.mark_interrupted(&id).await.unwrap();
        }
        queue.mark_failed(&id, "boom").await.unwrap();
        let item = queue.get(&id).await.unwrap().unwrap();
        assert_eq!(item.status, QueueStatus::Failed);
    }
}

#[tokio::test]
async fn test_retry_requeues_and_clears_error() {
    let (_store, queue) = manager();
    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();
    queue.mark_started(&id).await.unwrap();
    queue.mark_failed(&id, "timeout").await.unwrap();

    queue.retry(&id).await.unwrap();

    let item = queue.get(&id).await.unwrap().unwrap();
    assert_eq!(item.status, QueueStatus::Pending);
    assert!(item.error.is_none());
}

#[tokio::test]
async fn test_retry_requires_failed_status() {
    let (_store, queue) = manager();
    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();

    let result = queue.retry(&id).await;
    assert!(matches!(result, Err(QueueError::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_cancel_removes_job_and_checkpoint() {
    let (store, queue) = manager();
    let id = queue.enqueue(request("abc", "720p"), false).await.unwrap();
    queue.mark_started(&id).await.unwrap();
    queue
        .tracker()
        .checkpoint(&id, ChunkRange::new(0, 512))
        .await
        .unwrap();

    queue.cancel(&id).await.unwrap();

    assert!(store.queue().get(&id).await.unwrap().is_none());
    assert!(store.transfers().get(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cancel_missing_job_is_noop() {
    let (_store, queue) = manager();
    queue.cancel("ghost").await.unwrap();
}

#[tokio::test]
async fn test_list_by_status_orders_by_enqueue_time() {
    let (store, queue) = manager();

    let first = queue.enqueue(request("a", "720p"), false).await.unwrap();
    let second = queue.enqueue(request("b", "720p"), false).await.unwrap();
    let third = queue.enqueue(request("c", "720p"), false).await.unwrap();
    queue.mark_started(&second).await.unwrap();

    // Make the enqueue order unambiguous at one-second column resolution
    for (id, seconds_ago) in [(&first, 30i64), (&third, 10i64)] {
        let mut item = store.queue().get(id).await.unwrap().unwrap();
        item.enqueued_at = Utc::now() - chrono::Duration::seconds(seconds_ago);
        store.queue().put(&item).await.unwrap();
    }

    let pending = queue.list_by_status(QueueStatus::Pending).await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].id, first);
    assert_eq!(pending[1].id, third);

    let active = queue.list_by_status(QueueStatus::Active).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second);
}
