//! Snapshot round-trip through an actual file
//!
//! Exports a populated library to disk, imports it into a fresh store, and
//! checks the record counts and contents match.

use tempfile::tempdir;

use tube_fetcher::app::models::{Collection, NamingTemplate, Tag};
use tube_fetcher::app::queue::{EnqueueRequest, QueueManager};
use tube_fetcher::app::snapshot::{self, Snapshot};
use tube_fetcher::app::{MediaKind, MediaStore};

async fn complete_one(queue: &QueueManager, source_id: &str) {
    let request = EnqueueRequest::new(
        source_id,
        format!("https://example.com/watch?v={}", source_id),
        "Control Theory 3",
        "720p",
        "mp4",
        MediaKind::Video,
        "22",
    );
    let id = queue.enqueue(request, false).await.unwrap();
    queue.mark_started(&id).await.unwrap();
    queue.mark_completed(&id).await.unwrap();
}

#[tokio::test]
async fn snapshot_file_round_trip_reproduces_the_library() {
    let source = MediaStore::in_memory().unwrap();
    let queue = QueueManager::new(source.clone());

    complete_one(&queue, "abc").await;
    complete_one(&queue, "def").await;
    complete_one(&queue, "ghi").await;

    source
        .collections()
        .put(&Collection::new(
            "Finals week",
            vec!["abc".to_string(), "def".to_string()],
        ))
        .await
        .unwrap();
    source
        .tags()
        .put(&Tag::new("engineering", None))
        .await
        .unwrap();
    source
        .tags()
        .put(&Tag::new("revision", Some("#3366ff".to_string())))
        .await
        .unwrap();
    let template = NamingTemplate::new("dated", "{date} {title}.{format}");
    source.templates().put(&template).await.unwrap();
    source.templates().set_default(&template.id).await.unwrap();

    // Export through a real file
    let dir = tempdir().unwrap();
    let path = dir.path().join("library-snapshot.json");
    let exported = snapshot::export(&source).await.unwrap();
    tokio::fs::write(&path, exported.to_json().unwrap())
        .await
        .unwrap();

    // Import into an empty store
    let json = tokio::fs::read_to_string(&path).await.unwrap();
    let parsed = Snapshot::from_json(&json).unwrap();
    let target = MediaStore::in_memory().unwrap();
    let report = snapshot::import(&target, &parsed).await.unwrap();

    assert_eq!(report.history, 3);
    assert_eq!(report.collections, 1);
    assert_eq!(report.tags, 2);
    assert_eq!(report.templates, 1);

    // Contents survive, including the default flag and dedup behavior
    let restored = target.templates().get_default().await.unwrap().unwrap();
    assert_eq!(restored.name, "dated");

    let restored_queue = QueueManager::new(target.clone());
    let duplicate = restored_queue
        .enqueue(
            EnqueueRequest::new(
                "abc",
                "https://example.com/watch?v=abc",
                "Control Theory 3",
                "720p",
                "mp4",
                MediaKind::Video,
                "22",
            ),
            false,
        )
        .await;
    assert!(duplicate.is_err());
}
