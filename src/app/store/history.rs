//! Completed-acquisition collection
//!
//! History is the durable record of finished downloads and the authority for
//! duplicate detection: an acquisition identified by
//! `(source_id, quality, format)` that appears here is already on disk.

use rusqlite::{params, OptionalExtension, Row};

use crate::app::models::HistoryRecord;
use crate::errors::StoreResult;

use super::{from_unix_seconds, to_unix_seconds, MediaStore};

/// Typed handle over the `history` collection
#[derive(Debug, Clone)]
pub struct HistoryStore {
    store: MediaStore,
}

impl HistoryStore {
    pub(super) fn new(store: MediaStore) -> Self {
        Self { store }
    }

    /// Insert or replace a record, keyed by `id`
    pub async fn put(&self, record: &HistoryRecord) -> StoreResult<()> {
        let conn = self.store.conn().lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO history
                (id, source_id, title, thumbnail_ref, quality, format, completed_at, size_bytes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.id,
                record.source_id,
                record.title,
                record.thumbnail_ref,
                record.quality,
                record.format,
                to_unix_seconds(&record.completed_at),
                record.size_bytes.map(|b| b as i64),
            ],
        )?;
        Ok(())
    }

    /// Get a record by id
    pub async fn get(&self, id: &str) -> StoreResult<Option<HistoryRecord>> {
        let conn = self.store.conn().lock().await;
        let record = conn
            .prepare("SELECT * FROM history WHERE id = ?1")?
            .query_row([id], Self::row_to_record)
            .optional()?;
        Ok(record)
    }

    /// All records, most recently completed first
    pub async fn get_all(&self) -> StoreResult<Vec<HistoryRecord>> {
        let conn = self.store.conn().lock().await;
        let records = conn
            .prepare("SELECT * FROM history ORDER BY completed_at DESC")?
            .query_map([], Self::row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// All acquisitions of one source item (an item may have been downloaded
    /// at several qualities)
    pub async fn get_all_by_source(&self, source_id: &str) -> StoreResult<Vec<HistoryRecord>> {
        let conn = self.store.conn().lock().await;
        let records = conn
            .prepare("SELECT * FROM history WHERE source_id = ?1 ORDER BY completed_at DESC")?
            .query_map([source_id], Self::row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Look up a specific acquisition for duplicate detection
    pub async fn find_acquisition(
        &self,
        source_id: &str,
        quality: &str,
        format: &str,
    ) -> StoreResult<Option<HistoryRecord>> {
        let conn = self.store.conn().lock().await;
        let record = conn
            .prepare(
                "SELECT * FROM history
                 WHERE source_id = ?1 AND quality = ?2 AND format = ?3
                 ORDER BY completed_at DESC
                 LIMIT 1",
            )?
            .query_row(params![source_id, quality, format], Self::row_to_record)
            .optional()?;
        Ok(record)
    }

    /// Delete a record; returns false when the id was absent
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let conn = self.store.conn().lock().await;
        let affected = conn.execute("DELETE FROM history WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Remove every record; returns how many were deleted
    pub async fn clear(&self) -> StoreResult<usize> {
        let conn = self.store.conn().lock().await;
        let affected = conn.execute("DELETE FROM history", [])?;
        Ok(affected)
    }

    fn row_to_record(row: &Row) -> rusqlite::Result<HistoryRecord> {
        Ok(HistoryRecord {
            id: row.get("id")?,
            source_id: row.get("source_id")?,
            title: row.get("title")?,
            thumbnail_ref: row.get("thumbnail_ref")?,
            quality: row.get("quality")?,
            format: row.get("format")?,
            completed_at: from_unix_seconds(row.get("completed_at")?),
            size_bytes: row.get::<_, Option<i64>>("size_bytes")?.map(|b| b as u64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(source_id: &str, quality: &str) -> HistoryRecord {
        HistoryRecord {
            id: Uuid::new_v4().to_string(),
            source_id: source_id.to_string(),
            title: "Linear Algebra 3".to_string(),
            thumbnail_ref: Some("thumbs/abc.jpg".to_string()),
            quality: quality.to_string(),
            format: "mp4".to_string(),
            completed_at: Utc::now(),
            size_bytes: Some(1024),
        }
    }

    #[tokio::test]
    async fn test_put_and_get_round_trip() {
        let store = MediaStore::in_memory().unwrap();
        let rec = record("abc", "720p");

        store.history().put(&rec).await.unwrap();
        let loaded = store.history().get(&rec.id).await.unwrap().unwrap();

        assert_eq!(loaded.source_id, rec.source_id);
        assert_eq!(loaded.quality, rec.quality);
        assert_eq!(loaded.size_bytes, Some(1024));
    }

    #[tokio::test]
    async fn test_find_acquisition_matches_exact_triple() {
        let store = MediaStore::in_memory().unwrap();
        store.history().put(&record("abc", "720p")).await.unwrap();

        let history = store.history();
        assert!(history
            .find_acquisition("abc", "720p", "mp4")
            .await
            .unwrap()
            .is_some());
        assert!(history
            .find_acquisition("abc", "1080p", "mp4")
            .await
            .unwrap()
            .is_none());
        assert!(history
            .find_acquisition("abc", "720p", "webm")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_same_source_at_two_qualities() {
        let store = MediaStore::in_memory().unwrap();
        store.history().put(&record("abc", "720p")).await.unwrap();
        store.history().put(&record("abc", "1080p")).await.unwrap();

        let records = store.history().get_all_by_source("abc").await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = MediaStore::in_memory().unwrap();
        assert!(!store.history().delete("nonexistent").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_reports_count() {
        let store = MediaStore::in_memory().unwrap();
        store.history().put(&record("a", "720p")).await.unwrap();
        store.history().put(&record("b", "720p")).await.unwrap();

        assert_eq!(store.history().clear().await.unwrap(), 2);
        assert!(store.history().get_all().await.unwrap().is_empty());
    }
}
