//! Job queue collection
//!
//! Raw CRUD over queue rows. Lifecycle rules (which transitions are legal,
//! duplicate detection, promotion to history) live in the queue manager; this
//! layer only persists what it is given.

use rusqlite::{params, OptionalExtension, Row};

use crate::app::models::{MediaKind, QueueItem, QueueStatus};
use crate::errors::{StoreError, StoreResult};

use super::{from_unix_seconds, to_unix_seconds, MediaStore};

/// Typed handle over the `queue` collection
#[derive(Debug, Clone)]
pub struct QueueStore {
    store: MediaStore,
}

impl QueueStore {
    pub(super) fn new(store: MediaStore) -> Self {
        Self { store }
    }

    /// Insert or replace an item, keyed by `id`
    pub async fn put(&self, item: &QueueItem) -> StoreResult<()> {
        let conn = self.store.conn().lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO queue
                (id, source_id, source_ref, title, thumbnail_ref, quality, format, kind,
                 status, progress_pct, downloaded_bytes, total_bytes, transfer_format_id,
                 enqueued_at, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                item.id,
                item.source_id,
                item.source_ref,
                item.title,
                item.thumbnail_ref,
                item.quality,
                item.format,
                item.kind.as_str(),
                item.status.as_str(),
                item.progress_pct,
                item.downloaded_bytes as i64,
                item.total_bytes.map(|b| b as i64),
                item.transfer_format_id,
                to_unix_seconds(&item.enqueued_at),
                item.error,
            ],
        )?;
        Ok(())
    }

    /// Get an item by id
    pub async fn get(&self, id: &str) -> StoreResult<Option<QueueItem>> {
        let conn = self.store.conn().lock().await;
        let item = conn
            .prepare("SELECT * FROM queue WHERE id = ?1")?
            .query_row([id], Self::row_to_item)
            .optional()?;
        Ok(item)
    }

    /// All items, oldest enqueued first
    pub async fn get_all(&self) -> StoreResult<Vec<QueueItem>> {
        let conn = self.store.conn().lock().await;
        let items = conn
            .prepare("SELECT * FROM queue ORDER BY enqueued_at ASC")?
            .query_map([], Self::row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Items in one lifecycle status, oldest enqueued first
    pub async fn get_all_by_status(&self, status: QueueStatus) -> StoreResult<Vec<QueueItem>> {
        let conn = self.store.conn().lock().await;
        let items = conn
            .prepare("SELECT * FROM queue WHERE status = ?1 ORDER BY enqueued_at ASC")?
            .query_map([status.as_str()], Self::row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Items tracking one source item
    pub async fn get_all_by_source(&self, source_id: &str) -> StoreResult<Vec<QueueItem>> {
        let conn = self.store.conn().lock().await;
        let items = conn
            .prepare("SELECT * FROM queue WHERE source_id = ?1 ORDER BY enqueued_at ASC")?
            .query_map([source_id], Self::row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Delete an item; returns false when the id was absent
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let conn = self.store.conn().lock().await;
        let affected = conn.execute("DELETE FROM queue WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Remove every item; returns how many were deleted
    pub async fn clear(&self) -> StoreResult<usize> {
        let conn = self.store.conn().lock().await;
        let affected = conn.execute("DELETE FROM queue", [])?;
        Ok(affected)
    }

    fn row_to_item(row: &Row) -> rusqlite::Result<QueueItem> {
        let kind_text: String = row.get("kind")?;
        let status_text: String = row.get("status")?;
        Ok(QueueItem {
            id: row.get("id")?,
            source_id: row.get("source_id")?,
            source_ref: row.get("source_ref")?,
            title: row.get("title")?,
            thumbnail_ref: row.get("thumbnail_ref")?,
            quality: row.get("quality")?,
            format: row.get("format")?,
            kind: MediaKind::parse(&kind_text).ok_or_else(|| decode_error("kind", &kind_text))?,
            status: QueueStatus::parse(&status_text)
                .ok_or_else(|| decode_error("status", &status_text))?,
            progress_pct: row.get("progress_pct")?,
            downloaded_bytes: row.get::<_, i64>("downloaded_bytes")? as u64,
            total_bytes: row.get::<_, Option<i64>>("total_bytes")?.map(|b| b as u64),
            transfer_format_id: row.get("transfer_format_id")?,
            enqueued_at: from_unix_seconds(row.get("enqueued_at")?),
            error: row.get("error")?,
        })
    }
}

fn decode_error(column: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(StoreError::CorruptRecord {
            collection: "queue".to_string(),
            reason: format!("unrecognized {} value: {}", column, value),
        }),
    )
}
