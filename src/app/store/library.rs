//! Study-library collections and tags
//!
//! User-curated groupings of saved videos. These records take no part in the
//! download lifecycle; they exist so snapshots carry the whole library, not
//! just the acquisition history.

use rusqlite::{params, OptionalExtension, Row};

use crate::app::models::{Collection, Tag};
use crate::errors::{StoreError, StoreResult};

use super::{from_unix_seconds, to_unix_seconds, MediaStore};

/// Typed handle over the `collections` collection
#[derive(Debug, Clone)]
pub struct CollectionStore {
    store: MediaStore,
}

impl CollectionStore {
    pub(super) fn new(store: MediaStore) -> Self {
        Self { store }
    }

    /// Insert or replace a collection, keyed by `id`
    pub async fn put(&self, collection: &Collection) -> StoreResult<()> {
        let video_ids = serde_json::to_string(&collection.video_ids).map_err(|e| {
            StoreError::CorruptRecord {
                collection: "collections".to_string(),
                reason: format!("video id list not encodable: {}", e),
            }
        })?;

        let conn = self.store.conn().lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO collections (id, name, video_ids, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                collection.id,
                collection.name,
                video_ids,
                to_unix_seconds(&collection.created_at),
            ],
        )?;
        Ok(())
    }

    /// Get a collection by id
    pub async fn get(&self, id: &str) -> StoreResult<Option<Collection>> {
        let conn = self.store.conn().lock().await;
        let collection = conn
            .prepare("SELECT * FROM collections WHERE id = ?1")?
            .query_row([id], Self::row_to_collection)
            .optional()?;
        Ok(collection)
    }

    /// All collections, by name
    pub async fn get_all(&self) -> StoreResult<Vec<Collection>> {
        let conn = self.store.conn().lock().await;
        let collections = conn
            .prepare("SELECT * FROM collections ORDER BY name ASC")?
            .query_map([], Self::row_to_collection)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(collections)
    }

    /// Delete a collection; returns false when the id was absent
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let conn = self.store.conn().lock().await;
        let affected = conn.execute("DELETE FROM collections WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Remove every collection; returns how many were deleted
    pub async fn clear(&self) -> StoreResult<usize> {
        let conn = self.store.conn().lock().await;
        let affected = conn.execute("DELETE FROM collections", [])?;
        Ok(affected)
    }

    fn row_to_collection(row: &Row) -> rusqlite::Result<Collection> {
        let video_ids_json: String = row.get("video_ids")?;
        let video_ids: Vec<String> = serde_json::from_str(&video_ids_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(StoreError::CorruptRecord {
                    collection: "collections".to_string(),
                    reason: format!("video id list not decodable: {}", e),
                }),
            )
        })?;

        Ok(Collection {
            id: row.get("id")?,
            name: row.get("name")?,
            video_ids,
            created_at: from_unix_seconds(row.get("created_at")?),
        })
    }
}

/// Typed handle over the `tags` collection
#[derive(Debug, Clone)]
pub struct TagStore {
    store: MediaStore,
}

impl TagStore {
    pub(super) fn new(store: MediaStore) -> Self {
        Self { store }
    }

    /// Insert or replace a tag, keyed by `id`
    pub async fn put(&self, tag: &Tag) -> StoreResult<()> {
        let conn = self.store.conn().lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO tags (id, name, color, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                tag.id,
                tag.name,
                tag.color,
                to_unix_seconds(&tag.created_at),
            ],
        )?;
        Ok(())
    }

    /// Get a tag by id
    pub async fn get(&self, id: &str) -> StoreResult<Option<Tag>> {
        let conn = self.store.conn().lock().await;
        let tag = conn
            .prepare("SELECT * FROM tags WHERE id = ?1")?
            .query_row([id], Self::row_to_tag)
            .optional()?;
        Ok(tag)
    }

    /// All tags, by name
    pub async fn get_all(&self) -> StoreResult<Vec<Tag>> {
        let conn = self.store.conn().lock().await;
        let tags = conn
            .prepare("SELECT * FROM tags ORDER BY name ASC")?
            .query_map([], Self::row_to_tag)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    /// Delete a tag; returns false when the id was absent
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let conn = self.store.conn().lock().await;
        let affected = conn.execute("DELETE FROM tags WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Remove every tag; returns how many were deleted
    pub async fn clear(&self) -> StoreResult<usize> {
        let conn = self.store.conn().lock().await;
        let affected = conn.execute("DELETE FROM tags", [])?;
        Ok(affected)
    }

    fn row_to_tag(row: &Row) -> rusqlite::Result<Tag> {
        Ok(Tag {
            id: row.get("id")?,
            name: row.get("name")?,
            color: row.get("color")?,
            created_at: from_unix_seconds(row.get("created_at")?),
        })
    }
}
