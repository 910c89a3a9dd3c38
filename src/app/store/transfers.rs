//! Resume checkpoint collection
//!
//! One row per interrupted job, keyed by the job id. The chunk list is stored
//! as a JSON column; a row whose chunk list cannot be decoded is reported as
//! corrupt rather than silently skipped, so the tracker can delete it.

use rusqlite::{params, OptionalExtension, Row};

use crate::app::models::{ChunkRange, MediaKind, PartialTransfer};
use crate::errors::{StoreError, StoreResult};

use super::{from_unix_seconds, to_unix_seconds, MediaStore};

/// Typed handle over the `partial_transfers` collection
#[derive(Debug, Clone)]
pub struct TransferStore {
    store: MediaStore,
}

impl TransferStore {
    pub(super) fn new(store: MediaStore) -> Self {
        Self { store }
    }

    /// Insert or replace a checkpoint, keyed by the job id
    pub async fn put(&self, transfer: &PartialTransfer) -> StoreResult<()> {
        let chunks = serde_json::to_string(&transfer.chunks).map_err(|e| {
            StoreError::CorruptRecord {
                collection: "partial_transfers".to_string(),
                reason: format!("chunk list not encodable: {}", e),
            }
        })?;

        let conn = self.store.conn().lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO partial_transfers
                (id, source_id, transfer_format_id, kind, downloaded_bytes, total_bytes,
                 chunks, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                transfer.id,
                transfer.source_id,
                transfer.transfer_format_id,
                transfer.kind.as_str(),
                transfer.downloaded_bytes as i64,
                transfer.total_bytes.map(|b| b as i64),
                chunks,
                to_unix_seconds(&transfer.last_updated),
            ],
        )?;
        Ok(())
    }

    /// Get a checkpoint by job id
    pub async fn get(&self, id: &str) -> StoreResult<Option<PartialTransfer>> {
        let conn = self.store.conn().lock().await;
        let transfer = conn
            .prepare("SELECT * FROM partial_transfers WHERE id = ?1")?
            .query_row([id], Self::row_to_transfer)
            .optional()?;
        Ok(transfer)
    }

    /// All checkpoints, most recently touched first
    pub async fn get_all(&self) -> StoreResult<Vec<PartialTransfer>> {
        let conn = self.store.conn().lock().await;
        let transfers = conn
            .prepare("SELECT * FROM partial_transfers ORDER BY last_updated DESC")?
            .query_map([], Self::row_to_transfer)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(transfers)
    }

    /// Checkpoints tracking one source item
    pub async fn get_all_by_source(&self, source_id: &str) -> StoreResult<Vec<PartialTransfer>> {
        let conn = self.store.conn().lock().await;
        let transfers = conn
            .prepare(
                "SELECT * FROM partial_transfers WHERE source_id = ?1 ORDER BY last_updated DESC",
            )?
            .query_map([source_id], Self::row_to_transfer)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(transfers)
    }

    /// Delete a checkpoint; returns false when the id was absent
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let conn = self.store.conn().lock().await;
        let affected = conn.execute("DELETE FROM partial_transfers WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Remove every checkpoint; returns how many were deleted
    pub async fn clear(&self) -> StoreResult<usize> {
        let conn = self.store.conn().lock().await;
        let affected = conn.execute("DELETE FROM partial_transfers", [])?;
        Ok(affected)
    }

    fn row_to_transfer(row: &Row) -> rusqlite::Result<PartialTransfer> {
        let kind_text: String = row.get("kind")?;
        let chunks_json: String = row.get("chunks")?;
        let chunks: Vec<ChunkRange> = serde_json::from_str(&chunks_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(StoreError::CorruptRecord {
                    collection: "partial_transfers".to_string(),
                    reason: format!("chunk list not decodable: {}", e),
                }),
            )
        })?;

        Ok(PartialTransfer {
            id: row.get("id")?,
            source_id: row.get("source_id")?,
            transfer_format_id: row.get("transfer_format_id")?,
            kind: MediaKind::parse(&kind_text).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(StoreError::CorruptRecord {
                        collection: "partial_transfers".to_string(),
                        reason: format!("unrecognized kind value: {}", kind_text),
                    }),
                )
            })?,
            downloaded_bytes: row.get::<_, i64>("downloaded_bytes")? as u64,
            total_bytes: row.get::<_, Option<i64>>("total_bytes")?.map(|b| b as u64),
            chunks,
            last_updated: from_unix_seconds(row.get("last_updated")?),
        })
    }
}
