//! Versioned schema for the persistent store
//!
//! The database carries its schema version in `PRAGMA user_version`, offset by
//! `BASE_USER_VERSION` so a foreign SQLite file is never mistaken for one of
//! ours. Opening a database at an older version applies the missing steps in
//! order; each step only adds collections or indices and never rewrites rows
//! in collections it does not touch.

use rusqlite::Connection;
use tracing::info;

use crate::constants::store::BASE_USER_VERSION;
use crate::errors::{StoreError, StoreResult};

/// One schema step: the statements that bring a database from the previous
/// version to this one
pub struct SchemaVersion {
    /// Version this step produces (1-based, contiguous)
    pub version: usize,
    /// DDL applied inside a single transaction
    pub statements: &'static [&'static str],
}

/// Ordered schema history. New steps are appended, never edited: a released
/// step has already been applied to databases in the field.
pub const SCHEMA_VERSIONS: &[SchemaVersion] = &[
    SchemaVersion {
        version: 1,
        statements: &[
            "CREATE TABLE history (
                id TEXT PRIMARY KEY,
                source_id TEXT NOT NULL,
                title TEXT NOT NULL,
                thumbnail_ref TEXT,
                quality TEXT NOT NULL,
                format TEXT NOT NULL,
                completed_at INTEGER NOT NULL,
                size_bytes INTEGER
            )",
            "CREATE INDEX idx_history_source ON history(source_id)",
            "CREATE INDEX idx_history_acquisition ON history(source_id, quality, format)",
            "CREATE TABLE queue (
                id TEXT PRIMARY KEY,
                source_id TEXT NOT NULL,
                source_ref TEXT NOT NULL,
                title TEXT NOT NULL,
                thumbnail_ref TEXT,
                quality TEXT NOT NULL,
                format TEXT NOT NULL,
                kind TEXT NOT NULL,
                status TEXT NOT NULL,
                progress_pct REAL NOT NULL DEFAULT 0,
                downloaded_bytes INTEGER NOT NULL DEFAULT 0,
                total_bytes INTEGER,
                transfer_format_id TEXT NOT NULL,
                enqueued_at INTEGER NOT NULL,
                error TEXT
            )",
            "CREATE INDEX idx_queue_status ON queue(status)",
            "CREATE INDEX idx_queue_source ON queue(source_id)",
            "CREATE TABLE partial_transfers (
                id TEXT PRIMARY KEY,
                source_id TEXT NOT NULL,
                transfer_format_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                downloaded_bytes INTEGER NOT NULL DEFAULT 0,
                total_bytes INTEGER,
                chunks TEXT NOT NULL,
                last_updated INTEGER NOT NULL
            )",
            "CREATE INDEX idx_transfers_source ON partial_transfers(source_id)",
            "CREATE TABLE naming_templates (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                template TEXT NOT NULL,
                is_default INTEGER NOT NULL DEFAULT 0
            )",
        ],
    },
    SchemaVersion {
        version: 2,
        statements: &[
            "CREATE TABLE collections (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                video_ids TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            "CREATE TABLE tags (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                color TEXT,
                created_at INTEGER NOT NULL
            )",
            "CREATE INDEX idx_tags_name ON tags(name)",
        ],
    },
];

/// Latest schema version this binary understands
pub fn current_version() -> usize {
    SCHEMA_VERSIONS
        .last()
        .map(|schema| schema.version)
        .unwrap_or(0)
}

/// Read the schema version stored in the database
///
/// Returns 0 for a fresh database. Fails when the file carries a user_version
/// that is not ours, or one written by a newer release.
fn stored_version(conn: &Connection) -> StoreResult<usize> {
    let raw: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if raw == 0 {
        return Ok(0);
    }

    let raw = raw as usize;
    if raw < BASE_USER_VERSION {
        return Err(StoreError::CorruptRecord {
            collection: "schema".to_string(),
            reason: format!("user_version {} does not carry the expected base", raw),
        });
    }

    let version = raw - BASE_USER_VERSION;
    if version > current_version() {
        return Err(StoreError::VersionTooNew {
            found: version,
            supported: current_version(),
        });
    }
    Ok(version)
}

/// Create or upgrade the schema in place
///
/// Each missing step runs inside its own transaction together with its
/// user_version bump, so a failure leaves the database at the last fully
/// applied version with all of its records intact.
pub fn create_or_migrate(conn: &mut Connection) -> StoreResult<()> {
    let from = stored_version(conn)?;
    let to = current_version();
    if from == to {
        return Ok(());
    }

    if from == 0 {
        info!("Creating new database schema at version {}", to);
    } else {
        info!("Migrating database schema from version {} to {}", from, to);
    }

    for schema in SCHEMA_VERSIONS.iter().filter(|s| s.version > from) {
        apply_step(conn, schema).map_err(|e| StoreError::Migration {
            from,
            to: schema.version,
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

fn apply_step(conn: &mut Connection, schema: &SchemaVersion) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    for statement in schema.statements {
        tx.execute(statement, [])?;
    }
    tx.pragma_update(
        None,
        "user_version",
        (BASE_USER_VERSION + schema.version) as i64,
    )?;
    tx.commit()
}
