//! Persistent store for the download library
//!
//! A versioned, durable, SQLite-backed database owning every record
//! collection in the system: acquisition history, the job queue, resume
//! checkpoints, naming templates, and the study-library collections/tags.
//! Callers receive value copies of records and write changes back through the
//! collection APIs; no component holds an authoritative copy outside the
//! store.
//!
//! The handle is explicitly constructed and passed to the components that
//! need it; cloning is cheap and shares the underlying connection.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tube_fetcher::app::store::MediaStore;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MediaStore::open(Path::new("library.db")).await?;
//! let completed = store.history().get_all().await?;
//! println!("{} completed downloads", completed.len());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::{StoreError, StoreResult};

mod history;
mod library;
mod queue;
mod schema;
mod templates;
mod transfers;

pub use history::HistoryStore;
pub use library::{CollectionStore, TagStore};
pub use queue::QueueStore;
pub use schema::{current_version, SCHEMA_VERSIONS};
pub use templates::TemplateStore;
pub use transfers::TransferStore;

/// Handle to the persistent download library
///
/// All writes are durable before the issuing call returns: the connection
/// runs WAL journaling with `synchronous=FULL`, so there is no deferred
/// write-behind for callers to reason about.
#[derive(Debug, Clone)]
pub struct MediaStore {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl MediaStore {
    /// Open (and if necessary create or migrate) the database at `db_path`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` when the file or its parent
    /// directory cannot be initialized, `StoreError::VersionTooNew` when the
    /// database was written by a newer release, and `StoreError::Migration`
    /// when a schema upgrade step fails.
    pub async fn open(db_path: &Path) -> StoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Unavailable {
                    path: parent.to_path_buf(),
                    reason: e.to_string(),
                })?;
                debug!("Created data directory: {}", parent.display());
            }
        }

        let mut conn = Connection::open(db_path).map_err(|e| StoreError::Unavailable {
            path: db_path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::apply_pragmas(&conn)?;
        schema::create_or_migrate(&mut conn)?;

        info!(
            "Opened media store at {} (schema version {})",
            db_path.display(),
            schema::current_version()
        );

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: db_path.to_path_buf(),
        })
    }

    /// Create a store backed by an in-memory database
    ///
    /// Nothing persists beyond the handle; intended for tests and dry runs.
    pub fn in_memory() -> StoreResult<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::create_or_migrate(&mut conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: PathBuf::from(":memory:"),
        })
    }

    fn apply_pragmas(conn: &Connection) -> StoreResult<()> {
        // journal_mode reports the resulting mode, so it needs the checked form
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        // FULL keeps a returned write durable across power loss even in WAL
        conn.pragma_update(None, "synchronous", "FULL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    }

    /// Path of the backing database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Completed-acquisition collection
    pub fn history(&self) -> HistoryStore {
        HistoryStore::new(self.clone())
    }

    /// Job queue collection
    pub fn queue(&self) -> QueueStore {
        QueueStore::new(self.clone())
    }

    /// Resume checkpoint collection
    pub fn transfers(&self) -> TransferStore {
        TransferStore::new(self.clone())
    }

    /// Naming template collection
    pub fn templates(&self) -> TemplateStore {
        TemplateStore::new(self.clone())
    }

    /// Study-library collection records
    pub fn collections(&self) -> CollectionStore {
        CollectionStore::new(self.clone())
    }

    /// Study-library tag records
    pub fn tags(&self) -> TagStore {
        TagStore::new(self.clone())
    }

    pub(crate) fn conn(&self) -> &Arc<Mutex<Connection>> {
        &self.conn
    }
}

/// Convert a timestamp to its column form (Unix seconds)
pub(crate) fn to_unix_seconds(timestamp: &DateTime<Utc>) -> i64 {
    timestamp.timestamp()
}

/// Convert a column value (Unix seconds) back to a timestamp
pub(crate) fn from_unix_seconds(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_else(Utc::now)
}
