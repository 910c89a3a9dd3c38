//! Export and import of durable library state
//!
//! A snapshot is a schema-versioned JSON document carrying everything worth
//! moving between devices: acquisition history, study-library collections
//! and tags, and naming templates. In-flight queue rows and resume
//! checkpoints are machine-local and deliberately excluded.
//!
//! Import upserts by record id, so re-importing a snapshot (or importing on
//! top of overlapping data) never fails on individual conflicts; the caller
//! gets back a count of what was written per kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::models::{Collection, HistoryRecord, NamingTemplate, Tag};
use crate::app::store::MediaStore;
use crate::errors::{SnapshotError, SnapshotResult};

/// Version stamped into every exported document
pub const SNAPSHOT_VERSION: u32 = 1;

/// Full-state snapshot of the durable library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Document format version
    pub schema_version: u32,
    /// When the export was taken
    pub exported_at: DateTime<Utc>,
    /// Completed acquisitions
    pub history: Vec<HistoryRecord>,
    /// Study-library collections
    pub collections: Vec<Collection>,
    /// Study-library tags
    pub tags: Vec<Tag>,
    /// Naming templates
    pub templates: Vec<NamingTemplate>,
}

impl Snapshot {
    /// Serialize to a pretty JSON document
    pub fn to_json(&self) -> SnapshotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a JSON document, rejecting versions newer than this release
    pub fn from_json(json: &str) -> SnapshotResult<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        if snapshot.schema_version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.schema_version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}

/// How many records an import wrote, per kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// History records written
    pub history: usize,
    /// Collections written
    pub collections: usize,
    /// Tags written
    pub tags: usize,
    /// Naming templates written
    pub templates: usize,
}

impl ImportReport {
    /// Total records written across all kinds
    pub fn total(&self) -> usize {
        self.history + self.collections + self.tags + self.templates
    }
}

/// Export the full durable state of the store
pub async fn export(store: &MediaStore) -> SnapshotResult<Snapshot> {
    let snapshot = Snapshot {
        schema_version: SNAPSHOT_VERSION,
        exported_at: Utc::now(),
        history: store.history().get_all().await?,
        collections: store.collections().get_all().await?,
        tags: store.tags().get_all().await?,
        templates: store.templates().get_all().await?,
    };
    info!(
        "Exported snapshot: {} history, {} collections, {} tags, {} templates",
        snapshot.history.len(),
        snapshot.collections.len(),
        snapshot.tags.len(),
        snapshot.templates.len()
    );
    Ok(snapshot)
}

/// Import a snapshot, upserting every record by id
pub async fn import(store: &MediaStore, snapshot: &Snapshot) -> SnapshotResult<ImportReport> {
    if snapshot.schema_version > SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: snapshot.schema_version,
            supported: SNAPSHOT_VERSION,
        });
    }

    let mut report = ImportReport::default();

    for record in &snapshot.history {
        store.history().put(record).await?;
        report.history += 1;
    }
    for collection in &snapshot.collections {
        store.collections().put(collection).await?;
        report.collections += 1;
    }
    for tag in &snapshot.tags {
        store.tags().put(tag).await?;
        report.tags += 1;
    }
    for template in &snapshot.templates {
        store.templates().put(template).await?;
        report.templates += 1;
    }

    info!("Imported snapshot: {} records written", report.total());
    Ok(report)
}
