//! Naming template collection
//!
//! Filename-pattern presets. The only invariant beyond plain CRUD is the
//! default flag: `set_default` clears and sets it inside one transaction so
//! at most one template is the default at any time.

use rusqlite::{params, OptionalExtension, Row};

use crate::app::models::NamingTemplate;
use crate::errors::{StoreError, StoreResult};

use super::MediaStore;

/// Typed handle over the `naming_templates` collection
#[derive(Debug, Clone)]
pub struct TemplateStore {
    store: MediaStore,
}

impl TemplateStore {
    pub(super) fn new(store: MediaStore) -> Self {
        Self { store }
    }

    /// Insert or replace a template, keyed by `id`
    pub async fn put(&self, template: &NamingTemplate) -> StoreResult<()> {
        let conn = self.store.conn().lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO naming_templates (id, name, template, is_default)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                template.id,
                template.name,
                template.template,
                template.is_default as i64,
            ],
        )?;
        Ok(())
    }

    /// Get a template by id
    pub async fn get(&self, id: &str) -> StoreResult<Option<NamingTemplate>> {
        let conn = self.store.conn().lock().await;
        let template = conn
            .prepare("SELECT * FROM naming_templates WHERE id = ?1")?
            .query_row([id], Self::row_to_template)
            .optional()?;
        Ok(template)
    }

    /// All templates, by name
    pub async fn get_all(&self) -> StoreResult<Vec<NamingTemplate>> {
        let conn = self.store.conn().lock().await;
        let templates = conn
            .prepare("SELECT * FROM naming_templates ORDER BY name ASC")?
            .query_map([], Self::row_to_template)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(templates)
    }

    /// The current default template, if one has been chosen
    pub async fn get_default(&self) -> StoreResult<Option<NamingTemplate>> {
        let conn = self.store.conn().lock().await;
        let template = conn
            .prepare("SELECT * FROM naming_templates WHERE is_default = 1 LIMIT 1")?
            .query_row([], Self::row_to_template)
            .optional()?;
        Ok(template)
    }

    /// Make `id` the single default template
    ///
    /// Clearing the old default and setting the new one happen in the same
    /// write; any prior state ends with exactly one default.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` when `id` does not name a stored template.
    pub async fn set_default(&self, id: &str) -> StoreResult<()> {
        let mut conn = self.store.conn().lock().await;
        let tx = conn.transaction()?;

        let exists: bool = tx
            .query_row(
                "SELECT 1 FROM naming_templates WHERE id = ?1",
                [id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !exists {
            return Err(StoreError::NotFound { id: id.to_string() });
        }

        tx.execute(
            "UPDATE naming_templates
             SET is_default = CASE WHEN id = ?1 THEN 1 ELSE 0 END",
            [id],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Delete a template; returns false when the id was absent
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let conn = self.store.conn().lock().await;
        let affected = conn.execute("DELETE FROM naming_templates WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Remove every template; returns how many were deleted
    pub async fn clear(&self) -> StoreResult<usize> {
        let conn = self.store.conn().lock().await;
        let affected = conn.execute("DELETE FROM naming_templates", [])?;
        Ok(affected)
    }

    fn row_to_template(row: &Row) -> rusqlite::Result<NamingTemplate> {
        Ok(NamingTemplate {
            id: row.get("id")?,
            name: row.get("name")?,
            template: row.get("template")?,
            is_default: row.get::<_, i64>("is_default")? != 0,
        })
    }
}
