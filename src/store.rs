//! SQLite-backed content store.
//!
//! One generic `content_records` table holds every content entity as a JSON
//! field map plus a JSON translations map, keyed by entity name, with an
//! explicit sort column for list entities. The store is constructed once
//! from a path and injected into services; it exposes exactly the
//! single-record primitives the services need, each a single round-trip
//! with no multi-record transactions.
//!
//! Malformed stored JSON never escapes this boundary: a `fields` blob that
//! does not parse as an object is read as an empty map, and `translations`
//! is surfaced as the [`Translations`] sum type for the overlay codec to
//! normalize.

use anyhow::{Context, Result as AnyResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::error::Result;
use crate::newsletter::{Subscription, SubscriptionStatus};
use crate::overlay::{FieldMap, Translations};

/// One row of the generic content table.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub id: i64,
    pub entity: String,
    pub fields: FieldMap,
    pub translations: Translations,
    pub sort_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone)]
pub struct ContentStore {
    conn: Arc<Mutex<Connection>>,
}

impl ContentStore {
    /// Open (or create) the store at the given path and ensure tables exist.
    pub fn open(database_path: &str) -> AnyResult<Self> {
        let conn = Connection::open(database_path)
            .with_context(|| format!("Failed to open database at {}", database_path))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS content_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entity TEXT NOT NULL,
                fields TEXT NOT NULL,
                translations TEXT NOT NULL,
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create content_records table")?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_content_entity ON content_records(entity)",
            [],
        )
        .context("Failed to create entity index")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS newsletter_subscribers (
                email TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                subscribed_at TEXT NOT NULL,
                first_subscribed_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create newsletter_subscribers table")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // ==================== Content record primitives ====================

    /// Fetch the first record for an entity (singleton retrieval convention).
    pub fn find_first(&self, entity: &str) -> Result<Option<StoredRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, entity, fields, translations, sort_order, created_at, updated_at
             FROM content_records WHERE entity = ?1 ORDER BY id ASC LIMIT 1",
        )?;
        let record = stmt
            .query_row(params![entity], record_from_row)
            .optional()?;
        Ok(record)
    }

    pub fn find_by_id(&self, entity: &str, id: i64) -> Result<Option<StoredRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, entity, fields, translations, sort_order, created_at, updated_at
             FROM content_records WHERE entity = ?1 AND id = ?2",
        )?;
        let record = stmt
            .query_row(params![entity, id], record_from_row)
            .optional()?;
        Ok(record)
    }

    /// Fetch all records for an entity ordered by the explicit sort column.
    /// Ties break by id, i.e. insertion order.
    pub fn find_many(&self, entity: &str) -> Result<Vec<StoredRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, entity, fields, translations, sort_order, created_at, updated_at
             FROM content_records WHERE entity = ?1 ORDER BY sort_order ASC, id ASC",
        )?;
        let records = stmt
            .query_map(params![entity], record_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn insert(
        &self,
        entity: &str,
        fields: &FieldMap,
        translations: &FieldMap,
        sort_order: i64,
    ) -> Result<StoredRecord> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO content_records (entity, fields, translations, sort_order, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                entity,
                Value::Object(fields.clone()).to_string(),
                Value::Object(translations.clone()).to_string(),
                sort_order,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Ok(StoredRecord {
            id,
            entity: entity.to_string(),
            fields: fields.clone(),
            translations: Translations::Parsed(translations.clone()),
            sort_order,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Overwrite a record's base fields (and optionally its sort position).
    /// Returns whether a row was updated.
    pub fn update_fields(
        &self,
        id: i64,
        fields: &FieldMap,
        sort_order: Option<i64>,
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let serialized = Value::Object(fields.clone()).to_string();

        let affected = match sort_order {
            Some(order) => conn.execute(
                "UPDATE content_records SET fields = ?1, sort_order = ?2, updated_at = ?3 WHERE id = ?4",
                params![serialized, order, now, id],
            )?,
            None => conn.execute(
                "UPDATE content_records SET fields = ?1, updated_at = ?2 WHERE id = ?3",
                params![serialized, now, id],
            )?,
        };
        Ok(affected > 0)
    }

    /// Persist only the translations mapping, leaving base fields untouched.
    pub fn update_translations(&self, id: i64, translations: &FieldMap) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let affected = conn.execute(
            "UPDATE content_records SET translations = ?1, updated_at = ?2 WHERE id = ?3",
            params![Value::Object(translations.clone()).to_string(), now, id],
        )?;
        Ok(affected > 0)
    }

    /// Delete one record. Returns whether a row actually existed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute("DELETE FROM content_records WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Delete every record of an entity. Returns the number removed.
    pub fn delete_many(&self, entity: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute(
            "DELETE FROM content_records WHERE entity = ?1",
            params![entity],
        )?;
        Ok(affected)
    }

    pub fn count(&self, entity: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM content_records WHERE entity = ?1")?;
        let count: i64 = stmt.query_row(params![entity], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ==================== Newsletter subscriber primitives ====================

    pub fn find_subscriber(&self, email: &str) -> Result<Option<Subscription>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT email, status, subscribed_at, first_subscribed_at
             FROM newsletter_subscribers WHERE email = ?1",
        )?;
        let subscription = stmt
            .query_row(params![email], subscription_from_row)
            .optional()?;
        Ok(subscription)
    }

    pub fn insert_subscriber(&self, email: &str) -> Result<Subscription> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO newsletter_subscribers (email, status, subscribed_at, first_subscribed_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![email, SubscriptionStatus::Active.as_str(), now],
        )?;
        Ok(Subscription {
            email: email.to_string(),
            status: SubscriptionStatus::Active,
            subscribed_at: now.clone(),
            first_subscribed_at: now,
        })
    }

    /// Reactivate an unsubscribed address, refreshing `subscribed_at`.
    /// `first_subscribed_at` is never touched after insert. The row must
    /// exist; a missing row surfaces as a persistence error.
    pub fn reactivate_subscriber(&self, email: &str) -> Result<Subscription> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE newsletter_subscribers SET status = ?1, subscribed_at = ?2 WHERE email = ?3",
            params![
                SubscriptionStatus::Active.as_str(),
                Utc::now().to_rfc3339(),
                email
            ],
        )?;
        let mut stmt = conn.prepare(
            "SELECT email, status, subscribed_at, first_subscribed_at
             FROM newsletter_subscribers WHERE email = ?1",
        )?;
        let subscription = stmt.query_row(params![email], subscription_from_row)?;
        Ok(subscription)
    }

    /// Mark an address unsubscribed. Returns whether a row changed.
    pub fn mark_unsubscribed(&self, email: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute(
            "UPDATE newsletter_subscribers SET status = ?1 WHERE email = ?2 AND status = ?3",
            params![
                SubscriptionStatus::Unsubscribed.as_str(),
                email,
                SubscriptionStatus::Active.as_str()
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn list_active_subscribers(&self) -> Result<Vec<Subscription>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT email, status, subscribed_at, first_subscribed_at
             FROM newsletter_subscribers WHERE status = ?1 ORDER BY subscribed_at DESC",
        )?;
        let subscriptions = stmt
            .query_map(params![SubscriptionStatus::Active.as_str()], subscription_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(subscriptions)
    }
}

/// Map a content row, recovering malformed JSON to empty values.
fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredRecord> {
    let id: i64 = row.get(0)?;
    let entity: String = row.get(1)?;
    let fields_text: String = row.get(2)?;
    let translations_text: String = row.get(3)?;

    let fields = match serde_json::from_str::<Value>(&fields_text) {
        Ok(Value::Object(map)) => map,
        _ => {
            warn!(id, entity = %entity, "stored fields blob is not a JSON object, reading as empty");
            Map::new()
        }
    };

    // Keep the stored form explicit: an object is already Parsed, a JSON
    // string is a legacy doubly-encoded mapping, anything else stays Raw
    // for the overlay codec to collapse to empty.
    let translations = match serde_json::from_str::<Value>(&translations_text) {
        Ok(Value::Object(map)) => Translations::Parsed(map),
        Ok(Value::String(inner)) => Translations::Raw(inner),
        _ => Translations::Raw(translations_text),
    };

    Ok(StoredRecord {
        id,
        entity,
        fields,
        translations,
        sort_order: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn subscription_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Subscription> {
    let status_text: String = row.get(1)?;
    Ok(Subscription {
        email: row.get(0)?,
        status: SubscriptionStatus::from_str_lossy(&status_text),
        subscribed_at: row.get(2)?,
        first_subscribed_at: row.get(3)?,
    })
}
