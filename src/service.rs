//! Generic per-entity content service.
//!
//! One implementation serves every entity in the static table: it composes
//! the overlay codec and upsert builder with the store primitives, keeping
//! the base-locale/overlay write split in one place. Writes for the default
//! locale land on base fields; writes for any other locale flow through the
//! upsert builder and persist only the translations mapping. JSON-array
//! fields are serialized immediately before a write and normalized back to
//! sequences on every read.

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::entity::{EntityConfig, EntityKind};
use crate::error::{Result, ServiceError};
use crate::i18n::Locale;
use crate::overlay::{apply_overlay, upsert_overlay, FieldMap, Translations, TRANSLATIONS_FIELD};
use crate::store::{ContentStore, StoredRecord};

/// Result of a delete call. Deletes are idempotent: an id that was already
/// absent still reports success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub id: i64,
    pub deleted: bool,
}

#[derive(Clone)]
pub struct ContentService {
    store: ContentStore,
    entity: &'static EntityConfig,
}

impl ContentService {
    pub fn new(store: ContentStore, entity: &'static EntityConfig) -> Self {
        Self { store, entity }
    }

    /// Look the entity up in the static table and build its service.
    pub fn for_entity(store: ContentStore, name: &str) -> Option<Self> {
        crate::entity::entity_config(name).map(|entity| Self::new(store, entity))
    }

    pub fn entity(&self) -> &'static EntityConfig {
        self.entity
    }

    /// Fetch the singleton (or first) record merged for the locale.
    ///
    /// Absence propagates: no record means `None`, and any fallback to
    /// hardcoded default content is caller-side policy.
    pub async fn get(&self, locale: Locale) -> Result<Option<FieldMap>> {
        let record = self.store.find_first(self.entity.name)?;
        Ok(record.map(|r| self.view(r, locale)))
    }

    pub async fn get_by_id(&self, id: i64, locale: Locale) -> Result<Option<FieldMap>> {
        let record = self.store.find_by_id(self.entity.name, id)?;
        Ok(record.map(|r| self.view(r, locale)))
    }

    /// All records for the entity, ordered by `order` ascending with ties
    /// broken by insertion order, each merged for the locale.
    pub async fn get_all(&self, locale: Locale) -> Result<Vec<FieldMap>> {
        let records = self.store.find_many(self.entity.name)?;
        Ok(records.into_iter().map(|r| self.view(r, locale)).collect())
    }

    /// Create a record. Default-locale data lands on base fields; any other
    /// locale seeds an empty-based record whose translations entry holds
    /// the overlay-eligible fields only.
    pub async fn create(&self, data: FieldMap, locale: Locale) -> Result<FieldMap> {
        if data.is_empty() {
            return Err(ServiceError::validation(self.entity.name, "empty payload"));
        }
        self.entity
            .check_required(&data)
            .map_err(|reason| ServiceError::validation(self.entity.name, reason))?;

        let (mut data, sort_order) = split_order(data);

        let (fields, translations) = if locale.is_default() {
            serialize_array_fields(&mut data, self.entity);
            (data, Map::new())
        } else {
            let translations = upsert_overlay(
                &Translations::empty(),
                locale,
                &data,
                self.entity.overlay_fields,
            );
            (Map::new(), translations)
        };

        let record =
            self.store
                .insert(self.entity.name, &fields, &translations, sort_order.unwrap_or(0))?;
        info!(
            entity = self.entity.name,
            id = record.id,
            locale = locale.code(),
            "created content record"
        );
        Ok(self.view(record, locale))
    }

    /// Update named fields of an existing record. Returns the merged view
    /// for the locale that performed the write.
    pub async fn update(&self, id: i64, data: FieldMap, locale: Locale) -> Result<FieldMap> {
        let existing =
            self.store
                .find_by_id(self.entity.name, id)?
                .ok_or(ServiceError::NotFound {
                    entity: self.entity.name,
                    id,
                })?;

        if locale.is_default() {
            let (mut data, sort_order) = split_order(data);
            serialize_array_fields(&mut data, self.entity);

            let mut fields = existing.fields;
            for (name, value) in data {
                fields.insert(name, value);
            }
            self.store.update_fields(id, &fields, sort_order)?;
        } else {
            let translations = upsert_overlay(
                &existing.translations,
                locale,
                &data,
                self.entity.overlay_fields,
            );
            self.store.update_translations(id, &translations)?;
        }

        info!(
            entity = self.entity.name,
            id,
            locale = locale.code(),
            "updated content record"
        );
        let updated = self
            .store
            .find_by_id(self.entity.name, id)?
            .ok_or(ServiceError::NotFound {
                entity: self.entity.name,
                id,
            })?;
        Ok(self.view(updated, locale))
    }

    /// Locate the singleton and update it, or create it if absent.
    pub async fn upsert(&self, data: FieldMap, locale: Locale) -> Result<FieldMap> {
        if data.is_empty() {
            return Err(ServiceError::validation(self.entity.name, "empty payload"));
        }

        match self.store.find_first(self.entity.name)? {
            Some(existing) => self.update(existing.id, data, locale).await,
            None => self.create(data, locale).await,
        }
    }

    /// Remove a record. Idempotent over strictness: an already-absent id is
    /// a success, only unexpected store failures surface.
    pub async fn delete(&self, id: i64) -> Result<DeleteOutcome> {
        let existed = self.store.delete(id)?;
        if existed {
            info!(entity = self.entity.name, id, "deleted content record");
        } else {
            debug!(entity = self.entity.name, id, "delete no-op, record already absent");
        }
        Ok(DeleteOutcome { id, deleted: true })
    }

    /// Remove every record of the entity. Returns the number removed.
    pub async fn clear(&self) -> Result<usize> {
        let removed = self.store.delete_many(self.entity.name)?;
        info!(entity = self.entity.name, removed, "cleared content records");
        Ok(removed)
    }

    /// Build the outward view of a record for a locale: base fields with
    /// the locale overlay applied, array fields as real sequences, plus id
    /// (and order for list entities).
    fn view(&self, record: StoredRecord, locale: Locale) -> FieldMap {
        let mut flat = record.fields;
        flat.insert("id".to_string(), json!(record.id));
        if self.entity.kind == EntityKind::List {
            flat.insert("order".to_string(), json!(record.sort_order));
        }
        flat.insert(
            TRANSLATIONS_FIELD.to_string(),
            match record.translations {
                Translations::Parsed(map) => Value::Object(map),
                Translations::Raw(raw) => Value::String(raw),
            },
        );

        let mut merged = apply_overlay(&flat, locale, self.entity.overlay_fields);
        normalize_array_fields(&mut merged, self.entity);
        merged
    }
}

/// Pull an incoming `order` value out of the payload; it is persisted in
/// the dedicated sort column, never inside the fields blob.
fn split_order(mut data: FieldMap) -> (FieldMap, Option<i64>) {
    let sort_order = data.remove("order").as_ref().and_then(Value::as_i64);
    // Never trust inbound ids or translations blobs on the payload
    data.remove("id");
    data.remove(TRANSLATIONS_FIELD);
    (data, sort_order)
}

/// Serialize structured sequences to their stored string form.
fn serialize_array_fields(data: &mut FieldMap, entity: &EntityConfig) {
    for &field in entity.array_fields {
        let serialized = match data.get(field) {
            Some(value @ Value::Array(_)) => Some(value.to_string()),
            _ => None,
        };
        if let Some(serialized) = serialized {
            data.insert(field.to_string(), Value::String(serialized));
        }
    }
}

/// Normalize stored array fields to real sequences: absent, empty, or
/// unparseable values become an empty sequence, never null and never a raw
/// string.
fn normalize_array_fields(record: &mut FieldMap, entity: &EntityConfig) {
    for &field in entity.array_fields {
        let normalized = match record.get(field) {
            Some(Value::Array(items)) => Value::Array(items.clone()),
            Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Array(items)) => Value::Array(items),
                _ => json!([]),
            },
            _ => json!([]),
        };
        record.insert(field.to_string(), normalized);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (ContentStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test_service.db");
        let store = ContentStore::open(db_path.to_str().unwrap()).expect("Failed to open store");
        (store, temp_dir)
    }

    fn service(store: &ContentStore, name: &str) -> ContentService {
        ContentService::for_entity(store.clone(), name).expect("known entity")
    }

    fn payload(value: Value) -> FieldMap {
        value.as_object().unwrap().clone()
    }

    // ==================== Read path ====================

    #[tokio::test]
    async fn test_get_absent_record_is_none() {
        let (store, _temp_dir) = create_test_store();
        let hero = service(&store, "hero");

        let result = hero.get(Locale::ENGLISH).await.expect("get");
        assert!(result.is_none(), "no synthesized record for empty store");
    }

    #[tokio::test]
    async fn test_create_then_get_default_locale() {
        let (store, _temp_dir) = create_test_store();
        let hero = service(&store, "hero");

        hero.create(payload(json!({"title": "Welcome", "subtitle": "Hi"})), Locale::ENGLISH)
            .await
            .expect("create");

        let view = hero.get(Locale::ENGLISH).await.expect("get").expect("exists");
        assert_eq!(view.get("title"), Some(&json!("Welcome")));
        assert!(view.get("id").is_some());
        assert!(view.get("translations").unwrap().is_object());
    }

    #[tokio::test]
    async fn test_get_applies_arabic_overlay() {
        let (store, _temp_dir) = create_test_store();
        let hero = service(&store, "hero");

        let created = hero
            .create(payload(json!({"title": "Welcome"})), Locale::ENGLISH)
            .await
            .expect("create");
        let id = created.get("id").unwrap().as_i64().unwrap();

        hero.update(id, payload(json!({"title": "أهلاً"})), Locale::ARABIC)
            .await
            .expect("update ar");

        let en = hero.get(Locale::ENGLISH).await.expect("get").expect("exists");
        assert_eq!(en.get("title"), Some(&json!("Welcome")));

        let ar = hero.get(Locale::ARABIC).await.expect("get").expect("exists");
        assert_eq!(ar.get("title"), Some(&json!("أهلاً")));
    }

    #[tokio::test]
    async fn test_unsupported_locale_resolves_to_default_view() {
        let (store, _temp_dir) = create_test_store();
        let hero = service(&store, "hero");

        hero.create(payload(json!({"title": "Welcome"})), Locale::ENGLISH)
            .await
            .expect("create");

        // Boundary convention: resolve before calling the service
        let locale = Locale::resolve(Some("fr"));
        let view = hero.get(locale).await.expect("get").expect("exists");
        assert_eq!(view.get("title"), Some(&json!("Welcome")));
    }

    // ==================== Array fields ====================

    #[tokio::test]
    async fn test_array_field_round_trip() {
        let (store, _temp_dir) = create_test_store();
        let header = service(&store, "header");

        header
            .create(
                payload(json!({
                    "logoText": "Acme",
                    "navLinks": [{"label": "Home", "href": "/"}]
                })),
                Locale::ENGLISH,
            )
            .await
            .expect("create");

        // Stored form is a serialized string
        let stored = store.find_first("header").expect("find").expect("exists");
        assert!(stored.fields.get("navLinks").unwrap().is_string());

        // Read form is a real sequence
        let view = header.get(Locale::ENGLISH).await.expect("get").expect("exists");
        assert_eq!(
            view.get("navLinks"),
            Some(&json!([{"label": "Home", "href": "/"}]))
        );
    }

    #[tokio::test]
    async fn test_empty_string_array_field_reads_as_empty_sequence() {
        let (store, _temp_dir) = create_test_store();
        let header = service(&store, "header");

        header
            .create(payload(json!({"logoText": "Acme", "navLinks": ""})), Locale::ENGLISH)
            .await
            .expect("create");

        let view = header.get(Locale::ENGLISH).await.expect("get").expect("exists");
        assert_eq!(view.get("navLinks"), Some(&json!([])));
    }

    #[tokio::test]
    async fn test_absent_array_field_reads_as_empty_sequence() {
        let (store, _temp_dir) = create_test_store();
        let header = service(&store, "header");

        header
            .create(payload(json!({"logoText": "Acme"})), Locale::ENGLISH)
            .await
            .expect("create");

        let view = header.get(Locale::ENGLISH).await.expect("get").expect("exists");
        assert_eq!(view.get("navLinks"), Some(&json!([])));
    }

    // ==================== Create ====================

    #[tokio::test]
    async fn test_create_non_default_locale_seeds_overlay_only() {
        let (store, _temp_dir) = create_test_store();
        let hero = service(&store, "hero");

        hero.create(
            payload(json!({"title": "أهلاً", "slug": "not-overlayable"})),
            Locale::ARABIC,
        )
        .await
        .expect("create");

        let stored = store.find_first("hero").expect("find").expect("exists");
        assert!(stored.fields.is_empty(), "base fields stay empty");
        assert_eq!(
            stored.translations.clone().into_map(),
            payload(json!({"ar": {"title": "أهلاً"}})),
            "only overlay-eligible fields are seeded"
        );
    }

    #[tokio::test]
    async fn test_create_testimonial_requires_fields() {
        let (store, _temp_dir) = create_test_store();
        let testimonials = service(&store, "testimonials");

        let err = testimonials
            .create(payload(json!({"quote": "Great", "author": "A"})), Locale::ENGLISH)
            .await
            .expect_err("missing role/city");
        assert!(matches!(err, ServiceError::Validation { .. }));
        assert!(err.to_string().contains("role"));

        testimonials
            .create(
                payload(json!({"quote": "Great", "author": "A", "role": "CEO", "city": "Dubai"})),
                Locale::ENGLISH,
            )
            .await
            .expect("valid payload");
    }

    #[tokio::test]
    async fn test_create_booking_requires_either_pair() {
        let (store, _temp_dir) = create_test_store();
        let bookings = service(&store, "contact_bookings");

        assert!(bookings
            .create(payload(json!({"name": "N"})), Locale::ENGLISH)
            .await
            .is_err());

        bookings
            .create(payload(json!({"name": "N", "email": "n@example.com"})), Locale::ENGLISH)
            .await
            .expect("contact pair");
        bookings
            .create(
                payload(json!({"day": "Monday", "date": "2026-09-07", "slots": ["09:00"]})),
                Locale::ENGLISH,
            )
            .await
            .expect("slot pair");
    }

    #[tokio::test]
    async fn test_create_empty_payload_is_validation_error() {
        let (store, _temp_dir) = create_test_store();

        // List entities have no required-field rule, but an empty payload
        // must still be rejected rather than persisting an empty row
        for name in ["stats", "case_studies"] {
            let list = service(&store, name);
            let err = list
                .create(Map::new(), Locale::ENGLISH)
                .await
                .expect_err("empty payload");
            assert!(matches!(err, ServiceError::Validation { .. }));
            assert!(err.to_string().contains("empty payload"));
            assert_eq!(store.count(name).expect("count"), 0, "nothing persisted");
        }

        // Same guard applies to singletons and non-default locales
        let hero = service(&store, "hero");
        assert!(hero.create(Map::new(), Locale::ARABIC).await.is_err());
    }

    #[tokio::test]
    async fn test_create_routes_order_to_sort_column() {
        let (store, _temp_dir) = create_test_store();
        let stats = service(&store, "stats");

        stats
            .create(payload(json!({"label": "second", "value": 2, "order": 5})), Locale::ENGLISH)
            .await
            .expect("create");
        stats
            .create(payload(json!({"label": "first", "value": 1, "order": 1})), Locale::ENGLISH)
            .await
            .expect("create");

        let stored = store.find_first("stats").expect("find").expect("exists");
        assert!(stored.fields.get("order").is_none(), "order not in fields blob");

        let all = stats.get_all(Locale::ENGLISH).await.expect("get_all");
        let labels: Vec<&Value> = all.iter().map(|r| r.get("label").unwrap()).collect();
        assert_eq!(labels, vec![&json!("first"), &json!("second")]);
        assert_eq!(all[0].get("order"), Some(&json!(1)));
    }

    // ==================== Update ====================

    #[tokio::test]
    async fn test_update_default_locale_overwrites_named_fields_only() {
        let (store, _temp_dir) = create_test_store();
        let hero = service(&store, "hero");

        let created = hero
            .create(
                payload(json!({"title": "Welcome", "subtitle": "Hi"})),
                Locale::ENGLISH,
            )
            .await
            .expect("create");
        let id = created.get("id").unwrap().as_i64().unwrap();

        hero.update(id, payload(json!({"title": "Hello"})), Locale::ENGLISH)
            .await
            .expect("update");

        let view = hero.get(Locale::ENGLISH).await.expect("get").expect("exists");
        assert_eq!(view.get("title"), Some(&json!("Hello")));
        assert_eq!(view.get("subtitle"), Some(&json!("Hi")), "unnamed field untouched");
    }

    #[tokio::test]
    async fn test_update_non_default_persists_translations_only() {
        let (store, _temp_dir) = create_test_store();
        let hero = service(&store, "hero");

        let created = hero
            .create(payload(json!({"title": "Welcome"})), Locale::ENGLISH)
            .await
            .expect("create");
        let id = created.get("id").unwrap().as_i64().unwrap();
        let before = store.find_first("hero").expect("find").expect("exists");

        hero.update(id, payload(json!({"title": "أهلاً"})), Locale::ARABIC)
            .await
            .expect("update ar");

        let after = store.find_first("hero").expect("find").expect("exists");
        assert_eq!(after.fields, before.fields, "base fields untouched by overlay write");
        assert_eq!(
            after.translations.clone().into_map(),
            payload(json!({"ar": {"title": "أهلاً"}}))
        );
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let (store, _temp_dir) = create_test_store();
        let hero = service(&store, "hero");

        let err = hero
            .update(999, payload(json!({"title": "x"})), Locale::ENGLISH)
            .await
            .expect_err("missing id");
        assert!(matches!(err, ServiceError::NotFound { id: 999, .. }));
    }

    // ==================== Upsert ====================

    #[tokio::test]
    async fn test_upsert_creates_then_updates_singleton() {
        let (store, _temp_dir) = create_test_store();
        let footer = service(&store, "footer");

        footer
            .upsert(payload(json!({"tagline": "Built with care"})), Locale::ENGLISH)
            .await
            .expect("first upsert creates");
        footer
            .upsert(payload(json!({"tagline": "Still built with care"})), Locale::ENGLISH)
            .await
            .expect("second upsert updates");

        assert_eq!(store.count("footer").expect("count"), 1, "still a singleton");
        let view = footer.get(Locale::ENGLISH).await.expect("get").expect("exists");
        assert_eq!(view.get("tagline"), Some(&json!("Still built with care")));
    }

    #[tokio::test]
    async fn test_upsert_empty_payload_is_validation_error() {
        let (store, _temp_dir) = create_test_store();
        let footer = service(&store, "footer");

        let err = footer
            .upsert(Map::new(), Locale::ENGLISH)
            .await
            .expect_err("empty payload");
        assert!(matches!(err, ServiceError::Validation { .. }));
        assert!(err.to_string().contains("empty payload"));
    }

    #[tokio::test]
    async fn test_upsert_arabic_on_existing_record_writes_overlay() {
        let (store, _temp_dir) = create_test_store();
        let philosophy = service(&store, "philosophy");

        philosophy
            .upsert(payload(json!({"title": "Our philosophy"})), Locale::ENGLISH)
            .await
            .expect("seed");
        philosophy
            .upsert(payload(json!({"title": "فلسفتنا"})), Locale::ARABIC)
            .await
            .expect("overlay");

        let ar = philosophy.get(Locale::ARABIC).await.expect("get").expect("exists");
        assert_eq!(ar.get("title"), Some(&json!("فلسفتنا")));
        let en = philosophy.get(Locale::ENGLISH).await.expect("get").expect("exists");
        assert_eq!(en.get("title"), Some(&json!("Our philosophy")));
    }

    // ==================== Delete ====================

    #[tokio::test]
    async fn test_delete_is_idempotent_success() {
        let (store, _temp_dir) = create_test_store();
        let stats = service(&store, "stats");

        let created = stats
            .create(payload(json!({"label": "Clients", "value": 10})), Locale::ENGLISH)
            .await
            .expect("create");
        let id = created.get("id").unwrap().as_i64().unwrap();

        let first = stats.delete(id).await.expect("delete");
        assert_eq!(first, DeleteOutcome { id, deleted: true });

        // Already gone: still a success result, not an error
        let second = stats.delete(id).await.expect("delete again");
        assert_eq!(second, DeleteOutcome { id, deleted: true });

        let missing = stats.delete(424242).await.expect("delete unknown");
        assert!(missing.deleted);
    }

    #[tokio::test]
    async fn test_clear_removes_only_this_entity() {
        let (store, _temp_dir) = create_test_store();
        let stats = service(&store, "stats");
        let hero = service(&store, "hero");

        for i in 0..3 {
            stats
                .create(payload(json!({"label": format!("s{}", i)})), Locale::ENGLISH)
                .await
                .expect("create");
        }
        hero.create(payload(json!({"title": "T"})), Locale::ENGLISH)
            .await
            .expect("create");

        assert_eq!(stats.clear().await.expect("clear"), 3);
        assert!(hero.get(Locale::ENGLISH).await.expect("get").is_some());
    }
}
