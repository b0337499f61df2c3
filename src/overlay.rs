//! Translation overlay codec and upsert builder.
//!
//! A content record keeps its base-locale values on top-level fields and
//! every other locale's overrides inside a `translations` mapping keyed by
//! locale code. Older rows persisted that mapping as a serialized JSON
//! string, so the stored form is modeled as an explicit sum type and
//! normalized to a mapping immediately after every read. A raw form that
//! fails to parse collapses to an empty mapping; it never surfaces as an
//! error and never leaks to callers as a string.

use serde_json::{Map, Value};

use crate::i18n::Locale;

/// A record's fields, as a JSON object.
pub type FieldMap = Map<String, Value>;

/// Field name under which the overlay mapping lives on a record.
pub const TRANSLATIONS_FIELD: &str = "translations";

/// Stored form of a record's translations: either a serialized string
/// (legacy rows) or an already-structured mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Translations {
    Raw(String),
    Parsed(FieldMap),
}

impl Translations {
    pub fn empty() -> Translations {
        Translations::Parsed(Map::new())
    }

    /// Classify a stored JSON value. Anything that is neither a string nor
    /// an object (including absence and null) is an empty mapping.
    pub fn from_value(value: Option<&Value>) -> Translations {
        match value {
            Some(Value::String(raw)) => Translations::Raw(raw.clone()),
            Some(Value::Object(map)) => Translations::Parsed(map.clone()),
            _ => Translations::empty(),
        }
    }

    /// Normalize to the mapping form. A raw string that does not parse as a
    /// JSON object becomes an empty mapping.
    pub fn into_map(self) -> FieldMap {
        match self {
            Translations::Parsed(map) => map,
            Translations::Raw(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            },
        }
    }

    /// The overlay entry for one locale, if present and well-formed.
    pub fn locale_entry(map: &FieldMap, locale: Locale) -> Option<&FieldMap> {
        match map.get(locale.code()) {
            Some(Value::Object(entry)) => Some(entry),
            _ => None,
        }
    }
}

/// Merge a locale's overlay onto a record.
///
/// Returns a copy of `record` in which `translations` is replaced by its
/// normalized mapping form and, for each whitelisted field the overlay
/// defines with a non-null value, the base value is shadowed by the overlay
/// value. The input is never mutated. The default locale is merged by the
/// same rule: a record may carry an explicit self-referential override
/// under the default locale key, and it applies like any other.
pub fn apply_overlay(record: &FieldMap, locale: Locale, overlay_fields: &[&str]) -> FieldMap {
    let mut merged = record.clone();
    let translations = Translations::from_value(record.get(TRANSLATIONS_FIELD)).into_map();

    if let Some(entry) = Translations::locale_entry(&translations, locale) {
        for &field in overlay_fields {
            match entry.get(field) {
                Some(value) if !value.is_null() => {
                    merged.insert(field.to_string(), value.clone());
                }
                _ => {}
            }
        }
    }

    merged.insert(TRANSLATIONS_FIELD.to_string(), Value::Object(translations));
    merged
}

/// Build an updated translations mapping with one locale's entry merged.
///
/// Partial-update semantics: only whitelisted fields that `incoming`
/// actually defines are written into the target locale's entry; an absent
/// key is left untouched, while an explicit JSON null is a legitimate
/// overlay value and is written. Entries for other locales pass through
/// unchanged.
pub fn upsert_overlay(
    existing: &Translations,
    locale: Locale,
    incoming: &FieldMap,
    overlay_fields: &[&str],
) -> FieldMap {
    let mut all = existing.clone().into_map();

    let mut entry = match all.get(locale.code()) {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };

    for &field in overlay_fields {
        if let Some(value) = incoming.get(field) {
            entry.insert(field.to_string(), value.clone());
        }
    }

    all.insert(locale.code().to_string(), Value::Object(entry));
    all
}
