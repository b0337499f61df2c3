//! Declarative per-entity configuration.
//!
//! Every content type the site serves is described by one row in a static
//! table: its retrieval shape (singleton vs ordered list), the whitelist of
//! fields allowed to vary by locale, the fields persisted as serialized
//! JSON arrays, and the validation rule applied on create/upsert. One
//! generic service is instantiated per row; there is no per-entity code.

use serde_json::Value;

use crate::overlay::FieldMap;

/// Retrieval convention for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// At most one logical record; "first record found" is the convention.
    Singleton,
    /// Multiple records ordered by the explicit `order` field.
    List,
}

/// Required-field rule checked when a record is created.
#[derive(Debug, Clone, Copy)]
pub enum RequiredFields {
    /// Any non-empty payload is acceptable.
    None,
    /// Every named field must be present and non-null.
    All(&'static [&'static str]),
    /// At least one of the named field pairs must be fully present.
    EitherPair(
        (&'static str, &'static str),
        (&'static str, &'static str),
    ),
}

/// Static description of one content entity.
#[derive(Debug, Clone, Copy)]
pub struct EntityConfig {
    pub name: &'static str,
    pub kind: EntityKind,
    /// Field names allowed to vary by locale.
    pub overlay_fields: &'static [&'static str],
    /// Fields whose value is an ordered sequence, persisted as a serialized
    /// string and normalized back to a sequence on read.
    pub array_fields: &'static [&'static str],
    pub required: RequiredFields,
}

impl EntityConfig {
    pub fn is_singleton(&self) -> bool {
        self.kind == EntityKind::Singleton
    }

    pub fn is_array_field(&self, field: &str) -> bool {
        self.array_fields.contains(&field)
    }

    /// Check the entity's required-field rule against an incoming payload.
    /// Returns the offending description on failure.
    pub fn check_required(&self, data: &FieldMap) -> Result<(), String> {
        fn present(data: &FieldMap, field: &str) -> bool {
            matches!(data.get(field), Some(value) if !matches!(value, Value::Null))
        }

        match self.required {
            RequiredFields::None => Ok(()),
            RequiredFields::All(fields) => {
                for &field in fields {
                    if !present(data, field) {
                        return Err(format!("missing required field '{}'", field));
                    }
                }
                Ok(())
            }
            RequiredFields::EitherPair((a1, a2), (b1, b2)) => {
                let first = present(data, a1) && present(data, a2);
                let second = present(data, b1) && present(data, b2);
                if first || second {
                    Ok(())
                } else {
                    Err(format!(
                        "requires either '{}'+'{}' or '{}'+'{}'",
                        a1, a2, b1, b2
                    ))
                }
            }
        }
    }
}

/// The full entity table: eight singletons and four ordered lists.
/// Newsletter subscriptions live outside this table; they are not
/// locale-overlaid content (see `crate::newsletter`).
pub const ENTITIES: &[EntityConfig] = &[
    EntityConfig {
        name: "hero",
        kind: EntityKind::Singleton,
        overlay_fields: &["title", "subtitle", "description", "ctaText", "ctaLink"],
        array_fields: &[],
        required: RequiredFields::None,
    },
    EntityConfig {
        name: "header",
        kind: EntityKind::Singleton,
        overlay_fields: &["logoText", "ctaText"],
        array_fields: &["navLinks"],
        required: RequiredFields::None,
    },
    EntityConfig {
        name: "footer",
        kind: EntityKind::Singleton,
        overlay_fields: &["tagline", "description", "copyright"],
        array_fields: &["links"],
        required: RequiredFields::None,
    },
    EntityConfig {
        name: "contact",
        kind: EntityKind::Singleton,
        overlay_fields: &["title", "subtitle", "address", "officeHours"],
        array_fields: &[],
        required: RequiredFields::None,
    },
    EntityConfig {
        name: "philosophy",
        kind: EntityKind::Singleton,
        overlay_fields: &["title", "subtitle", "description", "quote"],
        array_fields: &[],
        required: RequiredFields::None,
    },
    EntityConfig {
        name: "services",
        kind: EntityKind::Singleton,
        overlay_fields: &["title", "subtitle", "description"],
        array_fields: &["cards"],
        required: RequiredFields::None,
    },
    EntityConfig {
        name: "legal",
        kind: EntityKind::Singleton,
        overlay_fields: &["privacyPolicy", "termsOfService"],
        array_fields: &[],
        required: RequiredFields::None,
    },
    EntityConfig {
        name: "visual",
        kind: EntityKind::Singleton,
        overlay_fields: &["title", "caption"],
        array_fields: &["galleryImages"],
        required: RequiredFields::None,
    },
    EntityConfig {
        name: "stats",
        kind: EntityKind::List,
        overlay_fields: &["label", "suffix"],
        array_fields: &[],
        required: RequiredFields::None,
    },
    EntityConfig {
        name: "testimonials",
        kind: EntityKind::List,
        overlay_fields: &["quote", "author", "role", "city"],
        array_fields: &["metrics"],
        required: RequiredFields::All(&["quote", "author", "role", "city"]),
    },
    EntityConfig {
        name: "case_studies",
        kind: EntityKind::List,
        overlay_fields: &["title", "summary", "challenge", "solution"],
        array_fields: &["tags"],
        required: RequiredFields::None,
    },
    EntityConfig {
        name: "contact_bookings",
        kind: EntityKind::List,
        overlay_fields: &["day"],
        array_fields: &["slots"],
        required: RequiredFields::EitherPair(("name", "email"), ("day", "date")),
    },
];

/// Look up an entity configuration by name.
pub fn entity_config(name: &str) -> Option<&'static EntityConfig> {
    ENTITIES.iter().find(|entity| entity.name == name)
}
