//! Locale-aware content backend for the marketing site.
//!
//! Content entities (hero, header, footer, testimonials, ...) are stored as
//! records whose base-locale values live on top-level fields and whose
//! other-locale overrides live in a per-record translations mapping. The
//! crate provides the locale registry, the overlay codec and upsert builder
//! that implement that convention, and one generic data service
//! instantiated per entity from a declarative configuration table.

pub mod config;
pub mod entity;
pub mod error;
pub mod i18n;
pub mod newsletter;
pub mod overlay;
pub mod service;
pub mod store;

pub use config::Config;
pub use entity::{entity_config, EntityConfig, EntityKind, ENTITIES};
pub use error::{Result, ServiceError};
pub use i18n::{Locale, LocaleRegistry};
pub use newsletter::{NewsletterService, Subscription, SubscriptionStatus};
pub use overlay::{apply_overlay, upsert_overlay, FieldMap, Translations};
pub use service::{ContentService, DeleteOutcome};
pub use store::{ContentStore, StoredRecord};
