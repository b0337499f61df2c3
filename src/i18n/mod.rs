//! Internationalization (i18n) module for the content backend.
//!
//! - `registry`: single source of truth for supported locales and their metadata
//! - `locale`: validated `Locale` type with lossy resolution to the default
//!
//! The site ships English (default/base) and Arabic. Base-locale content
//! lives on record fields; every other locale is a translations overlay.

mod locale;
mod registry;

pub use locale::Locale;
pub use registry::{LocaleConfig, LocaleRegistry};
