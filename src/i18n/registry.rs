//! Locale registry: single source of truth for all supported locales.
//!
//! The site serves exactly the locales registered here; the default locale
//! is the one whose values live directly on a record's base fields, every
//! other locale is an overlay inside the record's `translations` mapping.

use std::sync::OnceLock;

/// Configuration for a supported locale.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// ISO 639-1 locale code (e.g., "en", "ar")
    pub code: &'static str,

    /// English name of the locale (e.g., "English", "Arabic")
    pub name: &'static str,

    /// Native name of the locale (e.g., "English", "العربية")
    pub native_name: &'static str,

    /// Whether this is the default/base locale (exactly one must be true)
    pub is_default: bool,

    /// Whether the locale is written right-to-left
    pub rtl: bool,
}

/// Global locale registry.
///
/// Initialized once on first access and immutable thereafter. Pure and
/// stateless apart from the lazy init; performs no I/O.
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: supported_locales(),
        })
    }

    /// Look up a locale configuration by its exact code.
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    /// Check whether a code exactly matches a registered locale.
    ///
    /// Any other input (garbage, empty string, region-tagged variants)
    /// returns false; callers fall back to the default locale.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    /// All registered locale codes, in registration order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.locales.iter().map(|locale| locale.code).collect()
    }

    /// All registered locale configurations, in registration order.
    pub fn list_all(&self) -> Vec<&LocaleConfig> {
        self.locales.iter().collect()
    }

    /// The default locale configuration.
    ///
    /// # Panics
    /// Panics if zero or multiple default locales are registered, which
    /// indicates a broken registration table.
    pub fn default_locale(&self) -> &LocaleConfig {
        let defaults: Vec<_> = self
            .locales
            .iter()
            .filter(|locale| locale.is_default)
            .collect();

        match defaults.len() {
            0 => panic!("No default locale registered"),
            1 => defaults[0],
            _ => panic!("Multiple default locales registered"),
        }
    }
}

/// The closed set of locales the site ships with.
fn supported_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_default: true,
            rtl: false,
        },
        LocaleConfig {
            code: "ar",
            name: "Arabic",
            native_name: "العربية",
            is_default: false,
            rtl: true,
        },
    ]
}
