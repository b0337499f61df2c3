//! Locale type: a validated, copyable locale handle.
//!
//! A `Locale` can only name a registered code. Inbound locale hints are
//! resolved with [`Locale::resolve`], which never fails: anything the
//! registry does not recognize collapses to the default locale before it
//! can reach overlay or persistence logic.

use crate::i18n::{LocaleConfig, LocaleRegistry};

/// A locale validated against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locale {
    code: &'static str,
}

impl Locale {
    pub const ENGLISH: Locale = Locale { code: "en" };
    pub const ARABIC: Locale = Locale { code: "ar" };

    /// Create a Locale from an exact registered code.
    ///
    /// Returns `None` for anything the registry does not list. Most callers
    /// want [`Locale::resolve`] instead.
    pub fn from_code(code: &str) -> Option<Locale> {
        LocaleRegistry::get()
            .get_by_code(code)
            .map(|config| Locale { code: config.code })
    }

    /// Resolve an optional inbound locale hint to a supported locale.
    ///
    /// Absent, empty, or unsupported values all resolve to the default
    /// locale. This is the normal path for unlocalized traffic, so no
    /// diagnostic is emitted.
    pub fn resolve(hint: Option<&str>) -> Locale {
        hint.and_then(Locale::from_code).unwrap_or_else(Locale::default_locale)
    }

    /// The default locale, whose values live on base record fields.
    pub fn default_locale() -> Locale {
        let config = LocaleRegistry::get().default_locale();
        Locale { code: config.code }
    }

    /// The ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Full registry configuration for this locale.
    ///
    /// # Panics
    /// Panics if the code is missing from the registry, which cannot happen
    /// for a properly constructed `Locale`.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::get()
            .get_by_code(self.code)
            .expect("Locale code should always be registered")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Whether this is the default/base locale.
    pub fn is_default(&self) -> bool {
        self.config().is_default
    }

    /// Whether content in this locale renders right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.config().rtl
    }
}
