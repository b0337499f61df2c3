use anyhow::{bail, Context, Result};

use crate::i18n::LocaleRegistry;

#[derive(Debug, Clone)]
pub struct Config {
    // SQLite database file backing the content store
    pub database_path: String,

    // Locale served when a request carries no usable hint; must be one of
    // the registered codes
    pub fallback_locale: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_path = std::env::var("DATABASE_PATH").context("DATABASE_PATH not set")?;

        let fallback_locale = std::env::var("FALLBACK_LOCALE")
            .unwrap_or_else(|_| LocaleRegistry::get().default_locale().code.to_string());
        if !LocaleRegistry::get().is_supported(&fallback_locale) {
            bail!(
                "FALLBACK_LOCALE '{}' is not a supported locale (expected one of {:?})",
                fallback_locale,
                LocaleRegistry::get().codes()
            );
        }

        Ok(Self {
            database_path,
            fallback_locale,
        })
    }
}
