//! Error taxonomy for the content services.
//!
//! Malformed stored data (a `translations` or JSON-array field that fails to
//! parse) is deliberately not represented here: it is recovered at the
//! storage boundary by normalizing to an empty mapping or sequence and never
//! reaches callers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Required fields missing or payload empty.
    #[error("validation failed for {entity}: {reason}")]
    Validation {
        entity: &'static str,
        reason: String,
    },

    /// Lookup by id yielded nothing where an existing record was required.
    #[error("{entity} record {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Any other store failure, propagated unchanged. No retries.
    #[error("persistence failure: {0}")]
    Persistence(#[from] rusqlite::Error),
}

impl ServiceError {
    pub fn validation(entity: &'static str, reason: impl Into<String>) -> Self {
        ServiceError::Validation {
            entity,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
