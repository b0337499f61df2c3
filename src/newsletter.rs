//! Newsletter subscription service.
//!
//! The only stateful content type: a subscription is either `active` or
//! `unsubscribed`, and transitions happen only through explicit subscribe
//! and unsubscribe calls. Subscribing an already-active address is a no-op
//! that returns the existing record; subscribing an unsubscribed address
//! reactivates it, refreshing `subscribed_at` while `first_subscribed_at`
//! keeps the original timestamp. Unsubscribing is idempotent.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ServiceError};
use crate::store::ContentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Unsubscribed,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Unsubscribed => "unsubscribed",
        }
    }

    /// Parse a stored status. Unknown values read as unsubscribed rather
    /// than failing the whole row.
    pub fn from_str_lossy(value: &str) -> SubscriptionStatus {
        match value {
            "active" => SubscriptionStatus::Active,
            _ => SubscriptionStatus::Unsubscribed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub email: String,
    pub status: SubscriptionStatus,
    pub subscribed_at: String,
    pub first_subscribed_at: String,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

#[derive(Clone)]
pub struct NewsletterService {
    store: ContentStore,
}

impl NewsletterService {
    pub fn new(store: ContentStore) -> Self {
        Self { store }
    }

    /// Subscribe an address.
    ///
    /// New addresses are inserted active; unsubscribed addresses are
    /// reactivated; already-active addresses are returned unchanged.
    pub async fn subscribe(&self, email: &str) -> Result<Subscription> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ServiceError::validation(
                "newsletter",
                format!("'{}' is not a valid email address", email),
            ));
        }

        match self.store.find_subscriber(&email)? {
            Some(existing) if existing.is_active() => {
                debug!(email = %email, "subscribe no-op, address already active");
                Ok(existing)
            }
            Some(_) => {
                let subscription = self.store.reactivate_subscriber(&email)?;
                info!(email = %email, "reactivated newsletter subscription");
                Ok(subscription)
            }
            None => {
                let subscription = self.store.insert_subscriber(&email)?;
                info!(email = %email, "new newsletter subscription");
                Ok(subscription)
            }
        }
    }

    /// Unsubscribe an address. Idempotent: unknown or already-unsubscribed
    /// addresses report `false` without erroring.
    pub async fn unsubscribe(&self, email: &str) -> Result<bool> {
        let email = email.trim().to_lowercase();
        match self.store.find_subscriber(&email)? {
            Some(existing) if existing.is_active() => {
                let changed = self.store.mark_unsubscribed(&email)?;
                info!(email = %email, "newsletter unsubscribe");
                Ok(changed)
            }
            _ => {
                debug!(email = %email, "unsubscribe no-op, address not active");
                Ok(false)
            }
        }
    }

    pub async fn get(&self, email: &str) -> Result<Option<Subscription>> {
        self.store.find_subscriber(&email.trim().to_lowercase())
    }

    pub async fn list_active(&self) -> Result<Vec<Subscription>> {
        self.store.list_active_subscribers()
    }
}
