//! Warns repository.
//!
//! One counter per (user, group). No caching: the counter must be read
//! straight after the atomic increment.

use std::sync::Arc;

use mongodb::bson::{self, doc, Document};
use teloxide::types::{ChatId, UserId};
use tracing::debug;

use crate::database::models::WarnRecord;
use crate::database::store::Store;
use crate::error::{GuardError, GuardResult};

use super::user_key;

const COLLECTION: &str = "warns";

/// Repository for warn counters.
pub struct WarnsRepository {
    store: Arc<dyn Store>,
}

impl WarnsRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn filter(user: UserId, group: ChatId) -> Document {
        doc! { "user": user_key(user), "group": group.0 }
    }

    /// Add one warning and return the new count.
    pub async fn increment(&self, user: UserId, group: ChatId) -> GuardResult<i64> {
        let count = self
            .store
            .increment(COLLECTION, Self::filter(user, group), "warn", 1)
            .await
            .map_err(GuardError::Storage)?;
        debug!("Warn count for {} in {} is {}", user, group, count);
        Ok(count)
    }

    /// Reset the counter to zero. Returns false when no record exists.
    pub async fn reset(&self, user: UserId, group: ChatId) -> GuardResult<bool> {
        let outcome = self
            .store
            .update_one(
                COLLECTION,
                Self::filter(user, group),
                doc! { "$set": { "warn": 0_i64 } },
                false,
            )
            .await
            .map_err(GuardError::Storage)?;
        Ok(outcome.matched > 0)
    }

    /// Current count, zero when no record exists.
    pub async fn count(&self, user: UserId, group: ChatId) -> GuardResult<i64> {
        let found = self
            .store
            .find_one(COLLECTION, Self::filter(user, group))
            .await
            .map_err(GuardError::Storage)?;
        let record: Option<WarnRecord> = found
            .map(|d| bson::from_document(d).map_err(GuardError::storage))
            .transpose()?;
        Ok(record.map(|r| r.warn).unwrap_or(0))
    }
}
