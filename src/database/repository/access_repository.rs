//! Access grant repository.

use std::sync::Arc;

use mongodb::bson::{self, doc, Document};
use teloxide::types::{ChatId, UserId};
use tracing::info;

use crate::database::models::AccessGrant;
use crate::database::store::Store;
use crate::error::{GuardError, GuardResult};

use super::user_key;

const COLLECTION: &str = "config_access";

/// Repository for per-group configuration grants.
pub struct AccessRepository {
    store: Arc<dyn Store>,
}

impl AccessRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn filter(group: ChatId) -> Document {
        doc! { "groupId": group.0 }
    }

    /// Grant record for a group. `None` until the owner first edits it.
    pub async fn get(&self, group: ChatId) -> GuardResult<Option<AccessGrant>> {
        self.store
            .find_one(COLLECTION, Self::filter(group))
            .await
            .map_err(GuardError::Storage)?
            .map(|d| bson::from_document(d).map_err(GuardError::storage))
            .transpose()
    }

    /// Flip one admin's membership. Returns whether they hold a grant now.
    pub async fn toggle_admin(&self, group: ChatId, admin: UserId) -> GuardResult<bool> {
        let key = user_key(admin);
        let granted = self
            .get(group)
            .await?
            .is_some_and(|g| g.contains(key));

        let update = if granted {
            doc! { "$pullAll": { "admins": [key] } }
        } else {
            doc! { "$addToSet": { "admins": key } }
        };
        self.store
            .update_one(COLLECTION, Self::filter(group), update, true)
            .await
            .map_err(GuardError::Storage)?;

        info!("Config access for {} in {}: {}", admin, group, !granted);
        Ok(!granted)
    }
}
