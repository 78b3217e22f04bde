//! Configuration session repository.
//!
//! A session is live while `now - date < ttl`. Expiry is a query predicate,
//! nothing deletes stale sessions; a retention job outside the bot may prune
//! them.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc};
use teloxide::types::UserId;
use tracing::{debug, info};

use crate::database::models::{ConfigSession, GroupRef};
use crate::database::store::Store;
use crate::error::{GuardError, GuardResult};

use super::{to_bson_date, user_key};

const SESSIONS: &str = "config_sessions";
const HISTORY: &str = "user_groups";

/// Repository for configuration sessions.
pub struct SessionRepository {
    store: Arc<dyn Store>,
    ttl: Duration,
}

impl SessionRepository {
    pub fn new(store: Arc<dyn Store>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Open or replace the user's session. Last writer wins.
    pub async fn begin(&self, user: UserId, group: &GroupRef, now: DateTime<Utc>) -> GuardResult<()> {
        let group_bson = bson::to_bson(group).map_err(GuardError::storage)?;
        self.store
            .update_one(
                SESSIONS,
                doc! { "user": user_key(user) },
                doc! { "$set": { "group": group_bson, "date": to_bson_date(now) } },
                true,
            )
            .await
            .map_err(GuardError::Storage)?;

        info!("User {} is now configuring group {}", user, group.id);
        Ok(())
    }

    /// Group the user is currently configuring, if the session is still live.
    pub async fn resolve_active_group(
        &self,
        user: UserId,
        now: DateTime<Utc>,
    ) -> GuardResult<Option<GroupRef>> {
        let cutoff = now.timestamp_millis() - self.ttl.as_millis() as i64;
        let filter = doc! {
            "user": user_key(user),
            "date": { "$gt": bson::DateTime::from_millis(cutoff) },
        };

        let found = self
            .store
            .find_one(SESSIONS, filter)
            .await
            .map_err(GuardError::Storage)?;
        debug!("Live session lookup for {}: {}", user, found.is_some());

        match found {
            Some(document) => {
                let session: ConfigSession =
                    bson::from_document(document).map_err(GuardError::storage)?;
                Ok(Some(session.group))
            }
            None => Ok(None),
        }
    }

    /// Append to the user's history of configured groups.
    pub async fn record_history(
        &self,
        user: UserId,
        group: &GroupRef,
        now: DateTime<Utc>,
    ) -> GuardResult<()> {
        let session = ConfigSession {
            user: user_key(user),
            group: group.clone(),
            date: to_bson_date(now),
        };
        let document = bson::to_document(&session).map_err(GuardError::storage)?;
        self.store
            .insert_one(HISTORY, document)
            .await
            .map_err(GuardError::Storage)
    }
}
