//! Repository module - data access layer over [`Store`](super::Store).

mod access_repository;
mod group_config_repository;
mod session_repository;
mod warns_repository;

pub use access_repository::AccessRepository;
pub use group_config_repository::{GroupConfigRepository, LinkChange};
pub use session_repository::SessionRepository;
pub use warns_repository::WarnsRepository;

use chrono::{DateTime, Utc};
use mongodb::bson;
use teloxide::types::UserId;

/// Telegram user IDs fit in 52 bits; stored as BSON int64.
pub(crate) fn user_key(user: UserId) -> i64 {
    user.0 as i64
}

pub(crate) fn to_bson_date(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}
