//! Configuration session models.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// Snapshot of the group a session was opened for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "supergroup".to_string()
}

impl GroupRef {
    pub fn supergroup(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            kind: default_kind(),
        }
    }
}

/// Binding of a configuring user to one group. Keyed by `user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSession {
    pub user: i64,
    pub group: GroupRef,
    /// When the session was (re)opened.
    pub date: DateTime,
}
