//! Configuration access grants.

use serde::{Deserialize, Serialize};

/// Admins the owner has allowed to open configuration sessions.
///
/// Only consulted while `allowAdminsToConfigure` is on. No record, or an
/// empty list, leaves configuration to the owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    pub group_id: i64,
    #[serde(default)]
    pub admins: Vec<i64>,
}

impl AccessGrant {
    pub fn contains(&self, user_id: i64) -> bool {
        self.admins.contains(&user_id)
    }
}
