//! Warn ledger record.

use serde::{Deserialize, Serialize};

/// Infraction counter for one (user, group) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarnRecord {
    pub user: i64,
    pub group: i64,
    #[serde(default)]
    pub warn: i64,
}
