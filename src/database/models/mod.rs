//! Persisted record shapes.

pub mod access_grant;
pub mod flags;
pub mod group_config;
pub mod session;
pub mod warn_record;

pub use access_grant::AccessGrant;
pub use flags::ConfigFlag;
pub use group_config::GroupConfig;
pub use session::{ConfigSession, GroupRef};
pub use warn_record::WarnRecord;
