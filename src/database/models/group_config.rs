//! Per-group moderation configuration.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::flags::ConfigFlag;

/// Configuration document, one per group.
///
/// Field names are the persisted shape. Every field has a serde default so
/// partially written documents still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Telegram chat ID
    pub group_id: i64,

    #[serde(default)]
    pub joined_msg: bool,
    #[serde(default)]
    pub pinned_msg: bool,
    #[serde(default)]
    pub arabic_msg: bool,
    #[serde(default)]
    pub url_msg: bool,
    #[serde(default)]
    pub delete_commands: bool,
    #[serde(default)]
    pub restrict_spam: bool,
    #[serde(default)]
    pub hello_msg: bool,
    #[serde(default)]
    pub allow_admins_to_configure: bool,

    /// Normalised hosts/URLs exempt from the url filter.
    #[serde(default)]
    pub white_list: Vec<String>,

    /// 0 disables the limit.
    #[serde(default)]
    pub max_message_length: i64,

    /// Greeting template; `$name` is replaced with the member name.
    /// `None` means the built-in greeting.
    #[serde(default)]
    pub hello_msg_string: Option<String>,
}

impl GroupConfig {
    /// Create new group config with defaults.
    pub fn new(group_id: i64) -> Self {
        let mut config = Self {
            id: None,
            group_id,
            joined_msg: false,
            pinned_msg: false,
            arabic_msg: false,
            url_msg: false,
            delete_commands: false,
            restrict_spam: false,
            hello_msg: false,
            allow_admins_to_configure: false,
            white_list: Vec::new(),
            max_message_length: 0,
            hello_msg_string: None,
        };
        for flag in ConfigFlag::ALL {
            config.set_flag(flag, flag.default_value());
        }
        config
    }

    pub fn flag(&self, flag: ConfigFlag) -> bool {
        match flag {
            ConfigFlag::JoinedMsg => self.joined_msg,
            ConfigFlag::PinnedMsg => self.pinned_msg,
            ConfigFlag::ArabicMsg => self.arabic_msg,
            ConfigFlag::UrlMsg => self.url_msg,
            ConfigFlag::DeleteCommands => self.delete_commands,
            ConfigFlag::RestrictSpam => self.restrict_spam,
            ConfigFlag::HelloMsg => self.hello_msg,
            ConfigFlag::AllowAdminsToConfigure => self.allow_admins_to_configure,
        }
    }

    pub fn set_flag(&mut self, flag: ConfigFlag, value: bool) {
        let slot = match flag {
            ConfigFlag::JoinedMsg => &mut self.joined_msg,
            ConfigFlag::PinnedMsg => &mut self.pinned_msg,
            ConfigFlag::ArabicMsg => &mut self.arabic_msg,
            ConfigFlag::UrlMsg => &mut self.url_msg,
            ConfigFlag::DeleteCommands => &mut self.delete_commands,
            ConfigFlag::RestrictSpam => &mut self.restrict_spam,
            ConfigFlag::HelloMsg => &mut self.hello_msg,
            ConfigFlag::AllowAdminsToConfigure => &mut self.allow_admins_to_configure,
        };
        *slot = value;
    }
}
