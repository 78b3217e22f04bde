//! Enumerated moderation flags.
//!
//! The set is closed. New flags are appended, existing names are never
//! renamed because they are both the stored field name and the callback
//! payload.

use std::fmt;
use std::str::FromStr;

use crate::error::GuardError;

/// A named boolean moderation setting on a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFlag {
    JoinedMsg,
    PinnedMsg,
    ArabicMsg,
    UrlMsg,
    DeleteCommands,
    RestrictSpam,
    HelloMsg,
    AllowAdminsToConfigure,
}

impl ConfigFlag {
    /// Render order of the configuration keyboard.
    pub const ALL: [ConfigFlag; 8] = [
        Self::JoinedMsg,
        Self::PinnedMsg,
        Self::ArabicMsg,
        Self::UrlMsg,
        Self::DeleteCommands,
        Self::RestrictSpam,
        Self::HelloMsg,
        Self::AllowAdminsToConfigure,
    ];

    /// Stored field name, also used in callback tokens.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JoinedMsg => "joinedMsg",
            Self::PinnedMsg => "pinnedMsg",
            Self::ArabicMsg => "arabicMsg",
            Self::UrlMsg => "urlMsg",
            Self::DeleteCommands => "deleteCommands",
            Self::RestrictSpam => "restrictSpam",
            Self::HelloMsg => "helloMsg",
            Self::AllowAdminsToConfigure => "allowAdminsToConfigure",
        }
    }

    /// Button caption.
    pub fn description(&self) -> &'static str {
        match self {
            Self::JoinedMsg => "Delete 'joined' messages",
            Self::PinnedMsg => "Delete 'pinned' messages",
            Self::ArabicMsg => "Delete arabic messages",
            Self::UrlMsg => "Delete messages with urls",
            Self::DeleteCommands => "Delete messages with commands",
            Self::RestrictSpam => "Restrict spam",
            Self::HelloMsg => "Hello message for new members",
            Self::AllowAdminsToConfigure => "Allow admins to configure bot",
        }
    }

    /// Default value for freshly created groups.
    pub fn default_value(&self) -> bool {
        false
    }

    /// Only the chat owner may flip this flag.
    pub fn owner_only(&self) -> bool {
        matches!(self, Self::AllowAdminsToConfigure)
    }
}

impl FromStr for ConfigFlag {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s)
            .ok_or_else(|| GuardError::UnknownFlag(s.to_string()))
    }
}

impl fmt::Display for ConfigFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
