//! Role checks over a chat's admin list.
//!
//! Pure functions: callers fetch the list once per invocation through
//! [`ChatDirectory`](super::ChatDirectory) and ask as many questions as
//! they need.

use teloxide::types::UserId;

use super::directory::{AdminEntry, AdminRole};

/// Identity of this bot, fetched once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub user_id: UserId,
    pub username: String,
}

fn find(admins: &[AdminEntry], user: UserId) -> Option<&AdminEntry> {
    admins.iter().find(|a| a.user_id == user)
}

/// Whether `user` is an administrator or the owner.
pub fn is_admin(admins: &[AdminEntry], user: UserId) -> bool {
    find(admins, user).is_some()
}

/// Whether `user` is the chat owner.
pub fn is_owner(admins: &[AdminEntry], user: UserId) -> bool {
    find(admins, user).is_some_and(|a| a.role == AdminRole::Owner)
}

/// Whether the bot holds the rights moderation needs: deleting messages and
/// restricting members.
pub fn bot_can_moderate(admins: &[AdminEntry], me: &BotIdentity) -> bool {
    find(admins, me.user_id).is_some_and(|a| a.can_delete_messages && a.can_restrict_members)
}
