//! Chat admin directory with caching.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatMember, ChatMemberKind};
use tracing::debug;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRole {
    Owner,
    Administrator,
}

/// One entry of a chat's admin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminEntry {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub role: AdminRole,
    pub can_delete_messages: bool,
    pub can_restrict_members: bool,
}

impl AdminEntry {
    /// Create an entry from a ChatMember. Non-admins yield `None`.
    fn from_chat_member(member: &ChatMember) -> Option<Self> {
        let (role, can_delete_messages, can_restrict_members) = match &member.kind {
            ChatMemberKind::Owner(_) => (AdminRole::Owner, true, true),
            ChatMemberKind::Administrator(admin) => (
                AdminRole::Administrator,
                admin.can_delete_messages,
                admin.can_restrict_members,
            ),
            _ => return None,
        };

        Some(Self {
            user_id: member.user.id,
            first_name: member.user.first_name.clone(),
            last_name: member.user.last_name.clone(),
            role,
            can_delete_messages,
            can_restrict_members,
        })
    }

    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

/// Source of chat admin lists.
#[async_trait]
pub trait ChatDirectory: Send + Sync {
    async fn list_admins(&self, group: ChatId) -> anyhow::Result<Vec<AdminEntry>>;
}

/// [`ChatDirectory`] backed by the Bot API, with a short-lived cache.
#[derive(Clone)]
pub struct TelegramDirectory {
    bot: Bot,
    cache: TypedCache<i64, Arc<Vec<AdminEntry>>>,
}

impl TelegramDirectory {
    pub fn new(bot: Bot, cache_registry: &CacheRegistry) -> Self {
        let cache = cache_registry.get_or_create(
            "chat_admins",
            CacheConfig::with_capacity(5_000).ttl(Duration::from_secs(30)),
        );

        Self { bot, cache }
    }
}

#[async_trait]
impl ChatDirectory for TelegramDirectory {
    async fn list_admins(&self, group: ChatId) -> anyhow::Result<Vec<AdminEntry>> {
        if let Some(cached) = self.cache.get(&group.0) {
            debug!("Admin list cache hit for chat {}", group);
            return Ok(cached.as_ref().clone());
        }

        debug!("Admin list cache miss for chat {}", group);
        let members = self.bot.get_chat_administrators(group).await?;
        let admins: Vec<AdminEntry> = members.iter().filter_map(AdminEntry::from_chat_member).collect();

        self.cache.insert(group.0, Arc::new(admins.clone()));
        Ok(admins)
    }
}
