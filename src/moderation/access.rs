//! Who besides the owner may open configuration sessions.
//!
//! With `allowAdminsToConfigure` off only the owner configures. With it on,
//! the admins the owner picked through `/access` may configure as well. No
//! picks means owner only, matching what the `/access` menu shows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, UserId};

use crate::database::{AccessRepository, GroupConfig, GroupRef, SessionRepository};
use crate::error::{GuardError, GuardResult};
use crate::keyboard::{Control, render_access};
use crate::permissions::{AdminEntry, AdminRole, ChatDirectory, is_admin, is_owner};

/// Menu listing the group's admins with their grant state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessMenu {
    pub group: GroupRef,
    pub controls: Vec<Control>,
}

/// Result of a menu selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessChange {
    pub admin: UserId,
    pub granted: bool,
    pub controls: Vec<Control>,
}

pub struct AccessWorkflow {
    sessions: Arc<SessionRepository>,
    grants: AccessRepository,
    directory: Arc<dyn ChatDirectory>,
}

impl AccessWorkflow {
    pub fn new(
        sessions: Arc<SessionRepository>,
        grants: AccessRepository,
        directory: Arc<dyn ChatDirectory>,
    ) -> Self {
        Self {
            sessions,
            grants,
            directory,
        }
    }

    async fn admins(&self, group: ChatId) -> GuardResult<Vec<AdminEntry>> {
        self.directory
            .list_admins(group)
            .await
            .map_err(GuardError::Transport)
    }

    /// Whether `user` may open a configuration session for `config`'s group.
    pub async fn may_configure(
        &self,
        config: &GroupConfig,
        admins: &[AdminEntry],
        user: UserId,
    ) -> GuardResult<bool> {
        if is_owner(admins, user) {
            return Ok(true);
        }
        if !is_admin(admins, user) || !config.allow_admins_to_configure {
            return Ok(false);
        }
        let grant = self.grants.get(ChatId(config.group_id)).await?;
        Ok(grant.is_some_and(|g| g.contains(user.0 as i64)))
    }

    /// Build the grant menu for the group `requester` is configuring.
    pub async fn request(&self, requester: UserId, now: DateTime<Utc>) -> GuardResult<AccessMenu> {
        let group = self
            .sessions
            .resolve_active_group(requester, now)
            .await?
            .ok_or(GuardError::SessionExpired)?;
        let chat = ChatId(group.id);

        let admins = self.admins(chat).await?;
        if !is_owner(&admins, requester) {
            return Err(GuardError::PermissionDenied(
                "only the chat owner can manage configuration access",
            ));
        }

        let controls = self.render(chat, &admins).await?;
        Ok(AccessMenu { group, controls })
    }

    /// Apply a selection from the grant menu.
    pub async fn select(
        &self,
        clicker: UserId,
        group_id: i64,
        admin_id: Option<u64>,
    ) -> GuardResult<AccessChange> {
        let admin = admin_id
            .map(UserId)
            .ok_or_else(|| GuardError::MalformedCallback(format!("access#{group_id}")))?;
        let chat = ChatId(group_id);

        let admins = self.admins(chat).await?;
        if !is_owner(&admins, clicker) {
            return Err(GuardError::PermissionDenied(
                "only the chat owner can manage configuration access",
            ));
        }
        let selectable = admins
            .iter()
            .any(|a| a.user_id == admin && a.role == AdminRole::Administrator);
        if !selectable {
            return Err(GuardError::MalformedCallback(format!(
                "access#{group_id}#{}",
                admin.0
            )));
        }

        let granted = self.grants.toggle_admin(chat, admin).await?;
        let controls = self.render(chat, &admins).await?;
        Ok(AccessChange {
            admin,
            granted,
            controls,
        })
    }

    async fn render(&self, chat: ChatId, admins: &[AdminEntry]) -> GuardResult<Vec<Control>> {
        let moderators: Vec<AdminEntry> = admins
            .iter()
            .filter(|a| a.role != AdminRole::Owner)
            .cloned()
            .collect();
        let grant = self.grants.get(chat).await?;
        Ok(render_access(chat.0, &moderators, grant.as_ref()))
    }
}
