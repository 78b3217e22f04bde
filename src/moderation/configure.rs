//! Remote configuration sessions.
//!
//! `/config` in a group binds the admin to that group for the session TTL.
//! Keyboard toggles and private setters then act on the bound group only.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, UserId};
use tracing::info;

use super::access::AccessWorkflow;
use crate::database::{ConfigFlag, GroupConfigRepository, GroupRef, SessionRepository};
use crate::error::{GuardError, GuardResult};
use crate::keyboard::{Control, render_config};
use crate::permissions::{AdminEntry, BotIdentity, ChatDirectory, bot_can_moderate, is_admin, is_owner};

/// Result of opening a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Session open, keyboard ready to send.
    Keyboard { group: GroupRef, controls: Vec<Control> },
    /// Session open, but the bot cannot moderate the group yet.
    MissingBotRights { group: GroupRef },
}

/// Result of a keyboard toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggled {
    pub flag: ConfigFlag,
    pub value: bool,
    pub controls: Vec<Control>,
}

pub struct ConfigWorkflow {
    sessions: Arc<SessionRepository>,
    configs: Arc<GroupConfigRepository>,
    access: Arc<AccessWorkflow>,
    directory: Arc<dyn ChatDirectory>,
    me: BotIdentity,
}

impl ConfigWorkflow {
    pub fn new(
        sessions: Arc<SessionRepository>,
        configs: Arc<GroupConfigRepository>,
        access: Arc<AccessWorkflow>,
        directory: Arc<dyn ChatDirectory>,
        me: BotIdentity,
    ) -> Self {
        Self {
            sessions,
            configs,
            access,
            directory,
            me,
        }
    }

    /// Handle `/config` sent by `actor` inside `group`.
    pub async fn open(&self, actor: UserId, group: GroupRef, now: DateTime<Utc>) -> GuardResult<OpenOutcome> {
        let chat = ChatId(group.id);
        let admins = self
            .directory
            .list_admins(chat)
            .await
            .map_err(GuardError::Transport)?;

        if !is_admin(&admins, actor) {
            return Err(GuardError::PermissionDenied("only admins can configure"));
        }

        let config = self.configs.ensure(chat).await?;
        if !self.access.may_configure(&config, &admins, actor).await? {
            return Err(GuardError::PermissionDenied("You are not allowed to configure this chat"));
        }

        self.sessions.begin(actor, &group, now).await?;

        if !bot_can_moderate(&admins, &self.me) {
            info!("Config of {} requested without enough bot rights", group.id);
            return Ok(OpenOutcome::MissingBotRights { group });
        }

        self.sessions.record_history(actor, &group, now).await?;
        let controls = render_config(&config);
        Ok(OpenOutcome::Keyboard { group, controls })
    }

    /// The group `user` is configuring right now.
    pub async fn active_group(&self, user: UserId, now: DateTime<Utc>) -> GuardResult<GroupRef> {
        self.sessions
            .resolve_active_group(user, now)
            .await?
            .ok_or(GuardError::SessionExpired)
    }

    /// The group `user` is configuring, provided they may still change it.
    pub async fn editable_group(&self, user: UserId, now: DateTime<Utc>) -> GuardResult<GroupRef> {
        let group = self.active_group(user, now).await?;
        self.authorize(user, ChatId(group.id)).await?;
        Ok(group)
    }

    /// Re-check the admin list and access rule against the stored config.
    async fn authorize(&self, user: UserId, chat: ChatId) -> GuardResult<Vec<AdminEntry>> {
        let admins = self
            .directory
            .list_admins(chat)
            .await
            .map_err(GuardError::Transport)?;
        let config = self
            .configs
            .get(chat)
            .await?
            .ok_or(GuardError::NotConfigured(chat.0))?;
        if !self.access.may_configure(&config, &admins, user).await? {
            return Err(GuardError::PermissionDenied("You are not allowed to configure this chat"));
        }
        Ok(admins)
    }

    /// Apply a keyboard selection.
    ///
    /// The clicker's live session must point at the token's group, so an
    /// old keyboard cannot edit a group the user is no longer configuring.
    /// Permission is checked again on every click.
    pub async fn toggle(
        &self,
        clicker: UserId,
        group_id: i64,
        flag_name: &str,
        now: DateTime<Utc>,
    ) -> GuardResult<Toggled> {
        let flag: ConfigFlag = flag_name.parse()?;
        let group = self.active_group(clicker, now).await?;
        if group.id != group_id {
            return Err(GuardError::SessionExpired);
        }
        let chat = ChatId(group_id);

        let admins = self.authorize(clicker, chat).await?;
        if flag.owner_only() && !is_owner(&admins, clicker) {
            return Err(GuardError::PermissionDenied("only the chat owner can change this"));
        }

        let value = self.configs.toggle(chat, flag.as_str()).await?;
        let config = self
            .configs
            .get(chat)
            .await?
            .ok_or(GuardError::NotConfigured(group_id))?;

        Ok(Toggled {
            flag,
            value,
            controls: render_config(&config),
        })
    }
}
