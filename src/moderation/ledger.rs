//! Warn escalation.
//!
//! Each warning bumps a per (user, group) counter. Reaching the limit resets
//! the counter and kicks the member (ban then immediate unban, so they may
//! rejoin). Counter and kick are separate outcomes: a failed kick leaves the
//! reset in place.

use std::sync::Arc;

use teloxide::types::{ChatId, UserId};
use tracing::{info, warn};

use crate::bot::messenger::Messenger;
use crate::database::WarnsRepository;
use crate::error::{GuardError, GuardResult};
use crate::permissions::{BotIdentity, ChatDirectory, is_admin};

/// Outcome of a single warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarnReport {
    /// Count after this warning, before any reset.
    pub count: i64,
    pub limit: i64,
    /// The member was removed from the group.
    pub kicked: bool,
}

impl WarnReport {
    pub fn limit_reached(&self) -> bool {
        self.count >= self.limit
    }
}

pub struct WarningLedger {
    warns: WarnsRepository,
    directory: Arc<dyn ChatDirectory>,
    messenger: Arc<dyn Messenger>,
    me: BotIdentity,
    limit: i64,
}

impl WarningLedger {
    pub fn new(
        warns: WarnsRepository,
        directory: Arc<dyn ChatDirectory>,
        messenger: Arc<dyn Messenger>,
        me: BotIdentity,
        limit: i64,
    ) -> Self {
        Self {
            warns,
            directory,
            messenger,
            me,
            limit,
        }
    }

    /// Warn `target` on behalf of `actor`.
    ///
    /// Only admins may warn; admins and the bot itself cannot be warned.
    pub async fn warn(&self, group: ChatId, actor: UserId, target: UserId) -> GuardResult<WarnReport> {
        let admins = self
            .directory
            .list_admins(group)
            .await
            .map_err(GuardError::Transport)?;

        if !is_admin(&admins, actor) {
            return Err(GuardError::PermissionDenied("only admins can warn"));
        }
        if target == self.me.user_id || is_admin(&admins, target) {
            return Err(GuardError::ProtectedTarget(target.0));
        }

        let count = self.warns.increment(target, group).await?;
        info!("User {} warned in chat {} ({}/{})", target, group, count, self.limit);

        let mut report = WarnReport {
            count,
            limit: self.limit,
            kicked: false,
        };
        if !report.limit_reached() {
            return Ok(report);
        }

        self.warns.reset(target, group).await?;
        report.kicked = match self.expel(group, target).await {
            Ok(()) => {
                info!("User {} reached warn limit in chat {}, kicked", target, group);
                true
            }
            Err(e) => {
                warn!("Failed to kick {} from chat {}: {}", target, group, e);
                false
            }
        };

        Ok(report)
    }

    /// Clear `target`'s warnings and return how many were cleared.
    pub async fn unwarn(&self, group: ChatId, actor: UserId, target: UserId) -> GuardResult<i64> {
        let admins = self
            .directory
            .list_admins(group)
            .await
            .map_err(GuardError::Transport)?;

        if !is_admin(&admins, actor) {
            return Err(GuardError::PermissionDenied("only admins can remove warnings"));
        }

        let cleared = self.warns.count(target, group).await?;
        if cleared == 0 {
            return Ok(0);
        }
        self.warns.reset(target, group).await?;
        info!("{} warnings for {} in chat {} cleared by {}", cleared, target, group, actor);
        Ok(cleared)
    }

    async fn expel(&self, group: ChatId, user: UserId) -> GuardResult<()> {
        self.messenger
            .remove_member(group, user)
            .await
            .map_err(GuardError::Transport)?;
        self.messenger
            .restore_member(group, user)
            .await
            .map_err(GuardError::Transport)
    }
}
