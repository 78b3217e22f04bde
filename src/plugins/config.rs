//! /config command plugin.
//!
//! Sent inside a supergroup, opens a configuration session for the sender
//! and delivers the settings keyboard to their private chat.

use chrono::{DateTime, Utc};
use teloxide::prelude::*;
use tracing::{debug, info};

use super::report;
use crate::bot::dispatcher::AppState;
use crate::bot::messenger::SendOptions;
use crate::database::GroupRef;
use crate::moderation::OpenOutcome;
use crate::utils::html_escape;

const PRIVATE_CHAT: &str = "You should use this command in the supergroup you want to configure.";
const BASIC_GROUP: &str = "Normal groups are not supported yet. Upgrade this group to a supergroup first!";
const MISSING_RIGHTS: &str = "Promote it to admin and grant it the 'delete messages' and 'ban users' rights.";

/// Handle the /config command.
pub async fn config_command(msg: Message, state: AppState) -> anyhow::Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    if msg.chat.is_private() {
        state
            .messenger
            .send(msg.chat.id, PRIVATE_CHAT, SendOptions::default())
            .await?;
        return Ok(());
    }
    if msg.chat.is_group() {
        state
            .messenger
            .send(msg.chat.id, BASIC_GROUP, SendOptions::default())
            .await?;
        return Ok(());
    }
    if !msg.chat.is_supergroup() {
        return Ok(());
    }

    // Keep the group clean; fails quietly without the delete right.
    if let Err(e) = state.messenger.delete_message(msg.chat.id, msg.id).await {
        debug!("Could not delete /config in {}: {}", msg.chat.id, e);
    }

    let group = GroupRef::supergroup(msg.chat.id.0, msg.chat.title().unwrap_or_default());
    open_session(&state, user.id, group, Utc::now()).await
}

/// Open a session for `actor` and send the outcome to their private chat.
pub async fn open_session(
    state: &AppState,
    actor: UserId,
    group: GroupRef,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let outcome = match state.workflow.open(actor, group, now).await {
        Ok(outcome) => outcome,
        Err(e) => return report(state, actor, e).await,
    };

    let private = ChatId::from(actor);
    match outcome {
        OpenOutcome::Keyboard { group, controls } => {
            info!("User {} is configuring chat {}", actor, group.id);
            let text = format!("<b>{}</b> settings", html_escape(&group.title));
            state
                .messenger
                .send(private, &text, SendOptions::html().with_controls(controls))
                .await?;
        }
        OpenOutcome::MissingBotRights { group } => {
            let text = format!(
                "<i>The bot does not have enough rights in <b>{}</b>! {}</i>",
                html_escape(&group.title),
                MISSING_RIGHTS
            );
            state
                .messenger
                .send(private, &text, SendOptions::html())
                .await?;
        }
    }
    Ok(())
}
