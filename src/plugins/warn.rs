//! Warning command handlers.
//!
//! `/warn` and `/unwarn` are sent by an admin as a reply to the member's
//! message.

use teloxide::prelude::*;

use super::report;
use crate::bot::dispatcher::AppState;
use crate::bot::messenger::SendOptions;
use crate::utils::html_escape;

/// Member a moderation command was aimed at.
#[derive(Debug, Clone)]
pub struct Target {
    pub id: UserId,
    pub name: String,
}

/// Resolve the acting user and the replied-to member of a group command.
fn command_parties(msg: &Message) -> Option<(UserId, Target)> {
    if !msg.chat.is_group() && !msg.chat.is_supergroup() {
        return None;
    }
    let actor = msg.from.as_ref()?.id;
    let target = msg.reply_to_message()?.from.as_ref()?;
    Some((
        actor,
        Target {
            id: target.id,
            name: target.first_name.clone(),
        },
    ))
}

/// Handle /warn command.
pub async fn warn_command(msg: Message, state: AppState) -> anyhow::Result<()> {
    let Some((actor, target)) = command_parties(&msg) else {
        return Ok(());
    };
    warn_member(&state, msg.chat.id, actor, &target).await
}

/// Handle /unwarn command.
pub async fn unwarn_command(msg: Message, state: AppState) -> anyhow::Result<()> {
    let Some((actor, target)) = command_parties(&msg) else {
        return Ok(());
    };
    unwarn_member(&state, msg.chat.id, actor, &target).await
}

pub async fn warn_member(
    state: &AppState,
    group: ChatId,
    actor: UserId,
    target: &Target,
) -> anyhow::Result<()> {
    let outcome = match state.ledger.warn(group, actor, target.id).await {
        Ok(r) => r,
        Err(e) => return report(state, actor, e).await,
    };

    let mut text = format!(
        "{} has been warned by admin. <b>{}/{}</b>",
        html_escape(&target.name),
        outcome.count,
        outcome.limit
    );
    if outcome.kicked {
        text.push_str("\nWarn limit reached, member removed from the group.");
    }

    state.messenger.send(group, &text, SendOptions::html()).await
}

pub async fn unwarn_member(
    state: &AppState,
    group: ChatId,
    actor: UserId,
    target: &Target,
) -> anyhow::Result<()> {
    match state.ledger.unwarn(group, actor, target.id).await {
        Ok(0) => Ok(()),
        Ok(cleared) => {
            let text = format!(
                "Warnings of {} have been reset. <b>{}</b> removed.",
                html_escape(&target.name),
                cleared
            );
            state.messenger.send(group, &text, SendOptions::html()).await
        }
        Err(e) => report(state, actor, e).await,
    }
}
