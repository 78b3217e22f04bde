//! Private-chat setters for the group being configured.
//!
//! `/set_hello`, `/whitelist`, `/unwhitelist` and `/maxlength` act on the
//! group bound by the sender's live `/config` session, and only while the
//! sender is still allowed to configure it.

use chrono::{DateTime, Utc};
use teloxide::prelude::*;
use teloxide::types::MessageEntityKind;

use super::report;
use crate::bot::dispatcher::AppState;
use crate::bot::messenger::SendOptions;
use crate::database::{GroupRef, LinkChange};
use crate::utils::{html_escape, normalize_link};

/// Sender of a private-chat command.
fn private_sender(msg: &Message) -> Option<UserId> {
    if !msg.chat.is_private() {
        return None;
    }
    msg.from.as_ref().map(|u| u.id)
}

/// Links marked up in the message, normalised for the whitelist.
fn message_links(msg: &Message) -> Vec<String> {
    msg.parse_entities()
        .unwrap_or_default()
        .iter()
        .filter_map(|entity| match entity.kind() {
            MessageEntityKind::Url => Some(normalize_link(entity.text())),
            MessageEntityKind::TextLink { url } => Some(normalize_link(url.as_str())),
            _ => None,
        })
        .collect()
}

async fn bound_group(state: &AppState, user: UserId, now: DateTime<Utc>) -> anyhow::Result<Option<GroupRef>> {
    match state.workflow.editable_group(user, now).await {
        Ok(group) => Ok(Some(group)),
        Err(e) => report(state, user, e).await.map(|()| None),
    }
}

async fn reply(state: &AppState, user: UserId, text: &str) -> anyhow::Result<()> {
    state
        .messenger
        .send(ChatId::from(user), text, SendOptions::html())
        .await
}

/// Handle /set_hello.
pub async fn set_hello_command(msg: Message, state: AppState, text: String) -> anyhow::Result<()> {
    let Some(user) = private_sender(&msg) else {
        return Ok(());
    };
    set_hello(&state, user, &text, Utc::now()).await
}

/// Handle /whitelist.
pub async fn whitelist_command(msg: Message, state: AppState, args: String) -> anyhow::Result<()> {
    let Some(user) = private_sender(&msg) else {
        return Ok(());
    };
    whitelist(&state, user, &args, &message_links(&msg), Utc::now()).await
}

/// Handle /unwhitelist.
pub async fn unwhitelist_command(msg: Message, state: AppState, args: String) -> anyhow::Result<()> {
    let Some(user) = private_sender(&msg) else {
        return Ok(());
    };
    unwhitelist(&state, user, &args, &message_links(&msg), Utc::now()).await
}

/// Handle /maxlength.
pub async fn maxlength_command(msg: Message, state: AppState, args: String) -> anyhow::Result<()> {
    let Some(user) = private_sender(&msg) else {
        return Ok(());
    };
    max_length(&state, user, &args, Utc::now()).await
}

/// Store the greeting template. Empty text restores the default greeting.
pub async fn set_hello(state: &AppState, user: UserId, text: &str, now: DateTime<Utc>) -> anyhow::Result<()> {
    let Some(group) = bound_group(state, user, now).await? else {
        return Ok(());
    };

    let stored = state
        .configs
        .set_hello_message(ChatId(group.id), Some(text))
        .await?;
    let answer = match stored {
        Some(_) => format!("Hello message for <b>{}</b> updated.", html_escape(&group.title)),
        None => format!(
            "Hello message for <b>{}</b> reset to the default.",
            html_escape(&group.title)
        ),
    };
    reply(state, user, &answer).await
}

fn change_lines(changes: &[LinkChange], present: &str, absent: &str) -> String {
    changes
        .iter()
        .map(|c| {
            let verdict = if c.was_present { present } else { absent };
            format!("{} - {}", html_escape(&c.link), verdict)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Add links to the whitelist, or list it when no argument is given.
pub async fn whitelist(
    state: &AppState,
    user: UserId,
    args: &str,
    links: &[String],
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let Some(group) = bound_group(state, user, now).await? else {
        return Ok(());
    };
    let chat = ChatId(group.id);

    if args.trim().is_empty() {
        let listed = state.configs.white_list(chat).await?;
        let answer = if listed.is_empty() {
            "Whitelist is empty.".to_string()
        } else {
            let items: Vec<String> = listed.iter().map(|l| html_escape(l)).collect();
            format!("Whitelisted links:\n{}", items.join("\n"))
        };
        return reply(state, user, &answer).await;
    }
    if links.is_empty() {
        return reply(state, user, "No links provided.").await;
    }

    let changes = state.configs.add_to_white_list(chat, links).await?;
    reply(state, user, &change_lines(&changes, "Already in whitelist", "Added")).await
}

/// Remove links from the whitelist. A lone `-` clears it.
pub async fn unwhitelist(
    state: &AppState,
    user: UserId,
    args: &str,
    links: &[String],
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let Some(group) = bound_group(state, user, now).await? else {
        return Ok(());
    };
    let chat = ChatId(group.id);

    if args.trim() == "-" {
        state.configs.set_white_list(chat, &[]).await?;
        return reply(state, user, "Whitelist cleared.").await;
    }
    if links.is_empty() {
        return reply(state, user, "No links provided.").await;
    }

    let changes = state.configs.remove_from_white_list(chat, links).await?;
    reply(state, user, &change_lines(&changes, "Deleted", "Not in whitelist")).await
}

/// Set the length limit. Anything that is not a positive number disables it.
pub async fn max_length(state: &AppState, user: UserId, arg: &str, now: DateTime<Utc>) -> anyhow::Result<()> {
    let Some(group) = bound_group(state, user, now).await? else {
        return Ok(());
    };

    let requested = arg.trim().parse::<i64>().unwrap_or(0);
    let length = state
        .configs
        .set_max_message_length(ChatId(group.id), requested)
        .await?;
    let answer = if length > 0 {
        format!("Max message length set to <b>{length}</b>.")
    } else {
        "Max message length limit disabled.".to_string()
    };
    reply(state, user, &answer).await
}
