//! /access command plugin.
//!
//! The owner picks, from a keyboard, which admins may open configuration
//! sessions for the group they are configuring.

use chrono::{DateTime, Utc};
use teloxide::prelude::*;

use super::report;
use crate::bot::dispatcher::AppState;
use crate::bot::messenger::SendOptions;
use crate::utils::html_escape;

/// Handle the /access command.
pub async fn access_command(msg: Message, state: AppState) -> anyhow::Result<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    send_access_menu(&state, user.id, Utc::now()).await
}

pub async fn send_access_menu(
    state: &AppState,
    requester: UserId,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let menu = match state.access.request(requester, now).await {
        Ok(menu) => menu,
        Err(e) => return report(state, requester, e).await,
    };

    let title = html_escape(&menu.group.title);
    let private = ChatId::from(requester);
    if menu.controls.is_empty() {
        let text = format!("There are no other admins in <b>{title}</b>.");
        return state.messenger.send(private, &text, SendOptions::html()).await;
    }

    let text = format!("Admins allowed to configure <b>{title}</b>:");
    state
        .messenger
        .send(private, &text, SendOptions::html().with_controls(menu.controls))
        .await
}
