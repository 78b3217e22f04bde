//! Inline keyboard callbacks.
//!
//! Tokens are decoded once into a [`CallbackPayload`] and dispatched by
//! purpose. Every query is answered, even when the payload is dropped.

use chrono::{DateTime, Utc};
use teloxide::prelude::*;
use tracing::{debug, info};

use super::report;
use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::bot::messenger::MessageRef;
use crate::keyboard::{CallbackPayload, decode};

/// Handle any callback query.
pub async fn callback_handler(
    bot: ThrottledBot,
    q: CallbackQuery,
    state: AppState,
) -> anyhow::Result<()> {
    let result = match (q.data.as_deref(), q.message.as_ref()) {
        (Some(data), Some(message)) => {
            let message = MessageRef {
                chat: message.chat().id,
                message: message.id(),
            };
            handle_callback(&state, q.from.id, data, message, Utc::now()).await
        }
        _ => Ok(()),
    };

    bot.answer_callback_query(&q.id).await?;
    result
}

/// Apply one keyboard selection and redraw the keyboard it came from.
pub async fn handle_callback(
    state: &AppState,
    clicker: UserId,
    data: &str,
    message: MessageRef,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let payload = match decode(data) {
        Ok(payload) => payload,
        Err(e) => return report(state, clicker, e).await,
    };
    debug!("{} callback from {}", payload.purpose(), clicker);

    let controls = match payload {
        CallbackPayload::Config { group_id, flag_name } => {
            match state.workflow.toggle(clicker, group_id, &flag_name, now).await {
                Ok(toggled) => {
                    info!(
                        "User {} set {} to {} in chat {}",
                        clicker, toggled.flag, toggled.value, group_id
                    );
                    toggled.controls
                }
                Err(e) => return report(state, clicker, e).await,
            }
        }
        CallbackPayload::Access { group_id, admin_id } => {
            match state.access.select(clicker, group_id, admin_id).await {
                Ok(change) => {
                    info!(
                        "Config access of {} in chat {} is now {}",
                        change.admin, group_id, change.granted
                    );
                    change.controls
                }
                Err(e) => return report(state, clicker, e).await,
            }
        }
    };

    state.messenger.edit_controls(&controls, message).await
}
