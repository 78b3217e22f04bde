//! Outbound messaging.
//!
//! Engine code sends through [`Messenger`] so it never depends on the
//! concrete bot type.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};

use super::dispatcher::ThrottledBot;
use crate::keyboard::Control;

/// Optional parts of an outgoing message.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Parse the text as HTML.
    pub html: bool,
    /// Inline keyboard, one control per row.
    pub controls: Option<Vec<Control>>,
}

impl SendOptions {
    pub fn html() -> Self {
        Self {
            html: true,
            controls: None,
        }
    }

    #[must_use]
    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = Some(controls);
        self
    }
}

/// A message the bot sent earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat: ChatId,
    pub message: MessageId,
}

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, target: ChatId, text: &str, options: SendOptions) -> anyhow::Result<()>;

    /// Replace the inline keyboard of an existing message.
    async fn edit_controls(&self, controls: &[Control], message: MessageRef) -> anyhow::Result<()>;

    async fn remove_member(&self, group: ChatId, user: UserId) -> anyhow::Result<()>;

    async fn restore_member(&self, group: ChatId, user: UserId) -> anyhow::Result<()>;

    async fn delete_message(&self, group: ChatId, message: MessageId) -> anyhow::Result<()>;
}

fn markup(controls: &[Control]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(controls.iter().map(|c| {
        vec![InlineKeyboardButton::callback(c.label.clone(), c.token.clone())]
    }))
}

/// [`Messenger`] over the throttled Bot API client.
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: ThrottledBot,
}

impl TelegramMessenger {
    pub fn new(bot: ThrottledBot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, target: ChatId, text: &str, options: SendOptions) -> anyhow::Result<()> {
        let mut request = self.bot.send_message(target, text);
        if options.html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(controls) = options.controls {
            request = request.reply_markup(markup(&controls));
        }
        request.await?;
        Ok(())
    }

    async fn edit_controls(&self, controls: &[Control], message: MessageRef) -> anyhow::Result<()> {
        self.bot
            .edit_message_reply_markup(message.chat, message.message)
            .reply_markup(markup(controls))
            .await?;
        Ok(())
    }

    async fn remove_member(&self, group: ChatId, user: UserId) -> anyhow::Result<()> {
        self.bot.ban_chat_member(group, user).await?;
        Ok(())
    }

    async fn restore_member(&self, group: ChatId, user: UserId) -> anyhow::Result<()> {
        self.bot.unban_chat_member(group, user).await?;
        Ok(())
    }

    async fn delete_message(&self, group: ChatId, message: MessageId) -> anyhow::Result<()> {
        self.bot.delete_message(group, message).await?;
        Ok(())
    }
}
