//! Plugin system for command handlers.
//!
//! Each plugin exposes thin teloxide endpoints that pull ids out of the
//! update and pass them to a plain async function over [`AppState`], which
//! is what the tests drive.

pub mod access;
pub mod callback;
pub mod config;
pub mod settings;
pub mod start;
pub mod warn;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, warn};

use crate::bot::dispatcher::AppState;
use crate::bot::messenger::SendOptions;
use crate::error::GuardError;
use crate::utils::html_escape;

/// Reply for session-bound commands sent without a live session.
pub const NO_SESSION: &str = "You are currently not editing any groups. \
Send /config to the group chat you want to configure.";

/// All bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start(String),

    #[command(description = "Show help")]
    Help,

    #[command(description = "Configure this group (send in the group)")]
    Config,

    #[command(rename = "set_hello", description = "Set the greeting for new members")]
    SetHello(String),

    #[command(description = "Add links to the url whitelist")]
    Whitelist(String),

    #[command(description = "Remove links from the url whitelist")]
    Unwhitelist(String),

    #[command(description = "Set the maximum message length")]
    Maxlength(String),

    #[command(description = "Warn the replied user")]
    Warn,

    #[command(description = "Reset warnings of the replied user")]
    Unwarn,

    #[command(description = "Choose admins allowed to configure the group")]
    Access,
}

/// Build the combined command handler.
pub fn command_handler() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start(args)].endpoint(start::start_command))
        .branch(case![Command::Help].endpoint(start::help_command))
        .branch(case![Command::Config].endpoint(config::config_command))
        .branch(case![Command::SetHello(text)].endpoint(settings::set_hello_command))
        .branch(case![Command::Whitelist(args)].endpoint(settings::whitelist_command))
        .branch(case![Command::Unwhitelist(args)].endpoint(settings::unwhitelist_command))
        .branch(case![Command::Maxlength(args)].endpoint(settings::maxlength_command))
        .branch(case![Command::Warn].endpoint(warn::warn_command))
        .branch(case![Command::Unwarn].endpoint(warn::unwarn_command))
        .branch(case![Command::Access].endpoint(access::access_command))
}

/// Build the callback query handler.
pub fn callback_handler() -> UpdateHandler<anyhow::Error> {
    Update::filter_callback_query().endpoint(callback::callback_handler)
}

/// Turn a refused operation into a private reply to `user`.
///
/// Storage and transport failures are returned to the dispatcher. The reply
/// itself is best effort, since the user may never have started the bot.
pub(crate) async fn report(state: &AppState, user: UserId, err: GuardError) -> anyhow::Result<()> {
    let text = match err {
        GuardError::PermissionDenied(reason) => format!("<i>{}</i>", html_escape(reason)),
        GuardError::SessionExpired => NO_SESSION.to_string(),
        GuardError::ProtectedTarget(target) => {
            debug!("Ignored action against protected user {}", target);
            return Ok(());
        }
        err if err.is_silent() => {
            warn!("Dropped update: {}", err);
            return Ok(());
        }
        err => return Err(err.into()),
    };

    if let Err(e) = state
        .messenger
        .send(ChatId::from(user), &text, SendOptions::html())
        .await
    {
        debug!("Could not reach user {} in private: {}", user, e);
    }
    Ok(())
}
