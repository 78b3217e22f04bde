//! Message dispatcher setup.
//!
//! Builds the dispatcher with all command and callback handlers.

use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use super::messenger::{Messenger, TelegramMessenger};
use crate::cache::CacheRegistry;
use crate::config::EngineSettings;
use crate::database::{
    AccessRepository, GroupConfigRepository, SessionRepository, Store, WarnsRepository,
};
use crate::moderation::{AccessWorkflow, ConfigWorkflow, WarningLedger};
use crate::permissions::{BotIdentity, ChatDirectory, TelegramDirectory};
use crate::plugins;

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
///
/// Holds only services; no group, session or warn data lives here between
/// updates.
#[derive(Clone)]
pub struct AppState {
    /// Outbound messages.
    pub messenger: Arc<dyn Messenger>,

    /// Group configuration.
    pub configs: Arc<GroupConfigRepository>,

    /// `/config` sessions and keyboard toggles.
    pub workflow: Arc<ConfigWorkflow>,

    /// `/access` grants.
    pub access: Arc<AccessWorkflow>,

    /// Warn escalation.
    pub ledger: Arc<WarningLedger>,
}

impl AppState {
    /// Wire the services over the given collaborators.
    pub fn new(
        store: Arc<dyn Store>,
        directory: Arc<dyn ChatDirectory>,
        messenger: Arc<dyn Messenger>,
        me: BotIdentity,
        settings: EngineSettings,
    ) -> Self {
        let configs = Arc::new(GroupConfigRepository::new(store.clone()));
        let sessions = Arc::new(SessionRepository::new(store.clone(), settings.session_ttl));

        let access = Arc::new(AccessWorkflow::new(
            sessions.clone(),
            AccessRepository::new(store.clone()),
            directory.clone(),
        ));
        let workflow = Arc::new(ConfigWorkflow::new(
            sessions.clone(),
            configs.clone(),
            access.clone(),
            directory.clone(),
            me.clone(),
        ));
        let ledger = Arc::new(WarningLedger::new(
            WarnsRepository::new(store),
            directory,
            messenger.clone(),
            me,
            settings.max_warns,
        ));

        Self {
            messenger,
            configs,
            workflow,
            access,
            ledger,
        }
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(
    bot: ThrottledBot,
    store: Arc<dyn Store>,
    cache: Arc<CacheRegistry>,
    me: BotIdentity,
    settings: EngineSettings,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    // Admin lookups go through the inner Bot; the throttle is for sends.
    let directory = Arc::new(TelegramDirectory::new(bot.inner().clone(), &cache));
    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = AppState::new(store, directory, messenger, me, settings);

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(Update::filter_message().branch(plugins::command_handler()))
        .branch(plugins::callback_handler())
}
