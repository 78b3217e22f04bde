//! Groupguard - Telegram group moderation bot.
//!
//! Admins configure a group from their private chat: `/config` in the group
//! opens a short session, and the settings keyboard and private setters act
//! on that group until the session expires. `/warn` escalates to a kick.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - MongoDB store, models and repositories
//! - `cache` - Moka caches for Telegram lookups
//! - `permissions` - Admin lists and role checks
//! - `keyboard` - Inline keyboards and callback tokens
//! - `moderation` - Sessions, access grants and warn escalation
//! - `bot` - Dispatcher, outbound messaging, polling/webhook runtime
//! - `plugins` - Command and callback handlers
//! - `utils` - Utility functions

mod bot;
mod cache;
mod config;
mod database;
mod error;
mod keyboard;
mod moderation;
mod permissions;
mod plugins;
#[cfg(test)]
mod testing;
mod utils;

use std::sync::Arc;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cache::CacheRegistry;
use config::Config;
use database::Database;
use permissions::BotIdentity;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("groupguard=info,teloxide=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting groupguard...");

    let config = Config::from_env();
    info!("Bot mode: {:?}", config.bot_mode);
    info!(
        "Session TTL {}s, warn limit {}",
        config.engine.session_ttl.as_secs(),
        config.engine.max_warns
    );

    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    db.ensure_indexes().await?;
    info!("Database connected");

    let cache = Arc::new(CacheRegistry::new());

    // Throttle keeps sends within Telegram's global and per-chat limits.
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());

    let me = bot.get_me().await?;
    let identity = BotIdentity {
        user_id: me.id,
        username: me.username().to_string(),
    };
    info!("Bot username: @{}", identity.username);

    let dispatcher = bot::build_dispatcher(
        bot.clone(),
        Arc::new(db),
        cache,
        identity,
        config.engine,
    );

    bot::run(&config, dispatcher, bot).await
}
