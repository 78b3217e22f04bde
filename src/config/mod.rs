//! Configuration module for Groupguard bot.
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use serde::Deserialize;

/// Bot running mode
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
}

/// Tunables for the session and escalation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// How long a `/config` session stays live.
    pub session_ttl: Duration,

    /// Warnings that trigger expulsion.
    pub max_warns: i64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(600),
            max_warns: 3,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<String>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,

    // Engine
    pub engine: EngineSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if required environment variables are not set.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let bot_mode = parse_bot_mode(&env::var("BOT_MODE").unwrap_or_default());
        let webhook_url = env::var("WEBHOOK_URL").ok().filter(|s| !s.is_empty());

        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            panic!("WEBHOOK_URL must be set when BOT_MODE is webhook");
        }

        let webhook_port = env::var("WEBHOOK_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(8443);

        let defaults = EngineSettings::default();
        let engine = EngineSettings {
            session_ttl: env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            max_warns: env::var("MAX_WARNS")
                .ok()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_warns),
        };

        Self {
            bot_token: env::var("BOT_TOKEN").expect("BOT_TOKEN must be set"),
            bot_mode,
            webhook_url,
            webhook_port,
            webhook_secret: env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty()),
            mongodb_uri: env::var("MONGODB_URI").expect("MONGODB_URI must be set"),
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "groupguard".to_string()),
            engine,
        }
    }
}

fn parse_bot_mode(raw: &str) -> BotMode {
    match raw.trim().to_lowercase().as_str() {
        "webhook" => BotMode::Webhook,
        _ => BotMode::Polling,
    }
}
