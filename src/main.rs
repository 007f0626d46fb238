//! Intake bot - collects a name, age and address over Telegram
//!
//! A per-user conversation state machine validates each answer and stores
//! the completed profile in SQLite; users can erase it again with /delete.

mod config;
mod db;
mod runtime;
mod state_machine;
mod telegram;
mod validate;

use config::{BotConfig, RunMode};
use db::Database;
use runtime::{DatabaseStorage, RuntimeManager};
use std::sync::Arc;
use teloxide::prelude::*;
use telegram::TelegramReplies;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intake_bot=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = BotConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;
    tracing::info!(
        mode = %config.mode,
        timeout_secs = config.conversation_timeout.as_secs(),
        "Intake bot starting"
    );

    // Ensure database directory exists
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Initialize database
    tracing::info!(path = %config.database_path.display(), "Opening database");
    let db = Database::open(&config.database_path)
        .and_then(|db| db.ping().map(|()| db))
        .inspect_err(|e| tracing::error!(error = %e, "Failed to connect to database"))?;

    let bot = Bot::new(&config.telegram_bot_token);
    let me = bot.get_me().await?;
    let bot_username = me.user.username.clone();
    tracing::info!(bot_id = me.user.id.0, "Authenticated with Telegram");

    let manager = Arc::new(RuntimeManager::new(
        DatabaseStorage::new(db),
        TelegramReplies::new(bot.clone()),
        config.conversation_timeout,
    ));

    match (config.mode, &config.webhook) {
        (RunMode::Production, Some(settings)) => {
            telegram::run_webhook(bot, manager, settings, config.port, bot_username).await?;
        }
        _ => telegram::run_polling(bot, manager, bot_username).await,
    }

    tracing::info!("Intake bot stopped");
    Ok(())
}
