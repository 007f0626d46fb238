//! Telegram transport
//!
//! Delivers Telegram messages to the [`RuntimeManager`] either by long
//! polling (development) or through the webhook server (production), and
//! sends the runtime's replies back through the Bot API.

mod command;
mod webhook;

pub use command::to_inbound;
pub use webhook::{create_router, WebhookState};

use crate::config::WebhookSettings;
use crate::runtime::{ReplySink, RuntimeManager, TransportError, UserStore};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::AllowedUpdate;
use tower_http::trace::TraceLayer;

/// Sends replies as plain-text Telegram messages
#[derive(Clone)]
pub struct TelegramReplies {
    bot: Bot,
}

impl TelegramReplies {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ReplySink for TelegramReplies {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map(|_| ())
            .map_err(|e| TransportError(e.to_string()))
    }
}

/// Map a message and hand it to the runtime; failures are logged, not raised
async fn handle_message<S, R>(
    manager: &RuntimeManager<S, R>,
    msg: &Message,
    bot_username: Option<&str>,
) where
    S: UserStore + 'static,
    R: ReplySink + 'static,
{
    let Some(inbound) = to_inbound(msg, bot_username) else {
        tracing::debug!(chat_id = msg.chat.id.0, "Ignoring unsupported message");
        return;
    };
    if let Err(e) = manager.dispatch(inbound).await {
        tracing::error!(error = %e, "Failed to dispatch message");
    }
}

/// Run the long-polling dispatcher until Ctrl+C
pub async fn run_polling<S, R>(
    bot: Bot,
    manager: Arc<RuntimeManager<S, R>>,
    bot_username: Option<String>,
) where
    S: UserStore + 'static,
    R: ReplySink + 'static,
{
    tracing::info!("Starting bot in polling mode");

    // Drop any webhook left over from a production deployment
    if let Err(e) = bot.delete_webhook().await {
        tracing::warn!(error = %e, "Failed to delete webhook before polling");
    }

    let bot_username: Option<Arc<str>> = bot_username.map(Arc::from);
    let handler = Update::filter_message().endpoint(move |msg: Message| {
        let manager = Arc::clone(&manager);
        let bot_username = bot_username.clone();
        async move {
            handle_message(&manager, &msg, bot_username.as_deref()).await;
            respond(())
        }
    });

    Dispatcher::builder(bot, handler)
        .default_handler(|_| async {}) // Silently ignore non-message updates
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("Polling stopped");
}

/// Register the webhook with Telegram and serve it until Ctrl+C
pub async fn run_webhook<S, R>(
    bot: Bot,
    manager: Arc<RuntimeManager<S, R>>,
    settings: &WebhookSettings,
    port: u16,
    bot_username: Option<String>,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: UserStore + 'static,
    R: ReplySink + 'static,
{
    tracing::info!("Starting bot in webhook mode");

    let url = reqwest::Url::parse(&settings.url())?;
    tracing::info!(url = %url, "Registering webhook");
    bot.set_webhook(url)
        .secret_token(settings.secret.clone())
        .allowed_updates(vec![AllowedUpdate::Message])
        .await?;

    let state = WebhookState {
        manager,
        secret: Arc::from(settings.secret.as_str()),
        bot_username: bot_username.map(Arc::from),
    };
    let app = create_router(state, &settings.path).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Webhook server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received interrupt signal, shutting down");
        })
        .await?;

    Ok(())
}
