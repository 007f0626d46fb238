//! Webhook receiver for production mode
//!
//! Telegram POSTs each update to the configured path with the secret token
//! we registered in `setWebhook`; anything without it is refused.

use super::command::to_inbound;
use crate::runtime::{ReplySink, RuntimeManager, UserStore};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use teloxide::types::{Update, UpdateKind};

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Shared state for webhook handlers
pub struct WebhookState<S, R>
where
    S: UserStore + 'static,
    R: ReplySink + 'static,
{
    pub manager: Arc<RuntimeManager<S, R>>,
    pub secret: Arc<str>,
    pub bot_username: Option<Arc<str>>,
}

impl<S, R> Clone for WebhookState<S, R>
where
    S: UserStore + 'static,
    R: ReplySink + 'static,
{
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            secret: Arc::clone(&self.secret),
            bot_username: self.bot_username.clone(),
        }
    }
}

/// Create the webhook router
pub fn create_router<S, R>(state: WebhookState<S, R>, webhook_path: &str) -> Router
where
    S: UserStore + 'static,
    R: ReplySink + 'static,
{
    Router::new()
        .route("/healthz", get(health_check))
        .route(webhook_path, post(receive_update::<S, R>))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn receive_update<S, R>(
    State(state): State<WebhookState<S, R>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, WebhookError>
where
    S: UserStore + 'static,
    R: ReplySink + 'static,
{
    let provided = headers
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    if provided != Some(&*state.secret) {
        tracing::warn!("Rejected webhook request with invalid secret token");
        return Err(WebhookError::Forbidden);
    }

    let update: Update = serde_json::from_slice(&body)
        .map_err(|e| WebhookError::BadRequest(format!("Invalid update: {e}")))?;

    if let UpdateKind::Message(msg) = &update.kind {
        if let Some(inbound) = to_inbound(msg, state.bot_username.as_deref()) {
            state
                .manager
                .dispatch(inbound)
                .await
                .map_err(|e| WebhookError::Internal(e.to_string()))?;
        }
    }

    Ok(StatusCode::OK)
}

#[derive(Debug)]
enum WebhookError {
    Forbidden,
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            WebhookError::Forbidden => StatusCode::FORBIDDEN.into_response(),
            WebhookError::BadRequest(msg) => {
                tracing::warn!(error = %msg, "Malformed webhook update");
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            WebhookError::Internal(msg) => {
                tracing::error!(error = %msg, "Error processing webhook update");
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
        }
    }
}
