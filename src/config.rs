//! Process configuration from environment variables

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::state_machine::state::DEFAULT_IDLE_TIMEOUT;

const DEFAULT_WEBHOOK_PATH: &str = "/webhook";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// How updates reach the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Long polling, for local development
    Development,
    /// Telegram pushes updates to our webhook endpoint
    Production,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Development => write!(f, "development"),
            RunMode::Production => write!(f, "production"),
        }
    }
}

/// Webhook settings, required in production
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSettings {
    pub secret: String,
    pub domain: String,
    pub path: String,
}

impl WebhookSettings {
    /// Public URL registered with Telegram
    pub fn url(&self) -> String {
        format!("https://{}{}", self.domain, self.path)
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_bot_token: String,
    pub database_path: PathBuf,
    pub mode: RunMode,
    /// Present iff `mode` is `Production`
    pub webhook: Option<WebhookSettings>,
    pub port: u16,
    pub conversation_timeout: Duration,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let telegram_bot_token =
            get("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let database_path = get("DATABASE_PATH").map_or_else(
            || {
                let home = get("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.intake-bot/intake.db"))
            },
            PathBuf::from,
        );

        let mode = match get("BOT_ENV").as_deref() {
            None | Some("development") => RunMode::Development,
            Some("production") => RunMode::Production,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "BOT_ENV",
                    value: other.to_string(),
                })
            }
        };

        let webhook = match mode {
            RunMode::Development => None,
            RunMode::Production => {
                let path = get("WEBHOOK_PATH").unwrap_or_else(|| DEFAULT_WEBHOOK_PATH.to_string());
                if !path.starts_with('/') {
                    return Err(ConfigError::Invalid {
                        name: "WEBHOOK_PATH",
                        value: path,
                    });
                }
                Some(WebhookSettings {
                    secret: get("WEBHOOK_SECRET").ok_or(ConfigError::Missing("WEBHOOK_SECRET"))?,
                    domain: get("WEBHOOK_DOMAIN").ok_or(ConfigError::Missing("WEBHOOK_DOMAIN"))?,
                    path,
                })
            }
        };

        let port = match get("PORT") {
            None => DEFAULT_PORT,
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
        };

        let conversation_timeout = match get("CONVERSATION_TIMEOUT") {
            None => DEFAULT_IDLE_TIMEOUT,
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "CONVERSATION_TIMEOUT",
                        value,
                    })
                }
            },
        };

        Ok(Self {
            telegram_bot_token,
            database_path,
            mode,
            webhook,
            port,
            conversation_timeout,
        })
    }
}
