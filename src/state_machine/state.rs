//! Conversation state types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Chat platform's stable identifier for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a user is in the intake dialogue.
///
/// Collected fields travel inside the variant, so a field exists exactly
/// when it has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// No active session
    #[default]
    Idle,

    /// Consent shown, waiting for the user's full name
    AwaitingName,

    /// Name collected, waiting for age
    AwaitingAge { name: String },

    /// Name and age collected, waiting for address
    AwaitingAddress { name: String, age: u8 },
}

impl ConvState {
    /// Check whether a session is in progress
    pub fn is_active(&self) -> bool {
        !matches!(self, ConvState::Idle)
    }

    /// Stable label for logs (never includes collected values)
    pub fn label(&self) -> &'static str {
        match self {
            ConvState::Idle => "idle",
            ConvState::AwaitingName => "awaiting_name",
            ConvState::AwaitingAge { .. } => "awaiting_age",
            ConvState::AwaitingAddress { .. } => "awaiting_address",
        }
    }
}

/// Default idle period after which an unfinished session is discarded
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Context for a user's conversation runtime (immutable configuration)
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub user_id: UserId,
    /// How long a session may sit without events before it is dropped
    pub idle_timeout: Duration,
}

impl ConvContext {
    pub fn new(user_id: UserId, idle_timeout: Duration) -> Self {
        Self {
            user_id,
            idle_timeout,
        }
    }
}
