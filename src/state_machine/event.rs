//! Events that can occur in a conversation

use crate::db::UserRecord;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // User commands
    Start { chat_is_private: bool },
    Cancel,
    Delete,
    Help,
    UnknownCommand { command: String },

    // Free text answer to the current prompt
    Text { text: String },

    // Dispatch shell events
    /// No inbound event for the configured idle period
    IdleTimeout,

    // Persistence outcomes (fed back after an effect runs)
    RecordSaved { record: UserRecord },
    RecordDeleted { existed: bool },
    /// The store error itself is logged by the runtime, not carried here
    PersistenceFailed { op: PersistOp },
}

/// Which store operation an outcome refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOp {
    Save,
    Delete,
}

impl Event {
    pub fn text(text: impl Into<String>) -> Self {
        Event::Text { text: text.into() }
    }

    /// Short label for logs; never includes message text
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Start { .. } => "start",
            Event::Cancel => "cancel",
            Event::Delete => "delete",
            Event::Help => "help",
            Event::UnknownCommand { .. } => "unknown_command",
            Event::Text { .. } => "text",
            Event::IdleTimeout => "idle_timeout",
            Event::RecordSaved { .. } => "record_saved",
            Event::RecordDeleted { .. } => "record_deleted",
            Event::PersistenceFailed { .. } => "persistence_failed",
        }
    }
}
