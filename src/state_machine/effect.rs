//! Effects produced by state transitions

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send text back to the chat the event came from
    Reply { text: String },

    /// Upsert the user's record with the collected fields
    SaveRecord {
        name: String,
        age: u8,
        address: String,
    },

    /// Remove the user's record, if any
    DeleteRecord,
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply { text: text.into() }
    }
}
