//! Pure state transition function
//!
//! Given the same state and event it always produces the same next state and
//! effects. Store calls and replies happen in the runtime; their outcomes come
//! back in as `RecordSaved` / `RecordDeleted` / `PersistenceFailed` events.

use super::replies;
use super::{ConvState, Effect, Event, PersistOp};
use crate::validate::{validate_address, validate_age, validate_name, ValidationError};

/// Result of a state transition
#[derive(Debug, PartialEq)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Shorthand for a transition whose only effect is a reply
    fn reply(state: ConvState, text: impl Into<String>) -> Self {
        Self::new(state).with_effect(Effect::reply(text))
    }
}

/// Pure transition function
pub fn transition(state: &ConvState, event: Event) -> TransitionResult {
    match (state, event) {
        // ============================================================
        // Commands (valid in every state)
        // ============================================================

        // Start outside a private chat is refused; a private dialogue in
        // progress is left as it was
        (state, Event::Start {
            chat_is_private: false,
        }) => TransitionResult::reply(state.clone(), replies::GROUP_REJECTION),

        // Start (or restart) discards whatever was collected so far
        (_, Event::Start {
            chat_is_private: true,
        }) => TransitionResult::reply(
            ConvState::AwaitingName,
            replies::consent_and_name_prompt(),
        ),

        (ConvState::Idle, Event::Cancel) => {
            TransitionResult::reply(ConvState::Idle, replies::NOTHING_TO_CANCEL)
        }

        (_, Event::Cancel) => TransitionResult::reply(ConvState::Idle, replies::CANCELLED),

        // Delete does not need a session and always ends without one
        (_, Event::Delete) => {
            TransitionResult::new(ConvState::Idle).with_effect(Effect::DeleteRecord)
        }

        (_, Event::IdleTimeout) => TransitionResult::new(ConvState::Idle),

        (state, Event::Help) => TransitionResult::reply(state.clone(), replies::HELP),

        (state, Event::UnknownCommand { command }) => {
            TransitionResult::reply(state.clone(), replies::unknown_command(&command))
        }

        // ============================================================
        // Dialogue steps
        // ============================================================

        (ConvState::Idle, Event::Text { .. }) => {
            TransitionResult::reply(ConvState::Idle, replies::IDLE_HINT)
        }

        (ConvState::AwaitingName, Event::Text { text }) => match validate_name(&text) {
            Ok(name) => {
                let prompt = replies::age_prompt(&name);
                TransitionResult::reply(ConvState::AwaitingAge { name }, prompt)
            }
            Err(_) => TransitionResult::reply(ConvState::AwaitingName, replies::invalid_name()),
        },

        (ConvState::AwaitingAge { name }, Event::Text { text }) => match validate_age(&text) {
            Ok(age) => TransitionResult::reply(
                ConvState::AwaitingAddress {
                    name: name.clone(),
                    age,
                },
                replies::address_prompt(),
            ),
            Err(ValidationError::Range) => {
                TransitionResult::reply(state.clone(), replies::age_out_of_range())
            }
            Err(ValidationError::Parse | ValidationError::Format) => {
                TransitionResult::reply(state.clone(), replies::age_not_a_number())
            }
        },

        // Final step: the session ends here whether or not the save succeeds
        (ConvState::AwaitingAddress { name, age }, Event::Text { text }) => {
            match validate_address(&text) {
                Ok(address) => TransitionResult::new(ConvState::Idle).with_effect(
                    Effect::SaveRecord {
                        name: name.clone(),
                        age: *age,
                        address,
                    },
                ),
                Err(_) => TransitionResult::reply(state.clone(), replies::invalid_address()),
            }
        }

        // ============================================================
        // Persistence outcomes
        // ============================================================

        (state, Event::RecordSaved { record }) => {
            TransitionResult::reply(state.clone(), replies::saved(&record))
        }

        (state, Event::RecordDeleted { existed: true }) => {
            TransitionResult::reply(state.clone(), replies::DELETED)
        }

        (state, Event::RecordDeleted { existed: false }) => {
            TransitionResult::reply(state.clone(), replies::NOTHING_TO_DELETE)
        }

        (state, Event::PersistenceFailed { op }) => {
            let text = match op {
                PersistOp::Save => replies::SAVE_FAILED,
                PersistOp::Delete => replies::DELETE_FAILED,
            };
            TransitionResult::reply(state.clone(), text)
        }
    }
}
