//! Per-user conversation runtime

use super::traits::{ReplySink, UserStore};
use super::Inbound;

use crate::state_machine::{transition, ConvContext, ConvState, Effect, Event, PersistOp};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// Owns one user's session and processes that user's events in order
pub struct ConversationRuntime<S, R>
where
    S: UserStore + 'static,
    R: ReplySink + 'static,
{
    context: ConvContext,
    state: ConvState,
    store: Arc<S>,
    replies: Arc<R>,
    /// Events accepted by a predecessor that expired before handling them
    backlog: Vec<Inbound>,
    event_rx: mpsc::Receiver<Inbound>,
    last_event_at: Instant,
}

impl<S, R> ConversationRuntime<S, R>
where
    S: UserStore + 'static,
    R: ReplySink + 'static,
{
    pub fn new(
        context: ConvContext,
        store: Arc<S>,
        replies: Arc<R>,
        backlog: Vec<Inbound>,
        event_rx: mpsc::Receiver<Inbound>,
    ) -> Self {
        Self {
            context,
            state: ConvState::Idle,
            store,
            replies,
            backlog,
            event_rx,
            last_event_at: Instant::now(),
        }
    }

    /// Run until the session idles out or every sender is gone.
    ///
    /// Returns events that were queued but not handled because the timeout
    /// had already fired; they belong to the user's next session.
    pub async fn run(mut self) -> Vec<Inbound> {
        tracing::debug!(user_id = %self.context.user_id, "Starting conversation runtime");

        for inbound in std::mem::take(&mut self.backlog) {
            self.process_inbound(inbound).await;
        }

        let leftover = loop {
            let deadline = self.last_event_at + self.context.idle_timeout;
            tokio::select! {
                biased;
                inbound = self.event_rx.recv() => match inbound {
                    Some(inbound) => self.process_inbound(inbound).await,
                    None => break Vec::new(),
                },
                () = sleep_until(deadline) => break self.expire(),
            }
        };

        tracing::debug!(
            user_id = %self.context.user_id,
            leftover = leftover.len(),
            "Conversation runtime stopped"
        );
        leftover
    }

    /// Drop the session silently and stop accepting events. Anything that
    /// raced in before the channel closed is returned unprocessed.
    fn expire(&mut self) -> Vec<Inbound> {
        if self.state.is_active() {
            tracing::info!(
                user_id = %self.context.user_id,
                state = self.state.label(),
                "Session discarded after idle timeout"
            );
        }
        self.state = transition(&self.state, Event::IdleTimeout).new_state;

        self.event_rx.close();
        let mut leftover = Vec::new();
        while let Ok(inbound) = self.event_rx.try_recv() {
            leftover.push(inbound);
        }
        leftover
    }

    async fn process_inbound(&mut self, inbound: Inbound) {
        self.last_event_at = Instant::now();
        let chat_id = inbound.chat.id;

        // Effects may yield outcome events that go back through the machine
        let mut events_to_process = vec![inbound.event];

        while let Some(event) = events_to_process.pop() {
            let event_kind = event.kind();
            let result = transition(&self.state, event);

            let old_state = std::mem::replace(&mut self.state, result.new_state);
            tracing::debug!(
                user_id = %self.context.user_id,
                event = event_kind,
                from = old_state.label(),
                to = self.state.label(),
                "State transition"
            );

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(chat_id, effect).await {
                    events_to_process.push(generated_event);
                }
            }
        }
    }

    async fn execute_effect(&self, chat_id: i64, effect: Effect) -> Option<Event> {
        let user_id = self.context.user_id;
        match effect {
            Effect::Reply { text } => {
                if let Err(e) = self.replies.send_text(chat_id, &text).await {
                    tracing::warn!(user_id = %user_id, chat_id, error = %e, "Failed to send reply");
                }
                None
            }

            Effect::SaveRecord { name, age, address } => {
                match self.store.upsert(user_id, &name, age, &address).await {
                    Ok(record) => {
                        tracing::info!(user_id = %user_id, record_id = record.id, "Saved user record");
                        Some(Event::RecordSaved { record })
                    }
                    Err(e) => {
                        tracing::error!(user_id = %user_id, error = %e, "Failed to save user record");
                        Some(Event::PersistenceFailed {
                            op: PersistOp::Save,
                        })
                    }
                }
            }

            Effect::DeleteRecord => match self.store.delete(user_id).await {
                Ok(existed) => {
                    tracing::info!(user_id = %user_id, existed, "Processed data deletion request");
                    Some(Event::RecordDeleted { existed })
                }
                Err(e) => {
                    tracing::error!(user_id = %user_id, error = %e, "Failed to delete user record");
                    Some(Event::PersistenceFailed {
                        op: PersistOp::Delete,
                    })
                }
            },
        }
    }
}
