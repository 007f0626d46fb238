//! Runtime for routing chat events to per-user conversations
//!
//! Each user gets a [`ConversationRuntime`] task fed through a channel, so a
//! user's events are handled one at a time in arrival order while different
//! users never wait on each other. A runtime stops itself after the idle
//! timeout; the next event for that user starts a fresh one.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;
pub use traits::*;

use crate::state_machine::{ConvContext, Event, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch, RwLock};

/// Chat the event came from; replies go back here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatRef {
    pub id: i64,
    pub is_private: bool,
}

/// An event from one user, as delivered by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub user_id: UserId,
    pub chat: ChatRef,
    pub event: Event,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("conversation runtime for user {0} is not accepting events")]
    RuntimeUnavailable(UserId),
}

/// Handle to interact with a running conversation
#[derive(Clone)]
pub struct ConversationHandle {
    pub event_tx: mpsc::Sender<Inbound>,
    /// Resolves (with an error) once the runtime has stopped and its entry
    /// has been removed or replaced
    stopped: watch::Receiver<()>,
}

type RuntimeMap = HashMap<UserId, ConversationHandle>;

/// State shared by the manager and the runtime supervisors it spawns
struct Shared<S, R> {
    store: Arc<S>,
    replies: Arc<R>,
    idle_timeout: Duration,
    runtimes: RwLock<RuntimeMap>,
}

/// Manager for all conversation runtimes
pub struct RuntimeManager<S, R>
where
    S: UserStore + 'static,
    R: ReplySink + 'static,
{
    shared: Arc<Shared<S, R>>,
}

impl<S, R> RuntimeManager<S, R>
where
    S: UserStore + 'static,
    R: ReplySink + 'static,
{
    pub fn new(store: S, replies: R, idle_timeout: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                store: Arc::new(store),
                replies: Arc::new(replies),
                idle_timeout,
                runtimes: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Deliver an event to the user's conversation, starting one if needed
    pub async fn dispatch(&self, inbound: Inbound) -> Result<(), DispatchError> {
        let user_id = inbound.user_id;
        tracing::debug!(user_id = %user_id, event = inbound.event.kind(), "Dispatching event");

        let mut pending = inbound;
        // A runtime may close between lookup and send; a second attempt
        // always reaches a freshly started one.
        for _ in 0..2 {
            let handle = self.get_or_create(user_id).await;
            match handle.event_tx.send(pending).await {
                Ok(()) => return Ok(()),
                Err(mpsc::error::SendError(returned)) => {
                    self.retire(user_id, handle).await;
                    pending = returned;
                }
            }
        }

        Err(DispatchError::RuntimeUnavailable(user_id))
    }

    /// Get the handle for a running conversation, or start one
    pub async fn get_or_create(&self, user_id: UserId) -> ConversationHandle {
        // Check if already running
        {
            let runtimes = self.shared.runtimes.read().await;
            if let Some(handle) = runtimes.get(&user_id) {
                return handle.clone();
            }
        }

        let mut runtimes = self.shared.runtimes.write().await;
        // Another dispatch may have started it while we waited for the lock
        if let Some(handle) = runtimes.get(&user_id) {
            return handle.clone();
        }

        let handle = spawn_runtime(&self.shared, &mut runtimes, user_id, Vec::new());
        tracing::debug!(user_id = %user_id, active = runtimes.len(), "Conversation runtime started");
        handle
    }

    /// Wait for a closed runtime to finish, then forget it if its
    /// supervisor did not get to.
    ///
    /// Waiting keeps ordering intact: events the old runtime left behind are
    /// queued on its replacement before any later event reaches it.
    async fn retire(&self, user_id: UserId, handle: ConversationHandle) {
        let mut stopped = handle.stopped;
        // Err means the sender was dropped, i.e. the supervisor is done
        while stopped.changed().await.is_ok() {}

        let mut runtimes = self.shared.runtimes.write().await;
        if runtimes
            .get(&user_id)
            .is_some_and(|current| current.event_tx.same_channel(&handle.event_tx))
        {
            runtimes.remove(&user_id);
        }
    }

    /// Number of users with a live runtime
    #[cfg(test)]
    pub async fn active_count(&self) -> usize {
        self.shared.runtimes.read().await.len()
    }
}

/// Start a runtime for `user_id` and register it. The caller holds the write
/// lock, so no one can observe the entry before `backlog` is queued.
fn spawn_runtime<S, R>(
    shared: &Arc<Shared<S, R>>,
    runtimes: &mut RuntimeMap,
    user_id: UserId,
    backlog: Vec<Inbound>,
) -> ConversationHandle
where
    S: UserStore + 'static,
    R: ReplySink + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(32);
    let (stopped_tx, stopped_rx) = watch::channel(());

    let runtime = ConversationRuntime::new(
        ConvContext::new(user_id, shared.idle_timeout),
        Arc::clone(&shared.store),
        Arc::clone(&shared.replies),
        backlog,
        event_rx,
    );

    let handle = ConversationHandle {
        event_tx,
        stopped: stopped_rx,
    };
    runtimes.insert(user_id, handle.clone());
    tokio::spawn(supervise(
        Arc::clone(shared),
        user_id,
        handle.event_tx.clone(),
        runtime,
        stopped_tx,
    ));
    handle
}

/// Run a conversation to completion, then drop its map entry. Events it
/// left unhandled go to a successor so they are not lost.
async fn supervise<S, R>(
    shared: Arc<Shared<S, R>>,
    user_id: UserId,
    event_tx: mpsc::Sender<Inbound>,
    runtime: ConversationRuntime<S, R>,
    stopped_tx: watch::Sender<()>,
) where
    S: UserStore + 'static,
    R: ReplySink + 'static,
{
    let leftover = runtime.run().await;

    {
        let mut runtimes = shared.runtimes.write().await;
        let is_current = runtimes
            .get(&user_id)
            .is_some_and(|current| current.event_tx.same_channel(&event_tx));
        if is_current {
            if leftover.is_empty() {
                runtimes.remove(&user_id);
                tracing::debug!(user_id = %user_id, active = runtimes.len(), "Conversation runtime removed");
            } else {
                tracing::debug!(
                    user_id = %user_id,
                    pending = leftover.len(),
                    "Handing late events to a new runtime"
                );
                spawn_runtime(&shared, &mut runtimes, user_id, leftover);
            }
        }
    }

    drop(stopped_tx);
}
