//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the runtime with mock implementations.

use crate::db::{Database, DbError, UserRecord};
use crate::state_machine::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// A store operation failed; the message is for operators, never for users
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PersistenceError {
    pub message: String,
}

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<DbError> for PersistenceError {
    fn from(e: DbError) -> Self {
        Self::new(e.to_string())
    }
}

/// A reply could not be delivered to the chat
#[derive(Debug, Error)]
#[error("reply delivery failed: {0}")]
pub struct TransportError(pub String);

/// Durable storage for user records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create the user's record, or overwrite its fields if it exists
    async fn upsert(
        &self,
        user_id: UserId,
        name: &str,
        age: u8,
        address: &str,
    ) -> Result<UserRecord, PersistenceError>;

    /// Remove the user's record; `true` if one existed
    async fn delete(&self, user_id: UserId) -> Result<bool, PersistenceError>;
}

/// Outbound text channel back to the chat platform
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: UserStore + ?Sized> UserStore for Arc<T> {
    async fn upsert(
        &self,
        user_id: UserId,
        name: &str,
        age: u8,
        address: &str,
    ) -> Result<UserRecord, PersistenceError> {
        (**self).upsert(user_id, name, age, address).await
    }

    async fn delete(&self, user_id: UserId) -> Result<bool, PersistenceError> {
        (**self).delete(user_id).await
    }
}

#[async_trait]
impl<T: ReplySink + ?Sized> ReplySink for Arc<T> {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        (**self).send_text(chat_id, text).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use Database as a `UserStore`.
///
/// SQLite calls are synchronous, so they run on the blocking pool to keep
/// other users' conversations moving.
#[derive(Clone)]
pub struct DatabaseStorage {
    db: Database,
}

impl DatabaseStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for DatabaseStorage {
    async fn upsert(
        &self,
        user_id: UserId,
        name: &str,
        age: u8,
        address: &str,
    ) -> Result<UserRecord, PersistenceError> {
        let db = self.db.clone();
        let (name, address) = (name.to_string(), address.to_string());
        tokio::task::spawn_blocking(move || db.upsert_user(user_id.0, &name, age, &address))
            .await
            .map_err(|e| PersistenceError::new(format!("upsert task failed: {e}")))?
            .map_err(PersistenceError::from)
    }

    async fn delete(&self, user_id: UserId) -> Result<bool, PersistenceError> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || db.delete_user(user_id.0))
            .await
            .map_err(|e| PersistenceError::new(format!("delete task failed: {e}")))?
            .map_err(PersistenceError::from)
    }
}
