//! Mock implementations for testing
//!
//! These mocks enable runtime testing without real I/O.

use super::traits::{PersistenceError, ReplySink, TransportError, UserStore};
use crate::db::UserRecord;
use crate::state_machine::UserId;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;

// ============================================================================
// Mock User Store
// ============================================================================

/// In-memory store that records every call
pub struct MockUserStore {
    records: Mutex<HashMap<UserId, UserRecord>>,
    upserts: Mutex<Vec<(UserId, String, u8, String)>>,
    deletes: Mutex<Vec<UserId>>,
    fail: bool,
}

impl MockUserStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            upserts: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A store whose every operation fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Seed a record as if saved in an earlier conversation
    pub fn insert_existing(&self, user_id: UserId) {
        let record = make_record(user_id, "Existing User", 30, "1 Existing Road");
        self.records.lock().unwrap().insert(user_id, record);
    }

    /// Recorded upsert calls
    pub fn upserts(&self) -> Vec<(UserId, String, u8, String)> {
        self.upserts.lock().unwrap().clone()
    }

    /// Recorded delete calls
    pub fn deletes(&self) -> Vec<UserId> {
        self.deletes.lock().unwrap().clone()
    }
}

impl Default for MockUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MockUserStore {
    async fn upsert(
        &self,
        user_id: UserId,
        name: &str,
        age: u8,
        address: &str,
    ) -> Result<UserRecord, PersistenceError> {
        self.upserts.lock().unwrap().push((
            user_id,
            name.to_string(),
            age,
            address.to_string(),
        ));
        if self.fail {
            return Err(PersistenceError::new("mock store unavailable"));
        }
        let record = make_record(user_id, name, age, address);
        self.records.lock().unwrap().insert(user_id, record.clone());
        Ok(record)
    }

    async fn delete(&self, user_id: UserId) -> Result<bool, PersistenceError> {
        self.deletes.lock().unwrap().push(user_id);
        if self.fail {
            return Err(PersistenceError::new("mock store unavailable"));
        }
        Ok(self.records.lock().unwrap().remove(&user_id).is_some())
    }
}

fn make_record(user_id: UserId, name: &str, age: u8, address: &str) -> UserRecord {
    let now = Utc::now();
    UserRecord {
        id: user_id.0,
        telegram_user_id: user_id.0,
        name: name.to_string(),
        age,
        address: address.to_string(),
        created_at: now,
        updated_at: now,
    }
}

// ============================================================================
// Recording Reply Sink
// ============================================================================

/// Reply sink that forwards every reply to a channel the test reads from
pub struct RecordingReplySink {
    tx: mpsc::UnboundedSender<(i64, String)>,
}

impl RecordingReplySink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(i64, String)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ReplySink for RecordingReplySink {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        self.tx
            .send((chat_id, text.to_string()))
            .map_err(|e| TransportError(e.to_string()))
    }
}
