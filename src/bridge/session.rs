//! Per-user agent session tracking.
//!
//! One [`SessionInfo`] per user identity, updated after every successful run
//! that reports a session id. State lives only as long as the store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Session metadata for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    /// Opaque id handed back to the agent to resume context.
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Successful runs recorded against this session (at least 1).
    pub message_count: u64,
}

/// Thread-safe map of user id to [`SessionInfo`].
///
/// Every mutation happens under a single lock, so concurrent upserts for the
/// same user are serialized and never observe a half-applied update.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionInfo>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionInfo>> {
        // The map is never left mid-update, so a poisoned lock is still usable.
        self.sessions
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    /// Current session for `user_id`, if any.
    pub fn get(&self, user_id: &str) -> Option<SessionInfo> {
        self.lock().get(user_id).cloned()
    }

    /// Record a successful run that returned `session_id`.
    ///
    /// Creates the entry with `message_count = 1`, or replaces the id, bumps
    /// the count and refreshes `last_activity` on the existing one.
    pub fn upsert(&self, user_id: &str, session_id: &str, now: DateTime<Utc>) -> SessionInfo {
        let mut sessions = self.lock();
        let info = sessions
            .entry(user_id.to_string())
            .and_modify(|info| {
                info.session_id = session_id.to_string();
                info.last_activity = now;
                info.message_count += 1;
            })
            .or_insert_with(|| SessionInfo {
                session_id: session_id.to_string(),
                started_at: now,
                last_activity: now,
                message_count: 1,
            });
        info.clone()
    }

    /// Replace whatever session `user_id` had with a fresh one.
    ///
    /// Used when the caller asked for a new session: the old entry is
    /// superseded rather than continued, so the count restarts at 1.
    pub fn restart(&self, user_id: &str, session_id: &str, now: DateTime<Utc>) -> SessionInfo {
        let info = SessionInfo {
            session_id: session_id.to_string(),
            started_at: now,
            last_activity: now,
            message_count: 1,
        };
        self.lock().insert(user_id.to_string(), info.clone());
        info
    }

    /// Drop the session for `user_id`. Returns true iff one existed.
    pub fn clear(&self, user_id: &str) -> bool {
        self.lock().remove(user_id).is_some()
    }

    /// Snapshot of all sessions; later changes to the store do not show up in it.
    pub fn list(&self) -> HashMap<String, SessionInfo> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
