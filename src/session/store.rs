//! In-memory session storage.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::observability::metrics;

/// An authenticated browser session.
///
/// The empty session (`user == ""`) stands in for "no session" everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user: String,
    pub attributes: BTreeMap<String, String>,
    /// Seconds since epoch.
    pub created_at: u64,
    /// Seconds since epoch.
    pub last_accessed_at: u64,
}

impl Session {
    /// Start a session for `user` under a freshly generated id.
    pub fn new(user: impl Into<String>, attributes: BTreeMap<String, String>, now: u64) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            user: user.into(),
            attributes,
            created_at: now,
            last_accessed_at: now,
        }
    }

    /// The canonical "no session" value.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_empty()
    }

    /// True once the session has gone `idle_timeout` seconds without a touch.
    /// A zero timeout disables idling.
    pub fn is_idle(&self, now: u64, idle_timeout: u64) -> bool {
        idle_timeout > 0 && now.saturating_sub(self.last_accessed_at) > idle_timeout
    }
}

/// Thread-safe session map, keyed by session id.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a session by id. Misses return the empty session.
    pub fn get(&self, id: Option<&str>) -> Session {
        id.and_then(|id| self.inner.get(id).map(|r| r.value().clone()))
            .unwrap_or_else(Session::empty)
    }

    /// Insert or overwrite by id. Sessions without an id are refused.
    pub fn put(&self, session: Session) {
        if session.id.is_empty() {
            tracing::warn!(user = %session.user, "Refusing to store session without an id");
            return;
        }
        self.inner.insert(session.id.clone(), session);
        metrics::record_active_sessions(self.inner.len());
    }

    /// Remove a session if present.
    pub fn delete(&self, id: &str) -> Option<Session> {
        let removed = self.inner.remove(id).map(|(_, s)| s);
        if removed.is_some() {
            metrics::record_active_sessions(self.inner.len());
        }
        removed
    }

    /// Remove the session only if it is still idle under the map lock.
    pub fn remove_if_idle(&self, id: &str, now: u64, idle_timeout: u64) -> bool {
        let removed = self
            .inner
            .remove_if(id, |_, s| s.is_idle(now, idle_timeout))
            .is_some();
        if removed {
            metrics::record_active_sessions(self.inner.len());
        }
        removed
    }

    /// Slide the session's expiration window forward.
    pub fn touch(&self, id: &str, now: u64) {
        if let Some(mut entry) = self.inner.get_mut(id) {
            entry.last_accessed_at = now;
        }
    }

    /// Drop every session idle for longer than `idle_timeout` seconds.
    pub fn purge_idle(&self, now: u64, idle_timeout: u64) -> usize {
        let before = self.inner.len();
        self.inner.retain(|_, s| !s.is_idle(now, idle_timeout));
        let purged = before.saturating_sub(self.inner.len());
        if purged > 0 {
            metrics::record_active_sessions(self.inner.len());
        }
        purged
    }

    /// Copies of all live sessions.
    pub fn snapshot(&self) -> Vec<Session> {
        self.inner.iter().map(|r| r.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
