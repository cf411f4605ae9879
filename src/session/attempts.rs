//! Consecutive login failure tracking and lockout.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

use crate::session::clock::Clock;

/// Outcome of recording a failed login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Allowed,
    Locked,
}

/// Failure history for one submitted username.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LoginAttemptRecord {
    pub identity: String,
    pub failure_count: u32,
    /// Seconds since epoch at which the lock engaged.
    pub locked_at: Option<u64>,
}

impl LoginAttemptRecord {
    pub fn is_locked(&self) -> bool {
        self.locked_at.is_some()
    }
}

/// Counts consecutive failures per identity.
///
/// A lock holds until `record_success` clears it; there is no timeout.
#[derive(Debug, Clone)]
pub struct LoginAttemptTracker {
    records: Arc<DashMap<String, LoginAttemptRecord>>,
    max_attempts: u32,
    clock: Arc<dyn Clock>,
}

impl LoginAttemptTracker {
    pub fn new(max_attempts: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            max_attempts: max_attempts.max(1),
            clock,
        }
    }

    /// Count a failed login and report whether the identity is now locked.
    pub fn record_failure(&self, identity: &str) -> LockState {
        let mut record = self
            .records
            .entry(identity.to_string())
            .or_insert_with(|| LoginAttemptRecord {
                identity: identity.to_string(),
                ..LoginAttemptRecord::default()
            });

        record.failure_count = record.failure_count.saturating_add(1);
        if record.failure_count >= self.max_attempts && record.locked_at.is_none() {
            record.locked_at = Some(self.clock.now());
            tracing::warn!(
                identity = %identity,
                failures = record.failure_count,
                "Account locked after repeated login failures"
            );
        }

        if record.is_locked() {
            LockState::Locked
        } else {
            LockState::Allowed
        }
    }

    /// Reset the failure count and clear any lock.
    pub fn record_success(&self, identity: &str) {
        self.records.remove(identity);
    }

    pub fn is_locked(&self, identity: &str) -> bool {
        self.records
            .get(identity)
            .map(|r| r.is_locked())
            .unwrap_or(false)
    }

    /// Copy of the current record; a fresh zeroed record if none exists.
    pub fn record(&self, identity: &str) -> LoginAttemptRecord {
        self.records
            .get(identity)
            .map(|r| r.value().clone())
            .unwrap_or_else(|| LoginAttemptRecord {
                identity: identity.to_string(),
                ..LoginAttemptRecord::default()
            })
    }

    /// All identities that currently have failures on file.
    pub fn snapshot(&self) -> Vec<LoginAttemptRecord> {
        self.records.iter().map(|r| r.value().clone()).collect()
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
