// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session management.
//!
//! This module owns the authentication token and session identifier issued
//! by a successful login. At most one session is active per client handle;
//! storing a new session silently replaces the previous one, and clearing
//! is unconditional and idempotent.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

// =============================================================================
// SessionState
// =============================================================================

/// Connection state of a client handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session is held.
    #[default]
    Disconnected,

    /// A session is held and requests carry its bearer token.
    Connected,
}

impl SessionState {
    /// Returns `true` if a session is held.
    #[inline]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// A server-issued session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token authorizing subsequent requests.
    pub token: String,

    /// Session identifier.
    ///
    /// The current schema generation issues no separate identifier; there
    /// the token doubles as the session id.
    pub session_id: String,
}

impl Session {
    /// Creates a new session.
    pub fn new(token: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            session_id: session_id.into(),
        }
    }

    /// Creates a session whose token is also its identifier.
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            session_id: token.clone(),
            token,
        }
    }

    /// Returns the `Authorization` header value for this session.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

// =============================================================================
// SessionManager
// =============================================================================

/// Tracks the active session of one client handle.
///
/// # Thread Safety
///
/// The manager itself is thread-safe, but connect/disconnect sequencing
/// across concurrent callers is the owner's responsibility.
#[derive(Debug, Default)]
pub struct SessionManager {
    session: RwLock<Option<Session>>,
    stats: SessionStats,
}

impl SessionManager {
    /// Creates a new manager with no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        if self.session.read().is_some() {
            SessionState::Connected
        } else {
            SessionState::Disconnected
        }
    }

    /// Returns a copy of the active session, if any.
    pub fn session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    /// Stores a session, replacing any previous one.
    pub fn store(&self, session: Session) {
        let replaced = {
            let mut guard = self.session.write();
            guard.replace(session).is_some()
        };

        self.stats.record_login();
        if replaced {
            tracing::debug!("previous session replaced by re-connect");
        }
    }

    /// Clears the session unconditionally.
    ///
    /// Returns `true` if a session was present. Calling this repeatedly is
    /// harmless.
    pub fn clear(&self) -> bool {
        let had_session = self.session.write().take().is_some();
        if had_session {
            self.stats.record_logout();
        }
        had_session
    }

    /// Records a failed login attempt.
    pub fn record_failure(&self) {
        self.stats.record_failure();
    }

    /// Returns the session statistics.
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}

// =============================================================================
// SessionStats
// =============================================================================

/// Statistics for session operations.
#[derive(Debug, Default)]
pub struct SessionStats {
    logins: AtomicU64,
    logouts: AtomicU64,
    failures: AtomicU64,
}

impl SessionStats {
    /// Records a successful login.
    pub fn record_login(&self) {
        self.logins.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a logout.
    pub fn record_logout(&self) {
        self.logouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed login.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of successful logins.
    pub fn logins(&self) -> u64 {
        self.logins.load(Ordering::Relaxed)
    }

    /// Returns the number of logouts.
    pub fn logouts(&self) -> u64 {
        self.logouts.load(Ordering::Relaxed)
    }

    /// Returns the number of failed logins.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state() {
        assert!(SessionState::Connected.is_connected());
        assert!(!SessionState::Disconnected.is_connected());
        assert_eq!(format!("{}", SessionState::Disconnected), "Disconnected");
    }

    #[test]
    fn test_bearer_header() {
        let session = Session::new("tok123", "sess456");
        assert_eq!(session.bearer_header(), "Bearer tok123");
    }

    #[test]
    fn test_token_doubles_as_session_id() {
        let session = Session::from_token("tok123");
        assert_eq!(session.session_id, "tok123");
    }

    #[test]
    fn test_store_and_clear() {
        let manager = SessionManager::new();
        assert_eq!(manager.state(), SessionState::Disconnected);

        manager.store(Session::new("t", "s"));
        assert_eq!(manager.state(), SessionState::Connected);
        assert_eq!(manager.session().unwrap().token, "t");

        assert!(manager.clear());
        assert_eq!(manager.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let manager = SessionManager::new();
        manager.store(Session::new("t", "s"));

        assert!(manager.clear());
        assert!(!manager.clear());
        assert_eq!(manager.stats().logouts(), 1);
    }

    #[test]
    fn test_reconnect_overwrites_session() {
        let manager = SessionManager::new();
        manager.store(Session::new("first", "s1"));
        manager.store(Session::new("second", "s2"));

        let session = manager.session().unwrap();
        assert_eq!(session.token, "second");
        assert_eq!(manager.stats().logins(), 2);
    }
}
