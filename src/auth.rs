// 🔐 Credential Store & Session Gate
// Plain-text username/password check and the per-session logged-in flag.
// NOTE: credentials are compared in plain text with no lockout. A real deployment
// should delegate to an auth service with hashed credentials.

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

// ============================================================================
// CREDENTIAL STORE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: BTreeMap<String, String>,
}

impl CredentialStore {
    pub fn new(users: BTreeMap<String, String>) -> Self {
        CredentialStore { users }
    }

    /// True iff `username` exists and its password matches exactly (case-sensitive)
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .map(|expected| expected == password)
            .unwrap_or(false)
    }
}

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone)]
pub struct Session {
    pub logged_in: bool,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            logged_in: false,
            username: None,
            created_at: Utc::now(),
        }
    }

    /// Check credentials; on success the gate opens for every later render pass
    pub fn attempt_login(&mut self, store: &CredentialStore, username: &str, password: &str) -> bool {
        if store.verify(username, password) {
            info!(user = username, "login succeeded");
            self.logged_in = true;
            self.username = Some(username.to_string());
            true
        } else {
            warn!(user = username, "login rejected");
            false
        }
    }

    pub fn logout(&mut self) {
        self.logged_in = false;
        self.username = None;
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::hours(SESSION_TTL_HOURS)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SESSION REGISTRY (one entry per logged-in browser)
// ============================================================================

/// Sessions older than this are dropped on lookup and on every new login
pub const SESSION_TTL_HOURS: i64 = 12;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a cookie value to a live session id. Never inserts: missing,
    /// malformed, unknown and expired ids all come back as None.
    pub fn lookup(&self, cookie: Option<&str>) -> Option<Uuid> {
        let id = cookie.and_then(|c| Uuid::parse_str(c.trim()).ok())?;
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());

        match sessions.get(&id) {
            Some(session) if session.is_expired_at(Utc::now()) => {
                sessions.remove(&id);
                None
            }
            Some(_) => Some(id),
            None => None,
        }
    }

    /// Snapshot of a session (None if the id was never issued)
    pub fn get(&self, id: &Uuid) -> Option<Session> {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.get(id).cloned()
    }

    pub fn is_logged_in(&self, id: &Uuid) -> bool {
        self.get(id).map(|s| s.logged_in).unwrap_or(false)
    }

    /// Check credentials and, on success, register a fresh session in place of
    /// `previous`. Failed attempts leave the registry untouched.
    pub fn login(&self, previous: Option<Uuid>, store: &CredentialStore, username: &str, password: &str) -> Option<Uuid> {
        let mut session = Session::new();
        if !session.attempt_login(store, username, password) {
            return None;
        }

        self.cleanup_expired(Utc::now());

        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = previous {
            sessions.remove(&old);
        }
        let id = Uuid::new_v4();
        sessions.insert(id, session);
        Some(id)
    }

    pub fn logout(&self, id: &Uuid) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(session) = sessions.remove(id) {
            info!(user = session.username.as_deref().unwrap_or(""), "logged out");
        }
    }

    /// Drop every session created more than `SESSION_TTL_HOURS` before `now`
    pub fn cleanup_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, "expired sessions dropped");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_users;

    fn store() -> CredentialStore {
        CredentialStore::new(default_users())
    }

    #[test]
    fn test_valid_login_opens_gate() {
        let mut session = Session::new();
        assert!(!session.logged_in);

        assert!(session.attempt_login(&store(), "admin", "pass123"));
        assert!(session.logged_in);
        assert_eq!(session.username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_unknown_pairs_are_rejected() {
        let store = store();
        let attempts = [
            ("admin", "PASS123"),
            ("Admin", "pass123"),
            ("admin", ""),
            ("", ""),
            ("nobody", "pass123"),
            ("propwealth", "pass123"),
        ];

        for (user, pass) in attempts {
            let mut session = Session::new();
            assert!(!session.attempt_login(&store, user, pass), "{}:{} should fail", user, pass);
            assert!(!session.logged_in);
        }
    }

    #[test]
    fn test_retry_after_failure() {
        let mut session = Session::new();
        for _ in 0..5 {
            assert!(!session.attempt_login(&store(), "propwealth", "wrong"));
        }
        assert!(session.attempt_login(&store(), "propwealth", "invest2025"));
    }

    #[test]
    fn test_registry_login_issues_session() {
        let registry = SessionRegistry::new();
        let id = registry.login(None, &store(), "admin", "pass123").unwrap();

        assert_eq!(registry.lookup(Some(&id.to_string())), Some(id));
        assert!(registry.is_logged_in(&id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_failed_login_inserts_nothing() {
        let registry = SessionRegistry::new();
        for _ in 0..50 {
            assert!(registry.login(None, &store(), "admin", "nope").is_none());
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_lookup_never_inserts() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.lookup(None), None);
        assert_eq!(registry.lookup(Some("not-a-uuid")), None);
        assert_eq!(registry.lookup(Some(&Uuid::new_v4().to_string())), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_relogin_replaces_previous() {
        let registry = SessionRegistry::new();
        let store = store();
        let first = registry.login(None, &store, "admin", "pass123").unwrap();
        let second = registry.login(Some(first), &store, "propwealth", "invest2025").unwrap();

        assert_ne!(first, second);
        assert_eq!(registry.lookup(Some(&first.to_string())), None);
        assert_eq!(registry.get(&second).unwrap().username.as_deref(), Some("propwealth"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_sessions_are_independent() {
        let registry = SessionRegistry::new();
        let store = store();
        let a = registry.login(None, &store, "admin", "pass123").unwrap();
        let b = registry.login(None, &store, "propwealth", "invest2025").unwrap();

        registry.logout(&a);
        assert!(!registry.is_logged_in(&a));
        assert!(registry.is_logged_in(&b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_expired_sessions_are_dropped() {
        let registry = SessionRegistry::new();
        let store = store();
        let old = registry.login(None, &store, "admin", "pass123").unwrap();
        let fresh = registry.login(None, &store, "propwealth", "invest2025").unwrap();

        {
            let mut sessions = registry.sessions.lock().unwrap();
            sessions.get_mut(&old).unwrap().created_at = Utc::now() - Duration::hours(SESSION_TTL_HOURS + 1);
        }
        assert_eq!(registry.lookup(Some(&old.to_string())), None);
        assert_eq!(registry.lookup(Some(&fresh.to_string())), Some(fresh));
        assert_eq!(registry.len(), 1);

        let later = Utc::now() + Duration::hours(SESSION_TTL_HOURS);
        assert_eq!(registry.cleanup_expired(later), 1);
        assert!(registry.is_empty());
    }
}
