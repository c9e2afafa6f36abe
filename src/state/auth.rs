// ============================================================================
// State : AuthStore
// ============================================================================
// Local-only authentication. login() accepts any non-empty email/password
// pair and derives the display name from the email; no credential is ever
// verified. This is a stub by design and must not be treated as a security
// boundary.
// ============================================================================

use tracing::{debug, info, warn};

use crate::models::Session;
use crate::storage::{LocalStore, SESSION_KEY};

/// Holds the (at most one) logged-in session.
pub struct AuthStore {
    session: Option<Session>,
    store: LocalStore,
}

impl AuthStore {
    /// Restores a previously persisted session, if any.
    pub fn load(store: LocalStore) -> Self {
        let session: Option<Session> = store.get(SESSION_KEY);
        if let Some(s) = &session {
            debug!(user = %s.name, "Session restored");
        }
        Self { session, store }
    }

    /// Attempts a login. Succeeds iff both fields are non-empty; no real
    /// verification happens. Returns whether a session was established.
    pub fn login(&mut self, email: &str, password: &str) -> bool {
        if email.is_empty() || password.is_empty() {
            debug!("Login rejected (empty email or password)");
            return false;
        }

        let session = Session::from_email(email);
        info!(user = %session.name, "User logged in");

        if let Err(e) = self.store.set(SESSION_KEY, &session) {
            warn!(error = %e, "Failed to persist session");
        }
        self.session = Some(session);
        true
    }

    /// Clears the in-memory and persisted session.
    pub fn logout(&mut self) {
        if let Some(s) = self.session.take() {
            info!(user = %s.name, "User logged out");
        }
        if let Err(e) = self.store.remove(SESSION_KEY) {
            warn!(error = %e, "Failed to clear persisted session");
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> LocalStore {
        let dir = std::env::temp_dir().join(format!(
            "navscope-auth-test-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        LocalStore::open(dir).unwrap()
    }

    #[test]
    fn test_login_derives_name() {
        let mut auth = AuthStore::load(temp_store("login"));

        assert!(auth.login("a@b.com", "x"));
        assert!(auth.is_authenticated());
        assert_eq!(auth.session().unwrap().name, "a");
    }

    #[test]
    fn test_login_rejects_empty_fields() {
        let mut auth = AuthStore::load(temp_store("empty"));

        assert!(!auth.login("", "x"));
        assert!(!auth.login("a@b.com", ""));
        assert!(!auth.is_authenticated());
        assert!(auth.session().is_none());
    }

    #[test]
    fn test_logout_clears_session() {
        let store = temp_store("logout");
        let mut auth = AuthStore::load(store.clone());
        auth.login("a@b.com", "x");
        auth.logout();

        assert!(!auth.is_authenticated());

        // The persisted session is gone too
        let reloaded = AuthStore::load(store);
        assert!(!reloaded.is_authenticated());
    }

    #[test]
    fn test_session_survives_restart() {
        let store = temp_store("restart");
        {
            let mut auth = AuthStore::load(store.clone());
            auth.login("carol@example.com", "pw");
        }

        let auth = AuthStore::load(store);
        assert!(auth.is_authenticated());
        assert_eq!(auth.session().unwrap().name, "carol");
    }
}
