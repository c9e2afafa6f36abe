// ============================================================================
// Model : Session
// ============================================================================
// The logged-in user. Exists iff the user is considered authenticated;
// created by login, destroyed by logout, restored from the local store at
// startup. No real identity is behind this.
// ============================================================================

use serde::{Deserialize, Serialize};

/// An authenticated user session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    /// Display name, derived as the local-part of the email.
    pub name: String,
}

impl Session {
    /// Builds a session from an email, deriving the name as the text
    /// before the first `@` (the whole email if there is none).
    pub fn from_email(email: impl Into<String>) -> Self {
        let email = email.into();
        let name = email
            .split('@')
            .next()
            .unwrap_or(email.as_str())
            .to_string();
        Self { email, name }
    }
}
