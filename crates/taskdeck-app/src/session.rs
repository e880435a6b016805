//! Authentication gate consulted before any remote call.

use std::sync::Mutex;

use crate::sync::guard;

/// Answers whether the user may reach the task views.
pub trait Session: Send + Sync {
    /// Returns true while a user is signed in.
    fn is_authenticated(&self) -> bool;
}

/// Session backed by an optional bearer token.
#[derive(Debug, Default)]
pub struct TokenSession {
    token: Mutex<Option<String>>,
}

impl TokenSession {
    /// Signed-out session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session that starts signed in with `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    /// Store a fresh token after a successful login.
    pub fn login(&self, token: impl Into<String>) {
        *guard(&self.token) = Some(token.into());
    }

    /// Forget the token.
    pub fn logout(&self) {
        guard(&self.token).take();
    }

    /// Current bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        guard(&self.token).clone()
    }
}

impl Session for TokenSession {
    fn is_authenticated(&self) -> bool {
        guard(&self.token).as_deref().is_some_and(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_and_logout_toggle_authentication() {
        let session = TokenSession::new();
        assert!(!session.is_authenticated());
        session.login("abc");
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("abc"));
        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn empty_token_is_not_a_session() {
        assert!(!TokenSession::with_token("").is_authenticated());
    }
}
