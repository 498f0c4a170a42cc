use crate::errors::{JournalError, JournalResult};
use std::sync::RwLock;

/// Narrow capability over the platform's auth service. The core never triggers
/// an interactive sign-in; it is handed either a live session or nothing.
pub trait AuthProvider: Send + Sync {
    fn is_signed_in(&self) -> bool;
    fn user_id(&self) -> Option<String>;
    fn bearer_token(&self) -> JournalResult<String>;
}

#[derive(Debug, Clone)]
struct Session {
    user_id: String,
    token: String,
}

/// Token-holding provider for adapters that receive credentials out of band.
#[derive(Debug, Default)]
pub struct StaticTokenAuth {
    session: RwLock<Option<Session>>,
}

impl StaticTokenAuth {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: &str, token: &str) -> Self {
        let auth = Self::default();
        auth.sign_in(user_id, token);
        auth
    }

    pub fn sign_in(&self, user_id: &str, token: &str) {
        let mut session = self.session.write().expect("auth session write lock");
        *session = Some(Session {
            user_id: user_id.to_string(),
            token: token.to_string(),
        });
    }

    pub fn sign_out(&self) {
        let mut session = self.session.write().expect("auth session write lock");
        *session = None;
    }
}

impl AuthProvider for StaticTokenAuth {
    fn is_signed_in(&self) -> bool {
        self.session
            .read()
            .expect("auth session read lock")
            .is_some()
    }

    fn user_id(&self) -> Option<String> {
        self.session
            .read()
            .expect("auth session read lock")
            .as_ref()
            .map(|session| session.user_id.clone())
    }

    fn bearer_token(&self) -> JournalResult<String> {
        self.session
            .read()
            .expect("auth session read lock")
            .as_ref()
            .map(|session| session.token.clone())
            .ok_or_else(|| JournalError::NotAuthenticated("no active session".to_string()))
    }
}
