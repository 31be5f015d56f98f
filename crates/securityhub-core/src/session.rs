//! Login and the persisted session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::LoginResponse;
use crate::error::{Error, Result};
use crate::persist::{KeyValueStore, SESSION_KEY, load_json, save_json};
use crate::traits::SecurityApi;

/// Message shown when either credential is blank.
pub const MISSING_CREDENTIALS: &str = "Please enter both username and password.";

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub user_id: Option<u64>,
}

/// Screen a user lands on after logging in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Administration screen.
    Superuser,
    /// Home board of the given client.
    Home(u32),
}

impl Session {
    /// Build a session from a login response, falling back to the typed username.
    pub fn from_login(response: LoginResponse, username: &str) -> Self {
        Self {
            token: response.token,
            username: response.username.unwrap_or_else(|| username.to_string()),
            role: response.role,
            is_superuser: response.is_superuser,
            user_id: response.user_id,
        }
    }

    /// Whether the account has administrative rights.
    pub fn is_admin(&self) -> bool {
        self.is_superuser || self.role.as_deref() == Some("admin")
    }

    pub fn landing(&self) -> Landing {
        if self.is_admin() {
            Landing::Superuser
        } else {
            Landing::Home(1)
        }
    }
}

/// Session persisted under the `session` key.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The saved session, if any.
    pub fn load(&self) -> Result<Option<Session>> {
        load_json(self.store.as_ref(), SESSION_KEY)
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        save_json(self.store.as_ref(), SESSION_KEY, session)
    }

    /// Forget the saved session (logout).
    pub fn clear(&self) -> Result<()> {
        self.store.remove(SESSION_KEY)
    }

    /// Validate credentials, log in and persist the resulting session.
    ///
    /// Blank credentials are rejected without contacting the server.
    pub async fn login<A: SecurityApi + ?Sized>(
        &self,
        api: &A,
        username: &str,
        password: &str,
    ) -> Result<Session> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Err(Error::InvalidInput(MISSING_CREDENTIALS.to_string()));
        }

        let response = api.login(username, password).await?;
        let session = Session::from_login(response, username);
        self.save(&session)?;
        info!("Logged in as {}", session.username);
        Ok(session)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockApi;
    use crate::persist::MemoryStore;

    fn session(role: Option<&str>, is_superuser: bool) -> Session {
        Session {
            token: "t".to_string(),
            username: "ali".to_string(),
            role: role.map(String::from),
            is_superuser,
            user_id: None,
        }
    }

    #[test]
    fn test_landing() {
        assert_eq!(session(Some("user"), false).landing(), Landing::Home(1));
        assert_eq!(session(Some("admin"), false).landing(), Landing::Superuser);
        assert_eq!(session(None, true).landing(), Landing::Superuser);
    }

    #[tokio::test]
    async fn test_blank_credentials_rejected_without_request() {
        let api = MockApi::new();
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));

        let err = sessions.login(&api, "  ", "secret").await.unwrap_err();
        assert_eq!(err.to_string(), MISSING_CREDENTIALS);
        let err = sessions.login(&api, "ali", "").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(api.login_count(), 0);
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let api = MockApi::new();
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));

        let session = sessions.login(&api, " ali ", "secret").await.unwrap();
        assert_eq!(session.username, "ali");
        assert!(!session.token.is_empty());
        assert_eq!(sessions.load().unwrap(), Some(session));

        sessions.clear().unwrap();
        assert_eq!(sessions.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_failure_saves_nothing() {
        let api = MockApi::new();
        api.set_login_failure(Some("Invalid credentials")).await;
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));

        let err = sessions.login(&api, "ali", "wrong").await.unwrap_err();
        assert!(matches!(err, Error::Http { status: 401, ref message } if message == "Invalid credentials"));
        assert_eq!(sessions.load().unwrap(), None);
    }
}
