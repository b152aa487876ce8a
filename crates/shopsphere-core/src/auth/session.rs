use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use super::navigator::Navigator;
use super::storage::{KeyValueStore, MemoryStore, StorageScope};

/// Current access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Older name for the access token, still read and written for compatibility
pub const LEGACY_TOKEN_KEY: &str = "authToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const AUTHENTICATED_KEY: &str = "adminAuthenticated";
pub const USERNAME_KEY: &str = "adminUsername";

/// Every key the session owns, in the order they are cleared.
pub const SESSION_KEYS: [&str; 5] = [
    ACCESS_TOKEN_KEY,
    LEGACY_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
    AUTHENTICATED_KEY,
    USERNAME_KEY,
];

/// Lookup order for the bearer token. Persistent scope always wins.
const TOKEN_LOOKUP: [(StorageScope, &str); 4] = [
    (StorageScope::Persistent, ACCESS_TOKEN_KEY),
    (StorageScope::Persistent, LEGACY_TOKEN_KEY),
    (StorageScope::Session, ACCESS_TOKEN_KEY),
    (StorageScope::Session, LEGACY_TOKEN_KEY),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// The tokens and flags identifying a logged-in admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
    pub username: String,
}

struct Inner {
    persistent: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<SessionState>,
}

/// Single source of truth for "is there a logged-in admin".
///
/// Clone is cheap; clones share the same backends.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(
        persistent: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let store = Self {
            inner: Arc::new(Inner {
                persistent,
                session,
                navigator,
                state: watch::channel(SessionState::Anonymous).0,
            }),
        };
        store.refresh_state();
        store
    }

    /// Session store with a fresh in-memory session scope.
    pub fn with_persistent(
        persistent: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::new(persistent, Arc::new(MemoryStore::new()), navigator)
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    fn scope(&self, scope: StorageScope) -> &dyn KeyValueStore {
        match scope {
            StorageScope::Persistent => self.inner.persistent.as_ref(),
            StorageScope::Session => self.inner.session.as_ref(),
        }
    }

    /// First non-empty token across both scopes, or an empty string.
    pub fn get_token(&self) -> String {
        TOKEN_LOOKUP
            .iter()
            .filter_map(|(scope, key)| self.scope(*scope).get(key))
            .find(|token| !token.is_empty())
            .unwrap_or_default()
    }

    /// Store a fresh session in persistent scope.
    pub fn set_session(&self, access_token: &str, refresh_token: Option<&str>, username: &str) {
        self.set_session_in(StorageScope::Persistent, access_token, refresh_token, username);
    }

    /// Store a fresh session in the given scope.
    pub fn set_session_in(
        &self,
        scope: StorageScope,
        access_token: &str,
        refresh_token: Option<&str>,
        username: &str,
    ) {
        let store = self.scope(scope);
        store.set(ACCESS_TOKEN_KEY, access_token);
        store.set(LEGACY_TOKEN_KEY, access_token);
        if let Some(refresh) = refresh_token.filter(|r| !r.is_empty()) {
            store.set(REFRESH_TOKEN_KEY, refresh);
        }
        store.set(AUTHENTICATED_KEY, "true");
        store.set(USERNAME_KEY, username);

        info!(username = username, ?scope, "Admin session stored");
        self.refresh_state();
    }

    /// Remove every session key from both scopes, then send the host back
    /// to the login screen.
    pub fn clear_session(&self) {
        for key in SESSION_KEYS {
            self.inner.persistent.remove(key);
            self.inner.session.remove(key);
        }
        debug!("Cleared session keys from both scopes");
        self.refresh_state();
        self.inner.navigator.redirect_to_login();
    }

    /// The bundle currently authorizing requests, if any.
    pub fn credentials(&self) -> Option<CredentialBundle> {
        [StorageScope::Persistent, StorageScope::Session]
            .into_iter()
            .find_map(|scope| self.bundle_in(scope))
    }

    fn bundle_in(&self, scope: StorageScope) -> Option<CredentialBundle> {
        let store = self.scope(scope);
        let access_token = [ACCESS_TOKEN_KEY, LEGACY_TOKEN_KEY]
            .iter()
            .filter_map(|key| store.get(key))
            .find(|token| !token.is_empty())?;

        Some(CredentialBundle {
            access_token,
            refresh_token: store.get(REFRESH_TOKEN_KEY).filter(|r| !r.is_empty()),
            is_authenticated: store.get(AUTHENTICATED_KEY).as_deref() == Some("true"),
            username: store.get(USERNAME_KEY).unwrap_or_default(),
        })
    }

    pub fn username(&self) -> Option<String> {
        self.credentials()
            .map(|c| c.username)
            .filter(|u| !u.is_empty())
    }

    pub fn state(&self) -> SessionState {
        if self.get_token().is_empty() {
            SessionState::Anonymous
        } else {
            SessionState::Authenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Watch ANONYMOUS/AUTHENTICATED transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    fn refresh_state(&self) {
        let state = self.state();
        self.inner.state.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }
}
