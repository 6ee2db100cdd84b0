//! Local sign-up and login.
//!
//! Accounts live in the session store next to the token. This is a stand-in
//! for a real identity provider: the token is an opaque label, not a
//! credential, and callers only see `register`/`login`/`logout` so a real
//! backend can replace it.

use crate::error::{Error, Result};
use crate::models::{Registration, Session, User};
use crate::notify::Notifier;
use crate::storage::{KeyValueStore, SessionStore};
use crate::validation;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tokio::sync::watch;

pub const DEMO_EMAIL: &str = "emily@example.com";
pub const DEMO_PASSWORD: &str = "emilyspass";

/// The one built-in account that works on a fresh install.
pub fn demo_user() -> User {
    User {
        id: 1,
        email: DEMO_EMAIL.to_string(),
        username: "emily".to_string(),
        password: None,
        first_name: "Emily".to_string(),
        last_name: "Johnson".to_string(),
        phone: None,
        age: None,
        created_at: None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated(Session),
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// base64 of `"{email}-{unix millis}"`.
pub fn mint_token(email: &str) -> String {
    STANDARD.encode(format!("{}-{}", email, Utc::now().timestamp_millis()))
}

/// Owns the session lifecycle. Everything else reads auth state through
/// [`AuthCoordinator::subscribe`] or the accessors, never from storage.
pub struct AuthCoordinator<S> {
    store: SessionStore<S>,
    state: watch::Sender<AuthState>,
    notifier: Arc<dyn Notifier>,
}

impl<S: KeyValueStore> AuthCoordinator<S> {
    /// Restores a persisted session if there is a usable one.
    ///
    /// A corrupt session is wiped and we start logged out. Never fails.
    pub fn bootstrap(backend: S, notifier: Arc<dyn Notifier>) -> Self {
        let mut store = SessionStore::new(backend);

        let initial = match store.load_session() {
            Ok(Some(session)) => {
                log::debug!("restored session for {}", session.user.email);
                AuthState::Authenticated(session)
            }
            Ok(None) => AuthState::Unauthenticated,
            Err(e) => {
                log::warn!("discarding stored session: {}", e);
                if let Err(e) = store.clear_session() {
                    log::warn!("could not clear stored session: {}", e);
                }
                AuthState::Unauthenticated
            }
        };

        let (state, _) = watch::channel(initial);
        Self {
            store,
            state,
            notifier,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().session().is_some()
    }

    /// The active session, for commands that need a logged-in user.
    pub fn require_session(&self) -> Result<Session> {
        self.session().ok_or(Error::NotAuthenticated)
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    /// Creates a local account. Does not log in.
    pub fn register(&mut self, form: &Registration) -> Result<User> {
        let result = validation::validate_registration(form).and_then(|()| self.append_user(form));

        match result {
            Ok(user) => {
                self.notifier
                    .success("Registration successful! Please login with your credentials.");
                Ok(user)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn append_user(&mut self, form: &Registration) -> Result<User> {
        let mut users = self.store.users()?;

        if users
            .iter()
            .any(|u| u.email == form.email || u.username == form.username)
        {
            return Err(Error::DuplicateUser);
        }

        // Millisecond clock, bumped past the newest id so two sign-ups in the
        // same millisecond still differ.
        let now = Utc::now();
        let clock = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let id = users
            .iter()
            .map(|u| u.id + 1)
            .max()
            .map_or(clock, |next| next.max(clock));

        let user = User {
            id,
            email: form.email.clone(),
            username: form.username.clone(),
            password: Some(form.password.clone()),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            phone: Some(form.phone.clone()),
            age: form.age,
            created_at: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        };

        users.push(user.clone());
        self.store.save_users(&users)?;
        log::debug!("registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Logs in against stored accounts, then the demo account.
    pub fn login(&mut self, email: &str, password: &str) -> Result<Session> {
        if let Err(e) = validation::validate_login(email, password) {
            return Err(self.fail(e));
        }

        self.state.send_replace(AuthState::Authenticating);

        match self.authenticate(email, password) {
            Ok((session, demo)) => {
                self.state
                    .send_replace(AuthState::Authenticated(session.clone()));
                self.notifier.success(if demo {
                    "Demo login successful!"
                } else {
                    "Login successful!"
                });
                Ok(session)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn authenticate(&mut self, email: &str, password: &str) -> Result<(Session, bool)> {
        let users = self.store.users()?;
        let stored = users
            .into_iter()
            .find(|u| u.email == email && u.password.as_deref() == Some(password));

        let (user, demo) = match stored {
            Some(user) => (user, false),
            None if email == DEMO_EMAIL && password == DEMO_PASSWORD => (demo_user(), true),
            None => return Err(Error::InvalidCredentials),
        };

        let session = Session {
            token: mint_token(&user.email),
            user,
        };
        self.store.persist_session(&session)?;
        Ok((session, demo))
    }

    /// Drops the session. Always ends logged out, even if storage complains.
    pub fn logout(&mut self) -> Result<()> {
        let cleared = self.store.clear_session();
        self.state.send_replace(AuthState::Unauthenticated);
        self.notifier.success("Logged out successfully");
        cleared
    }

    /// Surfaces a failure and resets to logged out, persisted half included,
    /// so a restart cannot resurrect the old session. Form errors leave the
    /// state alone since nothing was attempted.
    fn fail(&mut self, e: Error) -> Error {
        if !matches!(e, Error::Validation(_)) {
            if let Err(clear) = self.store.clear_session() {
                log::warn!("could not clear stored session: {}", clear);
            }
            self.state.send_replace(AuthState::Unauthenticated);
        }
        self.notifier.error(&e.to_string());
        e
    }
}
