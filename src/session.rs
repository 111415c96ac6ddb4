//! Client-side session, persisted under a single local-storage key and
//! reconciled against the server's view on startup.

use crate::storage::{KeyValueStore, StorageError};
use crate::types::Session;

/// Local-storage key holding the serialized [`Session`].
pub const SESSION_KEY: &str = "currentUser";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    /// A login or registration request is in flight.
    Authenticating,
    Authenticated,
}

pub struct SessionStore<S: KeyValueStore> {
    storage: S,
    current: Option<Session>,
    authenticating: bool,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            current: None,
            authenticating: false,
        }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn state(&self) -> AuthState {
        if self.current.is_some() {
            AuthState::Authenticated
        } else if self.authenticating {
            AuthState::Authenticating
        } else {
            AuthState::Anonymous
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the persisted session, if any. Never touches the network. An
    /// unreadable entry is logged and treated as absent.
    pub fn hydrate(&mut self) -> Option<&Session> {
        match self.storage.load::<Session>(SESSION_KEY) {
            Ok(Some(session)) => {
                tracing::info!(username = %session.username, "restored session from local storage");
                self.current = Some(session);
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "ignoring unreadable stored session"),
        }
        self.current.as_ref()
    }

    /// Apply the server's answer to a session probe.
    ///
    /// A reported session replaces the local one. A missing one keeps the
    /// local session: the probe can fail for reasons unrelated to the user
    /// (cookie-less cross-origin calls, transient auth errors) and that must
    /// not log them out. This retain-on-null rule is a policy choice.
    pub fn reconcile_with_server(
        &mut self,
        server: Option<Session>,
    ) -> Result<Option<&Session>, StorageError> {
        match server {
            Some(session) => {
                tracing::info!(username = %session.username, "server session confirmed");
                self.set_session(session)?;
            }
            None => {
                tracing::info!(
                    retained = self.current.is_some(),
                    "no server session; keeping client session"
                );
            }
        }
        Ok(self.current.as_ref())
    }

    /// Replace any prior session wholesale. Persisted first, so a failed
    /// write leaves both copies on the previous session.
    pub fn set_session(&mut self, session: Session) -> Result<(), StorageError> {
        self.storage.store(SESSION_KEY, &session)?;
        self.current = Some(session);
        self.authenticating = false;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.remove(SESSION_KEY)?;
        if let Some(session) = self.current.take() {
            tracing::info!(username = %session.username, "session cleared");
        }
        self.authenticating = false;
        Ok(())
    }

    /// Mark a login/registration attempt as started. Has no effect while a
    /// session is already active.
    pub fn begin_authentication(&mut self) {
        self.authenticating = true;
    }

    /// End an attempt that did not produce a session.
    pub fn abort_authentication(&mut self) {
        self.authenticating = false;
    }
}
