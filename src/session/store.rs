use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::types::{SessionResult, StoredSession, UserProfile};
use crate::error::AuthError;
use crate::storage::{read_json, write_json, KeyValueStore};

/// Durable key holding the current session.
pub const SESSION_KEY: &str = "ryfty-session";

/// Owner of the authenticated/unauthenticated state and the current user.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Resolve once the store has finished rehydrating any prior session.
    async fn wait_ready(&self);

    fn is_authenticated(&self) -> bool;

    fn current_user(&self) -> Option<UserProfile>;

    /// Adopt a freshly issued session, replacing any current one.
    async fn adopt(&self, session: SessionResult) -> Result<UserProfile, AuthError>;

    /// Drop the current session.
    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Session store persisting the current session to durable storage.
///
/// Starts not-ready; [`PersistentSessionStore::initialize`] rehydrates the
/// stored session and releases every [`SessionStore::wait_ready`] caller.
pub struct PersistentSessionStore {
    storage: Arc<dyn KeyValueStore>,
    current: RwLock<Option<StoredSession>>,
    ready: watch::Sender<bool>,
}

impl PersistentSessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            storage,
            current: RwLock::new(None),
            ready,
        }
    }

    /// Rehydrate from durable storage and mark the store ready.
    ///
    /// Returns whether a prior session was restored. Partial or unreadable
    /// records are cleared.
    pub async fn initialize(&self) -> Result<bool, AuthError> {
        let restored = self.rehydrate();
        self.ready.send_replace(true);
        restored
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// The bearer token of the current session.
    pub fn token(&self) -> Option<String> {
        self.read_current().map(|session| session.token)
    }

    fn rehydrate(&self) -> Result<bool, AuthError> {
        match read_json::<StoredSession>(self.storage.as_ref(), SESSION_KEY) {
            Ok(Some(stored)) if !stored.token.trim().is_empty() => {
                debug!(user = ?stored.user.id, "restored stored session");
                self.write_current(Some(stored))?;
                Ok(true)
            }
            Ok(Some(_)) => {
                warn!("stored session has no token; clearing");
                self.storage.remove(SESSION_KEY)?;
                Ok(false)
            }
            Ok(None) => Ok(false),
            Err(err) => {
                warn!(error = %err, "stored session unreadable; clearing");
                self.storage.remove(SESSION_KEY)?;
                Ok(false)
            }
        }
    }

    fn read_current(&self) -> Option<StoredSession> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }

    fn write_current(&self, session: Option<StoredSession>) -> Result<(), AuthError> {
        let mut guard = self
            .current
            .write()
            .map_err(|_| AuthError::Storage("session lock poisoned".to_string()))?;
        *guard = session;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for PersistentSessionStore {
    async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives as long as `self`, so this only ends once ready.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    fn is_authenticated(&self) -> bool {
        self.read_current().is_some()
    }

    fn current_user(&self) -> Option<UserProfile> {
        self.read_current().map(|session| session.user)
    }

    async fn adopt(&self, session: SessionResult) -> Result<UserProfile, AuthError> {
        if session.token.trim().is_empty() {
            return Err(AuthError::MalformedCallback(
                "session token is empty".to_string(),
            ));
        }
        let user = UserProfile::from(&session);
        let stored = StoredSession {
            token: session.token,
            user: user.clone(),
            saved_at: Utc::now(),
        };
        write_json(self.storage.as_ref(), SESSION_KEY, &stored)?;
        self.write_current(Some(stored))?;
        info!(user = ?user.id, role = %user.role, "session adopted");
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.storage.remove(SESSION_KEY)?;
        self.write_current(None)?;
        info!("session cleared");
        Ok(())
    }
}
