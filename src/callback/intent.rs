use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::session::Role;
use crate::storage::{write_json, KeyValueStore};
use crate::wizard::AuthMode;

/// Session-scoped key holding the pending intent.
pub const INTENT_KEY: &str = "ryfty-auth-state";

/// What the user was doing before leaving for the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRedirectIntent {
    #[serde(rename = "userType", default, deserialize_with = "lenient_role")]
    pub user_type: Role,
    #[serde(default, deserialize_with = "lenient_mode")]
    pub mode: AuthMode,
    #[serde(rename = "redirect", default)]
    pub redirect_target: Option<String>,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl PendingRedirectIntent {
    pub fn new(user_type: Role, mode: AuthMode, redirect_target: Option<String>) -> Self {
        Self {
            user_type,
            mode,
            redirect_target,
            created_at: Utc::now(),
        }
    }
}

fn lenient_role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Role, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(Role::parse_lenient(raw.as_deref()))
}

fn lenient_mode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AuthMode, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|mode| mode.parse().ok()).unwrap_or_default())
}

/// Holder of the single pending intent in session-scoped storage.
#[derive(Clone)]
pub struct IntentStash {
    storage: Arc<dyn KeyValueStore>,
}

impl IntentStash {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Record `intent`, replacing any earlier one.
    pub fn stash(&self, intent: &PendingRedirectIntent) -> Result<(), AuthError> {
        write_json(self.storage.as_ref(), INTENT_KEY, intent)?;
        debug!(user_type = %intent.user_type, mode = %intent.mode, "redirect intent stashed");
        Ok(())
    }

    /// Consume the intent. A record that does not parse is still removed and
    /// reported as absent.
    pub fn take(&self) -> Result<Option<PendingRedirectIntent>, AuthError> {
        let Some(raw) = self.storage.take(INTENT_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(intent) => {
                debug!("redirect intent consumed");
                Ok(Some(intent))
            }
            Err(err) => {
                warn!(error = %err, "discarding unreadable redirect intent");
                Ok(None)
            }
        }
    }

    pub fn is_pending(&self) -> Result<bool, AuthError> {
        Ok(self.storage.get(INTENT_KEY)?.is_some())
    }
}

impl std::fmt::Debug for IntentStash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentStash").finish_non_exhaustive()
    }
}
