use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::token::token_expired;
use super::types::{ActiveDevice, DeviceAuthorization};
use crate::error::AuthError;
use crate::storage::{read_json, write_json, KeyValueStore};

/// Durable key pointing at the most recently authorized token.
pub const ACTIVE_DEVICE_KEY: &str = "ryfty-device-active";
const RECORD_PREFIX: &str = "ryfty-device.";

#[derive(Debug, Serialize, Deserialize)]
struct DeviceRecord {
    token: String,
    authorization: DeviceAuthorization,
}

/// Durable device authorizations keyed by token, plus the active pointer.
#[derive(Clone)]
pub struct DeviceCredentialStore {
    storage: Arc<dyn KeyValueStore>,
}

impl DeviceCredentialStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Persist `authorization` for `token` and make it the active device.
    pub fn save(&self, token: &str, authorization: &DeviceAuthorization) -> Result<(), AuthError> {
        let record = DeviceRecord {
            token: token.to_string(),
            authorization: authorization.clone(),
        };
        write_json(self.storage.as_ref(), &record_key(token), &record)?;
        self.storage.set(ACTIVE_DEVICE_KEY, token)?;
        debug!(device = %authorization.device_name, slot = %authorization.slot_id, "device authorization saved");
        Ok(())
    }

    pub fn load(&self, token: &str) -> Result<Option<DeviceAuthorization>, AuthError> {
        let key = record_key(token);
        match read_json::<DeviceRecord>(self.storage.as_ref(), &key) {
            Ok(record) => Ok(record
                .filter(|record| record.token == token)
                .map(|record| record.authorization)),
            Err(AuthError::Serialization(err)) => {
                warn!(error = %err, "device record unreadable; clearing");
                self.storage.remove(&key)?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Drop the authorization for `token`, clearing the active pointer if it
    /// referred to it.
    pub fn remove(&self, token: &str) -> Result<(), AuthError> {
        self.storage.remove(&record_key(token))?;
        if self.storage.get(ACTIVE_DEVICE_KEY)?.as_deref() == Some(token) {
            self.storage.remove(ACTIVE_DEVICE_KEY)?;
        }
        debug!("device authorization removed");
        Ok(())
    }

    pub fn active(&self, now: DateTime<Utc>) -> Result<Option<ActiveDevice>, AuthError> {
        let Some(token) = self.storage.get(ACTIVE_DEVICE_KEY)? else {
            return Ok(None);
        };
        match self.load(&token)? {
            Some(authorization) => Ok(Some(ActiveDevice {
                token_expired: token_expired(&token, now),
                token,
                authorization,
            })),
            None => {
                warn!("active device pointer has no record; clearing");
                self.storage.remove(ACTIVE_DEVICE_KEY)?;
                Ok(None)
            }
        }
    }

    pub fn has_active(&self) -> Result<bool, AuthError> {
        Ok(self.active(Utc::now())?.is_some())
    }

    /// Remove the active authorization. Returns whether one existed.
    pub fn forget_active(&self) -> Result<bool, AuthError> {
        match self.storage.get(ACTIVE_DEVICE_KEY)? {
            Some(token) => {
                self.remove(&token)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Pre-flight for check-in operations.
    pub fn require_active(&self, now: DateTime<Utc>) -> Result<ActiveDevice, AuthError> {
        let device = self.active(now)?.ok_or(AuthError::DeviceNotAuthorized)?;
        if device.token_expired {
            return Err(AuthError::TokenExpired);
        }
        Ok(device)
    }
}

impl std::fmt::Debug for DeviceCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceCredentialStore").finish_non_exhaustive()
    }
}

fn record_key(token: &str) -> String {
    format!("{RECORD_PREFIX}{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn authorization() -> DeviceAuthorization {
        DeviceAuthorization {
            device_name: "Gate tablet".into(),
            experience_id: "42".into(),
            slot_id: "7".into(),
            authorized_by: "provider-1".into(),
            verified_at: Utc::now(),
        }
    }

    #[test]
    fn record_keys_do_not_contain_the_token() {
        let key = record_key("secret-token");
        assert!(key.starts_with(RECORD_PREFIX));
        assert!(!key.contains("secret-token"));
        assert_eq!(key.len(), RECORD_PREFIX.len() + 64);
    }

    #[test]
    fn save_then_load_and_remove() {
        let store = DeviceCredentialStore::new(Arc::new(MemoryStore::new()));
        store.save("tok", &authorization()).unwrap();
        assert_eq!(store.load("tok").unwrap().unwrap().slot_id, "7");
        assert!(store.has_active().unwrap());

        store.remove("tok").unwrap();
        assert!(store.load("tok").unwrap().is_none());
        assert!(!store.has_active().unwrap());
    }

    #[test]
    fn removing_another_token_keeps_the_active_pointer() {
        let store = DeviceCredentialStore::new(Arc::new(MemoryStore::new()));
        store.save("tok", &authorization()).unwrap();
        store.remove("other").unwrap();
        assert!(store.has_active().unwrap());
    }

    #[test]
    fn dangling_pointer_is_cleared() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(ACTIVE_DEVICE_KEY, "ghost").unwrap();
        let store = DeviceCredentialStore::new(storage.clone());
        assert!(store.active(Utc::now()).unwrap().is_none());
        assert!(storage.get(ACTIVE_DEVICE_KEY).unwrap().is_none());
    }

    #[test]
    fn require_active_without_a_device() {
        let store = DeviceCredentialStore::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            store.require_active(Utc::now()),
            Err(AuthError::DeviceNotAuthorized)
        ));
        assert!(!store.forget_active().unwrap());
    }
}
