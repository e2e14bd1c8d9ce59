//! Key-value storage surfaces.
//!
//! Two lifetimes are modelled with the same trait: a session-scoped store that
//! lives as long as the tab ([`MemoryStore`]) and a durable store that survives
//! restarts ([`FileStore`]).

pub mod file;
pub mod memory;

pub use file::{FileStore, FileStoreConfig};
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AuthError;

/// String key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AuthError>;
    fn remove(&self, key: &str) -> Result<(), AuthError>;

    /// Read and delete `key` as one operation.
    ///
    /// At most one caller observes a given value; concurrent callers see `None`.
    fn take(&self, key: &str) -> Result<Option<String>, AuthError>;
}

/// Load a JSON value stored under `key`.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, AuthError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Store `value` as JSON under `key`.
pub fn write_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), AuthError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
