use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::KeyValueStore;
use crate::error::AuthError;

static CLAIM_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Configuration for file-backed storage.
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    pub base_dir: PathBuf,
}

impl FileStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_ryfty_dir()
    }
}

/// Durable store writing one TOML file per key.
///
/// # Example
/// ```no_run
/// use ryfty_auth::storage::{FileStore, FileStoreConfig, KeyValueStore};
///
/// let store = FileStore::new(FileStoreConfig::new("/tmp/ryfty".into()));
/// store.set("ryfty-device-active", "device-token")?;
/// # Ok::<(), ryfty_auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(config: FileStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.toml", normalize_key(key)))
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn read_entry(path: &Path) -> Result<Option<EntryFile>, AuthError> {
        let raw = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        Ok(Some(toml::from_str(&raw)?))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        Ok(Self::read_entry(&self.entry_path(key))?.map(|entry| entry.value))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        let path = self.entry_path(key);
        Self::ensure_parent(&path)?;
        let entry = EntryFile {
            version: 1,
            key: key.to_string(),
            value: value.to_string(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&entry)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }

    fn take(&self, key: &str) -> Result<Option<String>, AuthError> {
        // Renaming is atomic: only one claimant can move the file away.
        let path = self.entry_path(key);
        let claim = path.with_extension(format!(
            "claim-{}-{}",
            std::process::id(),
            CLAIM_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        match fs::rename(&path, &claim) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        }
        let entry = Self::read_entry(&claim);
        fs::remove_file(&claim)?;
        Ok(entry?.map(|entry| entry.value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryFile {
    version: u32,
    key: String,
    value: String,
    saved_at: DateTime<Utc>,
}

fn default_ryfty_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".ryfty"))
        .unwrap_or_else(|| PathBuf::from(".ryfty"))
}

fn normalize_key(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() || lower == '-' || lower == '_' {
            out.push(lower);
        } else {
            out.push('-');
        }
    }
    if out.trim_matches('-').is_empty() {
        "default".to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(FileStoreConfig::new(dir.path().to_path_buf()));
        (dir, store)
    }

    #[test]
    fn values_survive_a_new_store_instance() {
        let (dir, store) = temp_store();
        store.set("ryfty-session", r#"{"token":"abc"}"#).unwrap();

        let reopened = FileStore::new(FileStoreConfig::new(dir.path().to_path_buf()));
        assert_eq!(
            reopened.get("ryfty-session").unwrap().as_deref(),
            Some(r#"{"token":"abc"}"#)
        );
    }

    #[test]
    fn remove_is_idempotent() {
        let (_dir, store) = temp_store();
        store.set("ryfty-session", "x").unwrap();
        store.remove("ryfty-session").unwrap();
        store.remove("ryfty-session").unwrap();
        assert!(store.get("ryfty-session").unwrap().is_none());
    }

    #[test]
    fn take_reads_then_deletes() {
        let (dir, store) = temp_store();
        store.set("ryfty-auth-state", "intent").unwrap();
        assert_eq!(store.take("ryfty-auth-state").unwrap().as_deref(), Some("intent"));
        assert!(store.take("ryfty-auth-state").unwrap().is_none());
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn keys_are_normalized_to_safe_file_names() {
        assert_eq!(normalize_key("ryfty-device.ab12"), "ryfty-device-ab12");
        assert_eq!(normalize_key("../../etc/passwd"), "------etc-passwd");
        assert_eq!(normalize_key("   "), "default");
    }
}
