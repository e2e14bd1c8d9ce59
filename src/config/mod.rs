//! Configuration (layered: code > env > defaults).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bon::Builder;
use tracing::warn;

use crate::callback::CallbackTiming;
use crate::storage::{FileStore, FileStoreConfig};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_SUCCESS_DELAY: Duration = Duration::from_millis(1500);
pub const DEFAULT_ERROR_DELAY: Duration = Duration::from_millis(3000);

/// Settings shared by the sign-in and device flows.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use ryfty_auth::config::AuthConfig;
///
/// let config = AuthConfig::builder()
///     .api_base_url("https://api.ryfty.test")
///     .error_delay(Duration::from_secs(5))
///     .build();
/// assert!(config.external_sign_in);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct AuthConfig {
    /// Backend base URL, without a trailing path.
    #[builder(default = DEFAULT_API_BASE_URL.to_string(), into)]
    pub api_base_url: String,
    /// Whether the external identity-provider sign-in is offered.
    #[builder(default = true)]
    pub external_sign_in: bool,
    /// Directory for durable storage.
    #[builder(default = FileStoreConfig::default_dir(), into)]
    pub data_dir: PathBuf,
    /// Delay before leaving a successful callback screen.
    #[builder(default = DEFAULT_SUCCESS_DELAY)]
    pub success_delay: Duration,
    /// Delay before leaving a failed callback screen.
    #[builder(default = DEFAULT_ERROR_DELAY)]
    pub error_delay: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl AuthConfig {
    /// Load from environment variables (`RYFTY_API_BASE_URL`, `RYFTY_DATA_DIR`, ...).
    ///
    /// Reads a `.env` file first when present. Unparseable values fall back to
    /// their defaults with a warning.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();

        if let Ok(url) = std::env::var("RYFTY_API_BASE_URL") {
            if !url.trim().is_empty() {
                config.api_base_url = url.trim().to_string();
            }
        }
        if let Ok(dir) = std::env::var("RYFTY_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir.trim());
            }
        }
        if let Some(enabled) = env_flag("RYFTY_GOOGLE_AUTH") {
            config.external_sign_in = enabled;
        }
        if let Some(ms) = env_parse::<u64>("RYFTY_CALLBACK_SUCCESS_DELAY_MS") {
            config.success_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("RYFTY_CALLBACK_ERROR_DELAY_MS") {
            config.error_delay = Duration::from_millis(ms);
        }

        config
    }

    /// Delays used by the callback resolver.
    pub fn timing(&self) -> CallbackTiming {
        CallbackTiming {
            success_delay: self.success_delay,
            error_delay: self.error_delay,
        }
    }

    /// Durable store rooted at [`AuthConfig::data_dir`].
    pub fn durable_store(&self) -> FileStore {
        FileStore::new(FileStoreConfig::new(self.data_dir.clone()))
    }
}

fn env_flag(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        other => {
            warn!(key, value = other, "ignoring unrecognized boolean");
            None
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_callback_delays() {
        let config = AuthConfig::default();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        let timing = config.timing();
        assert_eq!(timing.success_delay, Duration::from_millis(1500));
        assert_eq!(timing.error_delay, Duration::from_secs(3));
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = AuthConfig::builder()
            .api_base_url("https://api.ryfty.test")
            .external_sign_in(false)
            .data_dir("/var/lib/ryfty")
            .build();
        assert_eq!(config.api_base_url, "https://api.ryfty.test");
        assert!(!config.external_sign_in);
        assert_eq!(config.durable_store().base_dir(), std::path::Path::new("/var/lib/ryfty"));
    }
}
