//! Tests for configuration loading.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use ryfty_auth::config::{AuthConfig, DEFAULT_API_BASE_URL};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 5] = [
    "RYFTY_API_BASE_URL",
    "RYFTY_DATA_DIR",
    "RYFTY_GOOGLE_AUTH",
    "RYFTY_CALLBACK_SUCCESS_DELAY_MS",
    "RYFTY_CALLBACK_ERROR_DELAY_MS",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clear_config_env() {
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
}

#[test]
fn from_env_without_variables_uses_defaults() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    let config = AuthConfig::from_env();
    assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    assert!(config.external_sign_in);
    assert_eq!(config.success_delay, Duration::from_millis(1500));
    assert_eq!(config.error_delay, Duration::from_millis(3000));
}

#[test]
fn from_env_reads_every_variable() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();
    std::env::set_var("RYFTY_API_BASE_URL", " https://api.ryfty.test ");
    std::env::set_var("RYFTY_DATA_DIR", "/tmp/ryfty-config-test");
    std::env::set_var("RYFTY_GOOGLE_AUTH", "off");
    std::env::set_var("RYFTY_CALLBACK_SUCCESS_DELAY_MS", "250");
    std::env::set_var("RYFTY_CALLBACK_ERROR_DELAY_MS", "500");

    let config = AuthConfig::from_env();
    assert_eq!(config.api_base_url, "https://api.ryfty.test");
    assert_eq!(config.data_dir, PathBuf::from("/tmp/ryfty-config-test"));
    assert!(!config.external_sign_in);

    let timing = config.timing();
    assert_eq!(timing.success_delay, Duration::from_millis(250));
    assert_eq!(timing.error_delay, Duration::from_millis(500));
}

#[test]
fn from_env_ignores_unparseable_values() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();
    std::env::set_var("RYFTY_GOOGLE_AUTH", "maybe");
    std::env::set_var("RYFTY_CALLBACK_ERROR_DELAY_MS", "soon");
    std::env::set_var("RYFTY_API_BASE_URL", "   ");

    let config = AuthConfig::from_env();
    assert!(config.external_sign_in);
    assert_eq!(config.error_delay, Duration::from_millis(3000));
    assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
}
