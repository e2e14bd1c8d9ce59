//! CLI device command handlers for verify, status, and forget.

use std::sync::Arc;

use chrono::Utc;
use url::Url;

use crate::client::HttpClient;
use crate::config::AuthConfig;
use crate::device::{
    token_expiry, DeviceAuthorizationVerifier, DeviceCredentialStore, VerificationState,
};
use crate::nav::{with_query_param, MemoryNavigator};

const SCAN_PATH: &str = "/checkin/auth";

/// Handle `ryfty-auth device verify <TOKEN|URL>`.
pub async fn handle_verify(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AuthConfig::from_env();
    let location = scan_location(&config, input)?;
    let navigator = Arc::new(MemoryNavigator::from_url(location));
    let mut verifier = DeviceAuthorizationVerifier::new(
        Arc::new(HttpClient::from_config(&config)),
        credentials(&config),
        navigator,
    );

    match verifier.verify_from_url().await {
        VerificationState::Authorized(authorization) => {
            println!("✅ Device authorized: {}", authorization.device_name);
            println!("   Experience: {}", authorization.experience_id);
            println!("   Slot:       {}", authorization.slot_id);
            println!("   Authorized by {}", authorization.authorized_by);
            Ok(())
        }
        VerificationState::Failed(failure) => {
            eprintln!("❌ {}", failure.message());
            std::process::exit(1);
        }
        VerificationState::Verifying => Err("verification did not finish".into()),
    }
}

/// Handle `ryfty-auth device status`.
pub async fn handle_status() -> Result<(), Box<dyn std::error::Error>> {
    let config = AuthConfig::from_env();
    match credentials(&config).active(Utc::now())? {
        Some(device) => {
            let authorization = &device.authorization;
            println!("{}", authorization.device_name);
            println!("  experience:  {}", authorization.experience_id);
            println!("  slot:        {}", authorization.slot_id);
            println!("  verified at: {}", authorization.verified_at.to_rfc3339());
            match token_expiry(&device.token) {
                Some(expiry) if device.token_expired => println!("  expired:     {expiry}"),
                Some(expiry) => println!("  expires:     {expiry}"),
                None => println!("  expires:     unknown"),
            }
        }
        None => println!("No device authorized. Scan the provider's QR code."),
    }
    Ok(())
}

/// Handle `ryfty-auth device forget`.
pub async fn handle_forget() -> Result<(), Box<dyn std::error::Error>> {
    let config = AuthConfig::from_env();
    if credentials(&config).forget_active()? {
        println!("Device authorization removed");
    } else {
        println!("No device authorization stored");
    }
    Ok(())
}

fn credentials(config: &AuthConfig) -> DeviceCredentialStore {
    DeviceCredentialStore::new(Arc::new(config.durable_store()))
}

/// The page a scanned QR code would open: either `input` itself or the scan
/// page carrying `input` as its token.
fn scan_location(config: &AuthConfig, input: &str) -> Result<Url, url::ParseError> {
    if let Ok(url) = Url::parse(input) {
        if url.has_host() {
            return Ok(url);
        }
    }
    let page = Url::parse(&config.api_base_url)?.join(SCAN_PATH)?;
    Ok(with_query_param(&page, "token", Some(input.trim())))
}
