use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::store::DeviceCredentialStore;
use super::types::DeviceAuthorization;
use crate::callback::DEFAULT_HOME;
use crate::client::DeviceVerificationClient;
use crate::error::AuthError;
use crate::nav::{query_param, Navigator};

/// Where an authorized device goes next.
pub const CHECKIN_PATH: &str = "/checkin";

const EXPIRED_MESSAGE: &str =
    "This authorization token has expired. Please request a new one from the provider.";
const MISSING_TOKEN_MESSAGE: &str = "No authorization token provided";
const GENERIC_MESSAGE: &str = "Failed to verify device token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFailure {
    Expired,
    Other(String),
}

impl DeviceFailure {
    pub fn message(&self) -> &str {
        match self {
            Self::Expired => EXPIRED_MESSAGE,
            Self::Other(message) => message,
        }
    }

    fn from_error(err: &AuthError) -> Self {
        match err {
            AuthError::TokenExpired => Self::Expired,
            AuthError::Rejected(message) => Self::Other(message.clone()),
            _ => Self::Other(GENERIC_MESSAGE.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationState {
    Verifying,
    Authorized(DeviceAuthorization),
    Failed(DeviceFailure),
}

/// Turns a scanned device token into a stored check-in authorization.
pub struct DeviceAuthorizationVerifier {
    client: Arc<dyn DeviceVerificationClient>,
    credentials: DeviceCredentialStore,
    navigator: Arc<dyn Navigator>,
    state: VerificationState,
}

impl DeviceAuthorizationVerifier {
    pub fn new(
        client: Arc<dyn DeviceVerificationClient>,
        credentials: DeviceCredentialStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client,
            credentials,
            navigator,
            state: VerificationState::Verifying,
        }
    }

    pub fn state(&self) -> &VerificationState {
        &self.state
    }

    /// Verify the `token` query parameter of the current location.
    pub async fn verify_from_url(&mut self) -> &VerificationState {
        let token = query_param(&self.navigator.location(), "token");
        self.verify(token.as_deref()).await
    }

    pub async fn verify(&mut self, token: Option<&str>) -> &VerificationState {
        let Some(token) = token.map(str::trim).filter(|token| !token.is_empty()) else {
            warn!("device verification without a token");
            self.state = VerificationState::Failed(DeviceFailure::Other(
                MISSING_TOKEN_MESSAGE.to_string(),
            ));
            return &self.state;
        };

        self.state = VerificationState::Verifying;
        let result = match self.client.verify_device_token(token).await {
            Ok(grant) => {
                let authorization = DeviceAuthorization::from_grant(grant, Utc::now());
                self.credentials
                    .save(token, &authorization)
                    .map(|()| authorization)
            }
            Err(err) => Err(err),
        };

        self.state = match result {
            Ok(authorization) => {
                info!(
                    device = %authorization.device_name,
                    experience = %authorization.experience_id,
                    slot = %authorization.slot_id,
                    "device authorized"
                );
                VerificationState::Authorized(authorization)
            }
            Err(err) => {
                let failure = DeviceFailure::from_error(&err);
                warn!(error = %err, expired = failure == DeviceFailure::Expired, "device verification failed");
                if let Err(purge) = self.credentials.remove(token) {
                    warn!(error = %purge, "could not purge device authorization");
                }
                VerificationState::Failed(failure)
            }
        };
        &self.state
    }

    /// Continue to the check-in tool. Only valid once authorized.
    pub fn proceed_to_checkin(&self) -> Result<(), AuthError> {
        match self.state {
            VerificationState::Authorized(_) => {
                self.navigator.push(CHECKIN_PATH);
                Ok(())
            }
            _ => Err(AuthError::DeviceNotAuthorized),
        }
    }

    /// Close a window opened by another window, otherwise go home.
    pub fn dismiss(&self) {
        if self.navigator.opened_as_child() {
            self.navigator.close();
        } else {
            self.navigator.push(DEFAULT_HOME);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_messages() {
        assert_eq!(DeviceFailure::Expired.message(), EXPIRED_MESSAGE);
        assert_eq!(
            DeviceFailure::from_error(&AuthError::Rejected("Device limit reached".into())),
            DeviceFailure::Other("Device limit reached".into())
        );
        assert_eq!(
            DeviceFailure::from_error(&AuthError::Network("timeout".into())).message(),
            GENERIC_MESSAGE
        );
    }
}
