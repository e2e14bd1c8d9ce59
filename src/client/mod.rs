//! Contracts for the identity and device-verification backends.

pub mod http;

pub use http::HttpClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::session::SessionResult;
use crate::wizard::FormDraft;

/// Result of a registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub message: String,
    pub needs_verification: bool,
}

/// Device and scope attributes returned for a valid device token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceGrant {
    pub device_name: String,
    pub experience_id: String,
    pub slot_id: String,
    pub authorized_by: String,
}

/// Credential collection endpoints used by the sign-in wizard.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> Result<SessionResult, AuthError>;

    async fn register(&self, draft: &FormDraft) -> Result<Registration, AuthError>;

    async fn verify_account(&self, email: &str, code: &str) -> Result<SessionResult, AuthError>;

    /// Returns the backend's confirmation message.
    async fn request_password_reset(&self, email: &str) -> Result<String, AuthError>;

    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<String, AuthError>;

    async fn send_phone_code(&self, phone: &str) -> Result<String, AuthError>;

    async fn verify_phone_code(&self, phone: &str, code: &str) -> Result<SessionResult, AuthError>;
}

/// Exchange of a one-time device token for its grant.
///
/// Implementations must report expiry as [`AuthError::TokenExpired`].
#[async_trait]
pub trait DeviceVerificationClient: Send + Sync {
    async fn verify_device_token(&self, token: &str) -> Result<DeviceGrant, AuthError>;
}
