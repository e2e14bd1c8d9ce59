//! Error types for the sign-in and device authorization flows.

use thiserror::Error;

use crate::wizard::validation::ValidationError;

const NETWORK_MESSAGE: &str = "Network error. Please try again.";
const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Normalized errors across the wizard, callback and device flows.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend refused the request and supplied a user-facing reason.
    #[error("{0}")]
    Rejected(String),

    #[error("This authorization token has expired")]
    TokenExpired,

    #[error("Device not authorized. Please scan the QR code from the provider.")]
    DeviceNotAuthorized,

    #[error("Malformed callback: {0}")]
    MalformedCallback(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// How a failure is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Shown inline; the flow stays on the same step.
    RecoverableInPlace,
    /// Shown full-screen, then a timed redirect back to a safe entry point.
    FlowAborting,
    /// Shown full-screen with no automatic redirect; stale credentials are purged.
    AuthorizationDenying,
}

impl AuthError {
    /// Classify this error by the way it interrupts a flow.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Validation(_) | Self::Rejected(_) | Self::Network(_) | Self::InvalidResponse(_) => {
                FailureKind::RecoverableInPlace
            }
            Self::TokenExpired | Self::DeviceNotAuthorized => FailureKind::AuthorizationDenying,
            Self::MalformedCallback(_)
            | Self::Configuration(_)
            | Self::Storage(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::InvalidState(_) => FailureKind::FlowAborting,
        }
    }

    /// Plain-language message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Rejected(message) => message.clone(),
            Self::TokenExpired | Self::DeviceNotAuthorized => self.to_string(),
            Self::Network(_) => NETWORK_MESSAGE.to_string(),
            _ => GENERIC_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::InvalidResponse(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<url::ParseError> for AuthError {
    fn from(error: url::ParseError) -> Self {
        Self::Configuration(format!("invalid URL: {error}"))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_stay_in_place() {
        let err = AuthError::from(ValidationError::InvalidEmail);
        assert_eq!(err.failure_kind(), FailureKind::RecoverableInPlace);
        assert_eq!(err.user_message(), "Please enter a valid email address");
    }

    #[test]
    fn expiry_denies_authorization() {
        assert_eq!(
            AuthError::TokenExpired.failure_kind(),
            FailureKind::AuthorizationDenying
        );
    }

    #[test]
    fn malformed_callback_aborts_flow() {
        let err = AuthError::MalformedCallback("missing token".into());
        assert_eq!(err.failure_kind(), FailureKind::FlowAborting);
        assert_eq!(err.user_message(), GENERIC_MESSAGE);
    }

    #[test]
    fn network_errors_hide_transport_details() {
        let err = AuthError::Network("connection reset by peer".into());
        assert_eq!(err.user_message(), NETWORK_MESSAGE);
    }

    #[test]
    fn rejections_surface_backend_message() {
        let err = AuthError::Rejected("Invalid credentials".into());
        assert_eq!(err.user_message(), "Invalid credentials");
    }
}
