//! Check-in device authorization.

pub mod store;
pub mod token;
pub mod types;
pub mod verifier;

pub use store::{DeviceCredentialStore, ACTIVE_DEVICE_KEY};
pub use token::{token_expired, token_expiry};
pub use types::{ActiveDevice, DeviceAuthorization};
pub use verifier::{DeviceAuthorizationVerifier, DeviceFailure, VerificationState, CHECKIN_PATH};
