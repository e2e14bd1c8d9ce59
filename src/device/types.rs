use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::DeviceGrant;

/// Proof that a device was authorized for check-in at one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAuthorization {
    pub device_name: String,
    pub experience_id: String,
    pub slot_id: String,
    pub authorized_by: String,
    pub verified_at: DateTime<Utc>,
}

impl DeviceAuthorization {
    pub fn from_grant(grant: DeviceGrant, verified_at: DateTime<Utc>) -> Self {
        Self {
            device_name: grant.device_name,
            experience_id: grant.experience_id,
            slot_id: grant.slot_id,
            authorized_by: grant.authorized_by,
            verified_at,
        }
    }
}

/// The authorization the check-in tool operates under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDevice {
    pub token: String,
    pub authorization: DeviceAuthorization,
    /// Local `exp` check only; see [`super::token::token_expired`].
    pub token_expired: bool,
}
