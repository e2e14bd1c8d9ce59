use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Account role. Also used as the wizard's user type.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Provider,
}

impl Role {
    /// Parse a role, defaulting to [`Role::Customer`] for missing or unknown values.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        value
            .and_then(|raw| raw.trim().to_ascii_lowercase().parse().ok())
            .unwrap_or_default()
    }
}

/// Credential and user attributes produced by a successful sign-in.
///
/// Built from redirect-callback parameters or from a direct credential
/// exchange, then handed to a [`super::SessionStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub token: String,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
}

/// The current-user projection owned by the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl From<&SessionResult> for UserProfile {
    fn from(session: &SessionResult) -> Self {
        Self {
            id: session.user_id.clone(),
            email: session.email.clone(),
            name: session.display_name.clone(),
            avatar_url: session.avatar_url.clone(),
            role: session.role,
        }
    }
}

/// Durable session record used to rehydrate on start-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: UserProfile,
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_role_defaults_to_customer() {
        assert_eq!(Role::parse_lenient(Some("provider")), Role::Provider);
        assert_eq!(Role::parse_lenient(Some(" Provider ")), Role::Provider);
        assert_eq!(Role::parse_lenient(Some("admin")), Role::Customer);
        assert_eq!(Role::parse_lenient(None), Role::Customer);
    }

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::Provider.to_string(), "provider");
        assert_eq!("customer".parse::<Role>().unwrap(), Role::Customer);
        assert!("user".parse::<Role>().is_err());
    }
}
