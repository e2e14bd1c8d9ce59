use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{DeviceGrant, DeviceVerificationClient, IdentityClient, Registration};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::session::{Role, SessionResult};
use crate::wizard::FormDraft;

const SIGNIN_PATH: &str = "/auth/signin";
const SIGNUP_PATH: &str = "/auth/signup";
const VERIFY_PATH: &str = "/auth/verify";
const RESET_REQUEST_PATH: &str = "/auth/reset/request";
const RESET_VERIFY_PATH: &str = "/auth/reset/verify";
const PHONE_SEND_PATH: &str = "/auth/phone/send";
const PHONE_VERIFY_PATH: &str = "/auth/phone/verify";
const DEVICE_VERIFY_PATH: &str = "/checkin/devices/verify";

const TOKEN_EXPIRED_CODE: &str = "token_expired";

/// JSON-over-HTTP client for the Ryfty backend.
///
/// # Example
/// ```no_run
/// use ryfty_auth::client::{DeviceVerificationClient, HttpClient};
///
/// # async fn example() -> Result<(), ryfty_auth::AuthError> {
/// let client = HttpClient::new("http://localhost:5000");
/// let grant = client.verify_device_token("device-token").await?;
/// println!("{} is authorized for slot {}", grant.device_name, grant.slot_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.api_base_url.clone())
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::Response, AuthError> {
        debug!(path, "POST");
        let resp = self
            .client
            .post(self.endpoint(path))
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;
        Ok(resp)
    }

    async fn post_for<R: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
        fallback_error: &str,
    ) -> Result<R, AuthError> {
        let resp = self.post(path, body).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(rejection(status, read_error(resp).await, fallback_error));
        }
        Ok(resp.json().await?)
    }

    async fn post_for_message(
        &self,
        path: &str,
        body: &Value,
        fallback_error: &str,
        fallback_message: &str,
    ) -> Result<String, AuthError> {
        let resp = self.post(path, body).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(rejection(status, read_error(resp).await, fallback_error));
        }
        let body = resp.json::<MessageBody>().await.unwrap_or_default();
        Ok(body
            .message
            .unwrap_or_else(|| fallback_message.to_string()))
    }
}

#[async_trait]
impl IdentityClient for HttpClient {
    async fn authenticate(&self, email: &str, password: &str) -> Result<SessionResult, AuthError> {
        let body: SessionBody = self
            .post_for(
                SIGNIN_PATH,
                &json!({ "identifier": email, "password": password }),
                "Login failed",
            )
            .await?;
        Ok(body.into_session())
    }

    async fn register(&self, draft: &FormDraft) -> Result<Registration, AuthError> {
        let mut payload = Map::new();
        payload.insert("password".into(), json!(draft.password));
        payload.insert("name".into(), json!(draft.full_name()));
        payload.insert("role".into(), json!(draft.user_type.to_string()));
        if !draft.email.trim().is_empty() {
            payload.insert("email".into(), json!(draft.email.trim()));
        }
        if !draft.phone.trim().is_empty() {
            payload.insert("phone".into(), json!(draft.phone.trim()));
        }
        let message = self
            .post_for_message(
                SIGNUP_PATH,
                &Value::Object(payload),
                "Registration failed",
                "Registration successful. Please check your email/phone for verification code.",
            )
            .await?;
        Ok(Registration {
            message,
            needs_verification: true,
        })
    }

    async fn verify_account(&self, email: &str, code: &str) -> Result<SessionResult, AuthError> {
        let body: SessionBody = self
            .post_for(
                VERIFY_PATH,
                &json!({ "email": email, "token": code }),
                "Verification failed",
            )
            .await?;
        Ok(body.into_session())
    }

    async fn request_password_reset(&self, email: &str) -> Result<String, AuthError> {
        self.post_for_message(
            RESET_REQUEST_PATH,
            &json!({ "email": email }),
            "Failed to send reset code",
            "Password reset code sent to your email.",
        )
        .await
    }

    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<String, AuthError> {
        self.post_for_message(
            RESET_VERIFY_PATH,
            &json!({ "email": email, "token": code, "password": new_password }),
            "Password reset failed",
            "Password reset successfully!",
        )
        .await
    }

    async fn send_phone_code(&self, phone: &str) -> Result<String, AuthError> {
        self.post_for_message(
            PHONE_SEND_PATH,
            &json!({ "phoneNumber": phone }),
            "Failed to send verification code",
            "Verification code sent.",
        )
        .await
    }

    async fn verify_phone_code(&self, phone: &str, code: &str) -> Result<SessionResult, AuthError> {
        let body: SessionBody = self
            .post_for(
                PHONE_VERIFY_PATH,
                &json!({ "phoneNumber": phone, "code": code }),
                "Phone verification failed",
            )
            .await?;
        Ok(body.into_session())
    }
}

#[async_trait]
impl DeviceVerificationClient for HttpClient {
    async fn verify_device_token(&self, token: &str) -> Result<DeviceGrant, AuthError> {
        let resp = self.post(DEVICE_VERIFY_PATH, &json!({ "token": token })).await?;
        let status = resp.status();
        if status == StatusCode::GONE {
            return Err(AuthError::TokenExpired);
        }
        if !status.is_success() {
            let body = read_error(resp).await;
            let expired = body
                .code
                .as_deref()
                .is_some_and(|code| code.eq_ignore_ascii_case(TOKEN_EXPIRED_CODE));
            if expired {
                return Err(AuthError::TokenExpired);
            }
            return Err(rejection(status, body, "Failed to verify device token"));
        }
        let body: DeviceBody = resp.json().await?;
        debug!(device = %body.device_name, message = ?body.message, "device token verified");
        Ok(DeviceGrant {
            device_name: body.device_name,
            experience_id: body.experience_id,
            slot_id: body.slot_id,
            authorized_by: body.authorized_by,
        })
    }
}

async fn read_error(resp: reqwest::Response) -> ErrorBody {
    resp.json::<ErrorBody>().await.unwrap_or_default()
}

fn rejection(status: StatusCode, body: ErrorBody, fallback: &str) -> AuthError {
    debug!(status = status.as_u16(), code = ?body.code, "backend rejected request");
    let message = body
        .error
        .or(body.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    AuthError::Rejected(message)
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MessageBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    access_token: String,
    user: UserBody,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    avatar_url: Option<String>,
    role: Option<String>,
}

impl SessionBody {
    fn into_session(self) -> SessionResult {
        SessionResult {
            token: self.access_token,
            user_id: self.user.id,
            email: self.user.email,
            display_name: self.user.name,
            avatar_url: self.user.avatar_url,
            role: Role::parse_lenient(self.user.role.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeviceBody {
    message: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    device_name: String,
    #[serde(deserialize_with = "string_or_number")]
    experience_id: String,
    #[serde(deserialize_with = "string_or_number")]
    slot_id: String,
    #[serde(deserialize_with = "string_or_number")]
    authorized_by: String,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
