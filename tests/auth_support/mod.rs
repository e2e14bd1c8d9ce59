#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ryfty_auth::client::{DeviceGrant, DeviceVerificationClient, IdentityClient, Registration};
use ryfty_auth::nav::MemoryNavigator;
use ryfty_auth::session::{PersistentSessionStore, Role, SessionResult, SessionStore, UserProfile};
use ryfty_auth::storage::MemoryStore;
use ryfty_auth::wizard::FormDraft;
use ryfty_auth::AuthError;

pub const ORIGIN: &str = "https://ryfty.test";

/// Identity backend with canned replies. `Err` strings become rejections.
pub struct StubIdentity {
    session: Mutex<Result<SessionResult, String>>,
    registration: Mutex<Result<Registration, String>>,
    calls: Mutex<Vec<String>>,
}

impl StubIdentity {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(Ok(session_result("jwt-1", Role::Customer))),
            registration: Mutex::new(Ok(Registration {
                message: "Check your email".to_string(),
                needs_verification: true,
            })),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_session(self, session: Result<SessionResult, &str>) -> Self {
        *self.session.lock().expect("stub lock poisoned") = session.map_err(str::to_string);
        self
    }

    pub fn with_registration(self, registration: Result<Registration, &str>) -> Self {
        *self.registration.lock().expect("stub lock poisoned") =
            registration.map_err(str::to_string);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("stub lock poisoned").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("stub lock poisoned").push(call);
    }

    fn session(&self) -> Result<SessionResult, AuthError> {
        self.session
            .lock()
            .expect("stub lock poisoned")
            .clone()
            .map_err(AuthError::Rejected)
    }
}

#[async_trait]
impl IdentityClient for StubIdentity {
    async fn authenticate(&self, email: &str, password: &str) -> Result<SessionResult, AuthError> {
        self.record(format!("authenticate:{email}:{password}"));
        self.session()
    }

    async fn register(&self, draft: &FormDraft) -> Result<Registration, AuthError> {
        self.record(format!("register:{}:{}", draft.email, draft.user_type));
        self.registration
            .lock()
            .expect("stub lock poisoned")
            .clone()
            .map_err(AuthError::Rejected)
    }

    async fn verify_account(&self, email: &str, code: &str) -> Result<SessionResult, AuthError> {
        self.record(format!("verify_account:{email}:{code}"));
        self.session()
    }

    async fn request_password_reset(&self, email: &str) -> Result<String, AuthError> {
        self.record(format!("request_password_reset:{email}"));
        Ok("Password reset code sent to your email.".to_string())
    }

    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        _new_password: &str,
    ) -> Result<String, AuthError> {
        self.record(format!("reset_password:{email}:{code}"));
        Ok("Password reset successfully!".to_string())
    }

    async fn send_phone_code(&self, phone: &str) -> Result<String, AuthError> {
        self.record(format!("send_phone_code:{phone}"));
        Ok("Verification code sent.".to_string())
    }

    async fn verify_phone_code(&self, phone: &str, code: &str) -> Result<SessionResult, AuthError> {
        self.record(format!("verify_phone_code:{phone}:{code}"));
        self.session()
    }
}

/// Canned reply for the device verification endpoint.
#[derive(Clone)]
pub enum DeviceReply {
    Grant(DeviceGrant),
    Expired,
    Rejected(String),
    Network,
}

pub struct StubDeviceClient {
    reply: Mutex<DeviceReply>,
    calls: AtomicUsize,
}

impl StubDeviceClient {
    pub fn new(reply: DeviceReply) -> Self {
        Self {
            reply: Mutex::new(reply),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_reply(&self, reply: DeviceReply) {
        *self.reply.lock().expect("stub lock poisoned") = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceVerificationClient for StubDeviceClient {
    async fn verify_device_token(&self, _token: &str) -> Result<DeviceGrant, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply.lock().expect("stub lock poisoned").clone() {
            DeviceReply::Grant(grant) => Ok(grant),
            DeviceReply::Expired => Err(AuthError::TokenExpired),
            DeviceReply::Rejected(message) => Err(AuthError::Rejected(message)),
            DeviceReply::Network => Err(AuthError::Network("connection refused".to_string())),
        }
    }
}

/// Session store that is always ready and refuses every session.
pub struct RefusingSessionStore;

#[async_trait]
impl SessionStore for RefusingSessionStore {
    async fn wait_ready(&self) {}

    fn is_authenticated(&self) -> bool {
        false
    }

    fn current_user(&self) -> Option<UserProfile> {
        None
    }

    async fn adopt(&self, _session: SessionResult) -> Result<UserProfile, AuthError> {
        Err(AuthError::Storage("quota exceeded".to_string()))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

pub fn session_result(token: &str, role: Role) -> SessionResult {
    SessionResult {
        token: token.to_string(),
        user_id: Some("user-1".to_string()),
        email: Some("amina@ryfty.test".to_string()),
        display_name: Some("Amina Okafor".to_string()),
        avatar_url: None,
        role,
    }
}

pub fn grant() -> DeviceGrant {
    DeviceGrant {
        device_name: "Gate tablet".to_string(),
        experience_id: "exp-42".to_string(),
        slot_id: "slot-7".to_string(),
        authorized_by: "provider-9".to_string(),
    }
}

pub fn navigator(path_and_query: &str) -> Arc<MemoryNavigator> {
    Arc::new(
        MemoryNavigator::new(&format!("{ORIGIN}{path_and_query}")).expect("valid test URL"),
    )
}

/// A ready session store over an in-memory durable store.
pub async fn ready_session() -> Arc<PersistentSessionStore> {
    let store = Arc::new(PersistentSessionStore::new(Arc::new(MemoryStore::new())));
    store.initialize().await.expect("initialize session store");
    store
}
