use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};
use url::Url;

use super::draft::{DraftUpdate, FormDraft};
use super::step::{AuthMode, Progress, StepId};
use super::validation::{
    validate_code, validate_email, validate_new_password, validate_phone, validate_signup_details,
    ValidationError,
};
use crate::callback::destination::local_path;
use crate::callback::{resolve_destination, IntentStash, PendingRedirectIntent, DEFAULT_HOME};
use crate::client::{IdentityClient, Registration};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::nav::{query_param, with_query_param, Navigator};
use crate::session::{Role, SessionResult, SessionStore};

const EXTERNAL_SIGN_IN_PATH: &str = "/auth/google";

/// Minimum gap between two verification codes sent to the same draft.
pub const RESEND_COOLDOWN: Duration = Duration::from_secs(60);

/// Everything the wizard knows while it is mounted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    pub current_step: StepId,
    pub mode: AuthMode,
    pub draft: FormDraft,
    pub reset_email: Option<String>,
}

impl WizardState {
    /// Seed state from the `mode`, `type` and `step` query parameters.
    pub fn from_url(url: &Url) -> Self {
        let mut state = Self::default();
        state.apply_url(url);
        state
    }

    fn apply_url(&mut self, url: &Url) {
        let mode = query_param(url, "mode");
        self.mode = mode
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        if let Some(role) = query_param(url, "type").and_then(|raw| raw.parse::<Role>().ok()) {
            self.draft.user_type = role;
        }
        self.current_step = match query_param(url, "step").and_then(|raw| raw.parse().ok()) {
            Some(step) => step,
            None if mode.as_deref() == Some("phone") => StepId::Phone,
            None => StepId::Welcome,
        };
    }
}

/// Lifetime of a wizard instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardStatus {
    Active,
    /// A session was adopted and the user sent to `destination`.
    Completed { destination: String },
    /// The user was sent to the external identity provider.
    HandedOff { url: String },
}

/// Result of [`WizardController::initialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEntry {
    Ready,
    AlreadyAuthenticated { destination: String },
}

/// Values collected by the signup-details step.
#[derive(Debug, Clone, Default)]
pub struct SignupDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub user_type: Role,
}

/// Drives the multi-step sign-in and sign-up flow.
///
/// Step and mode are mirrored into the navigator's URL so a reload lands on
/// the same screen. Methods that talk to the backend take `&mut self`, so a
/// single wizard never has two requests in flight.
pub struct WizardController {
    identity: Arc<dyn IdentityClient>,
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    intents: IntentStash,
    api_base_url: String,
    external_sign_in: bool,
    state: WizardState,
    status: WizardStatus,
    code_sent_at: Option<Instant>,
}

impl WizardController {
    pub fn new(
        identity: Arc<dyn IdentityClient>,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        intents: IntentStash,
        config: &AuthConfig,
    ) -> Self {
        let state = WizardState::from_url(&navigator.location());
        Self {
            identity,
            session,
            navigator,
            intents,
            api_base_url: config.api_base_url.clone(),
            external_sign_in: config.external_sign_in,
            state,
            status: WizardStatus::Active,
            code_sent_at: None,
        }
    }

    /// Wait for the session store, then bounce already-signed-in users.
    pub async fn initialize(&mut self) -> WizardEntry {
        self.session.wait_ready().await;
        if !self.session.is_authenticated() {
            debug!(step = %self.state.current_step, mode = %self.state.mode, "wizard ready");
            return WizardEntry::Ready;
        }
        let redirect = query_param(&self.navigator.location(), "redirect");
        let destination = redirect
            .as_deref()
            .and_then(local_path)
            .unwrap_or(DEFAULT_HOME)
            .to_string();
        info!(destination = %destination, "already authenticated; leaving wizard");
        self.navigator.push(&destination);
        self.status = WizardStatus::Completed {
            destination: destination.clone(),
        };
        WizardEntry::AlreadyAuthenticated { destination }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> StepId {
        self.state.current_step
    }

    pub fn mode(&self) -> AuthMode {
        self.state.mode
    }

    pub fn draft(&self) -> &FormDraft {
        &self.state.draft
    }

    pub fn status(&self) -> &WizardStatus {
        &self.status
    }

    pub fn progress(&self) -> Option<Progress> {
        Progress::for_step(self.state.current_step, self.state.mode)
    }

    /// Move to `step` and mirror it into the URL.
    pub fn advance(&mut self, step: StepId) {
        debug!(from = %self.state.current_step, to = %step, "wizard step");
        self.state.current_step = step;
        self.write_url("step", &step.to_string());
    }

    pub fn retreat(&mut self) {
        self.advance(self.state.current_step.previous());
    }

    /// Switch orientation. The draft is kept.
    pub fn set_mode(&mut self, mode: AuthMode) {
        debug!(mode = %mode, "wizard mode");
        self.state.mode = mode;
        self.write_url("mode", &mode.to_string());
    }

    pub fn update_draft(&mut self, update: DraftUpdate) {
        self.state.draft.apply(update);
    }

    /// Re-read step and mode after the URL changed outside the wizard.
    pub fn sync_from_url(&mut self) {
        self.state.apply_url(&self.navigator.location());
        debug!(step = %self.state.current_step, mode = %self.state.mode, "wizard resynced from URL");
    }

    pub fn submit_email(&mut self, email: &str) -> Result<StepId, AuthError> {
        validate_email(email)?;
        self.state.draft.email = email.trim().to_string();
        let next = match self.state.mode {
            AuthMode::Login => StepId::Password,
            AuthMode::Signup => StepId::SignupDetails,
        };
        self.advance(next);
        Ok(next)
    }

    pub fn submit_signup_details(&mut self, details: SignupDetails) -> Result<(), AuthError> {
        validate_signup_details(
            &details.first_name,
            &details.last_name,
            &details.password,
            &details.confirm_password,
        )?;
        let draft = &mut self.state.draft;
        draft.first_name = details.first_name.trim().to_string();
        draft.last_name = details.last_name.trim().to_string();
        draft.phone = details.phone.trim().to_string();
        draft.password = details.password;
        draft.user_type = details.user_type;
        self.advance(StepId::ProfilePhoto);
        Ok(())
    }

    /// Create the account from the draft.
    pub async fn submit_registration(
        &mut self,
        profile_photo: Option<String>,
    ) -> Result<Registration, AuthError> {
        self.ensure_active()?;
        self.state.draft.profile_photo = profile_photo;
        let registration = self.identity.register(&self.state.draft).await?;
        info!(needs_verification = registration.needs_verification, "account registered");
        if registration.needs_verification {
            self.code_sent_at = Some(Instant::now());
            self.advance(StepId::Verification);
        } else {
            self.set_mode(AuthMode::Login);
            self.advance(StepId::Email);
        }
        Ok(registration)
    }

    /// Time left before [`Self::resend_verification`] is accepted.
    pub fn resend_available_in(&self) -> Duration {
        self.code_sent_at
            .map(|sent| RESEND_COOLDOWN.saturating_sub(sent.elapsed()))
            .unwrap_or_default()
    }

    /// Ask the backend to send a fresh verification code.
    pub async fn resend_verification(&mut self) -> Result<String, AuthError> {
        self.ensure_active()?;
        let wait = self.resend_available_in();
        if !wait.is_zero() {
            let seconds = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
            return Err(ValidationError::ResendTooSoon { seconds }.into());
        }
        let registration = self.identity.register(&self.state.draft).await?;
        self.code_sent_at = Some(Instant::now());
        debug!("verification code resent");
        Ok(registration.message)
    }

    /// Terminal login step.
    pub async fn submit_password(&mut self, password: &str) -> Result<String, AuthError> {
        self.ensure_active()?;
        if password.is_empty() {
            return Err(ValidationError::MissingPassword.into());
        }
        validate_email(&self.state.draft.email)?;
        self.state.draft.password = password.to_string();
        let session = self
            .identity
            .authenticate(&self.state.draft.email, password)
            .await?;
        self.complete(session).await
    }

    /// Terminal signup step.
    pub async fn submit_verification(&mut self, code: &str) -> Result<String, AuthError> {
        self.ensure_active()?;
        validate_code(code)?;
        validate_email(&self.state.draft.email)?;
        let session = self
            .identity
            .verify_account(&self.state.draft.email, code.trim())
            .await?;
        self.complete(session).await
    }

    pub fn forgot_password(&mut self) {
        self.advance(StepId::ForgotPassword);
    }

    pub async fn request_password_reset(&mut self, email: &str) -> Result<String, AuthError> {
        self.ensure_active()?;
        validate_email(email)?;
        let email = email.trim().to_string();
        let message = self.identity.request_password_reset(&email).await?;
        self.state.reset_email = Some(email);
        self.advance(StepId::ResetPassword);
        Ok(message)
    }

    /// Set a new password, then return to the start in login mode.
    pub async fn submit_password_reset(
        &mut self,
        code: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<String, AuthError> {
        self.ensure_active()?;
        validate_code(code)?;
        validate_new_password(password, confirm_password)?;
        let email = self
            .state
            .reset_email
            .clone()
            .filter(|email| !email.is_empty())
            .unwrap_or_else(|| self.state.draft.email.clone());
        validate_email(&email)?;
        let message = self
            .identity
            .reset_password(&email, code.trim(), password)
            .await?;
        info!("password reset");
        self.state.reset_email = None;
        self.set_mode(AuthMode::Login);
        self.advance(StepId::Welcome);
        Ok(message)
    }

    pub async fn send_phone_code(&mut self, phone: &str) -> Result<String, AuthError> {
        self.ensure_active()?;
        validate_phone(phone)?;
        let phone = phone.trim().to_string();
        let message = self.identity.send_phone_code(&phone).await?;
        self.state.draft.phone = phone;
        Ok(message)
    }

    /// Terminal phone step.
    pub async fn submit_phone_code(&mut self, code: &str) -> Result<String, AuthError> {
        self.ensure_active()?;
        validate_phone(&self.state.draft.phone)?;
        validate_code(code)?;
        let session = self
            .identity
            .verify_phone_code(&self.state.draft.phone, code.trim())
            .await?;
        self.complete(session).await
    }

    /// Stash the resumption intent and leave for the identity provider.
    pub fn begin_external_sign_in(&mut self) -> Result<String, AuthError> {
        self.ensure_active()?;
        if !self.external_sign_in {
            return Err(AuthError::Configuration(
                "Google authentication is not configured".to_string(),
            ));
        }
        let redirect = query_param(&self.navigator.location(), "redirect");
        let mut url = Url::parse(&format!(
            "{}{EXTERNAL_SIGN_IN_PATH}",
            self.api_base_url.trim_end_matches('/')
        ))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("userType", &self.state.draft.user_type.to_string());
            pairs.append_pair("mode", &self.state.mode.to_string());
            if let Some(redirect) = &redirect {
                pairs.append_pair("redirect", redirect);
            }
        }

        self.intents.stash(&PendingRedirectIntent::new(
            self.state.draft.user_type,
            self.state.mode,
            redirect,
        ))?;
        info!(user_type = %self.state.draft.user_type, "handing off to identity provider");
        self.navigator.push(url.as_str());
        self.status = WizardStatus::HandedOff {
            url: url.to_string(),
        };
        Ok(url.into())
    }

    async fn complete(&mut self, session: SessionResult) -> Result<String, AuthError> {
        let user = self.session.adopt(session).await?;
        let redirect = query_param(&self.navigator.location(), "redirect");
        let destination =
            resolve_destination(redirect.as_deref(), &[self.state.draft.user_type, user.role]);
        info!(destination = %destination, step = %self.state.current_step, "wizard completed");
        self.navigator.push(&destination);
        self.status = WizardStatus::Completed {
            destination: destination.clone(),
        };
        Ok(destination)
    }

    fn ensure_active(&self) -> Result<(), AuthError> {
        match self.status {
            WizardStatus::Active => Ok(()),
            _ => Err(AuthError::InvalidState("wizard has already finished".to_string())),
        }
    }

    fn write_url(&self, key: &str, value: &str) {
        let url = with_query_param(&self.navigator.location(), key, Some(value));
        self.navigator.replace(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(url: &str) -> WizardState {
        WizardState::from_url(&Url::parse(url).unwrap())
    }

    #[test]
    fn defaults_to_welcome_login() {
        let seeded = state("https://ryfty.test/auth");
        assert_eq!(seeded.current_step, StepId::Welcome);
        assert_eq!(seeded.mode, AuthMode::Login);
        assert_eq!(seeded.draft.user_type, Role::Customer);
    }

    #[test]
    fn register_mode_and_provider_type() {
        let seeded = state("https://ryfty.test/auth?mode=register&type=provider");
        assert_eq!(seeded.mode, AuthMode::Signup);
        assert_eq!(seeded.draft.user_type, Role::Provider);
        assert_eq!(seeded.current_step, StepId::Welcome);
    }

    #[test]
    fn explicit_step_beats_phone_mode() {
        assert_eq!(
            state("https://ryfty.test/auth?mode=phone&step=email").current_step,
            StepId::Email
        );
        assert_eq!(
            state("https://ryfty.test/auth?mode=phone").current_step,
            StepId::Phone
        );
        assert_eq!(state("https://ryfty.test/auth?mode=phone").mode, AuthMode::Login);
    }

    #[test]
    fn unknown_values_are_ignored() {
        let seeded = state("https://ryfty.test/auth?step=dashboard&type=admin&mode=x");
        assert_eq!(seeded.current_step, StepId::Welcome);
        assert_eq!(seeded.draft.user_type, Role::Customer);
        assert_eq!(seeded.mode, AuthMode::Login);
    }
}
