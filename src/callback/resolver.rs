use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use super::destination::resolve_destination;
use super::intent::IntentStash;
use crate::config::{DEFAULT_ERROR_DELAY, DEFAULT_SUCCESS_DELAY};
use crate::nav::{query_param, Navigator, ScheduledNavigation};
use crate::session::{Role, SessionResult, SessionStore, UserProfile};

/// Where a failed callback sends the user.
pub const AUTH_ENTRY: &str = "/auth";

const PROCESSING_MESSAGE: &str = "Completing authentication...";
const SUCCESS_MESSAGE: &str = "Welcome back!";
const FAILURE_MESSAGE: &str = "Authentication failed. Please try again.";

/// Query parameters the identity provider hands back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub token: Option<String>,
    pub error: Option<String>,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
}

impl CallbackParams {
    pub fn from_url(url: &Url) -> Self {
        Self {
            token: query_param(url, "token"),
            error: query_param(url, "error"),
            user_id: query_param(url, "id"),
            email: query_param(url, "email"),
            name: query_param(url, "name"),
            avatar_url: query_param(url, "avatar_url"),
            role: query_param(url, "role"),
        }
    }

    fn session(&self, token: String) -> SessionResult {
        SessionResult {
            token,
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            display_name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
            role: Role::parse_lenient(self.role.as_deref()),
        }
    }
}

/// Visible state of the callback screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackStatus {
    Processing,
    Success { message: String },
    Error { message: String },
}

impl CallbackStatus {
    pub fn message(&self) -> &str {
        match self {
            Self::Processing => PROCESSING_MESSAGE,
            Self::Success { message } | Self::Error { message } => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Authenticated {
        destination: String,
        user: UserProfile,
    },
    Failed {
        message: String,
    },
}

/// Delays before leaving the callback screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackTiming {
    pub success_delay: Duration,
    pub error_delay: Duration,
}

impl Default for CallbackTiming {
    fn default() -> Self {
        Self {
            success_delay: DEFAULT_SUCCESS_DELAY,
            error_delay: DEFAULT_ERROR_DELAY,
        }
    }
}

/// Reconciles an identity-provider redirect with local session state.
///
/// One resolver handles one callback visit. Its outcome is computed once;
/// the follow-up navigation is cancelled if the resolver is dropped first.
pub struct RedirectCallbackResolver {
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    intents: IntentStash,
    timing: CallbackTiming,
    status: CallbackStatus,
    outcome: Option<CallbackOutcome>,
    pending: Option<ScheduledNavigation>,
}

impl RedirectCallbackResolver {
    pub fn new(
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        intents: IntentStash,
        timing: CallbackTiming,
    ) -> Self {
        Self {
            session,
            navigator,
            intents,
            timing,
            status: CallbackStatus::Processing,
            outcome: None,
            pending: None,
        }
    }

    /// Resolve the callback found in the navigator's current location.
    pub async fn resolve(&mut self) -> CallbackOutcome {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        self.session.wait_ready().await;
        let params = CallbackParams::from_url(&self.navigator.location());
        self.process(params).await
    }

    /// Resolve already-extracted callback parameters.
    pub async fn resolve_params(&mut self, params: CallbackParams) -> CallbackOutcome {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        self.session.wait_ready().await;
        self.process(params).await
    }

    pub fn status(&self) -> &CallbackStatus {
        &self.status
    }

    pub fn outcome(&self) -> Option<&CallbackOutcome> {
        self.outcome.as_ref()
    }

    pub fn pending_navigation(&self) -> Option<&ScheduledNavigation> {
        self.pending.as_ref()
    }

    /// Detach the scheduled navigation so it outlives the resolver.
    pub fn take_pending_navigation(&mut self) -> Option<ScheduledNavigation> {
        self.pending.take()
    }

    async fn process(&mut self, params: CallbackParams) -> CallbackOutcome {
        // Consumed on every outcome, failures included.
        let intent = self.intents.take().unwrap_or_else(|err| {
            warn!(error = %err, "could not read redirect intent");
            None
        });
        if let Some(error) = params.error.clone() {
            warn!(error = %error, "identity provider reported an error");
            return self.fail(error);
        }
        let Some(token) = params.token.clone() else {
            warn!("callback carried neither token nor error");
            return self.fail(FAILURE_MESSAGE.to_string());
        };

        let session = params.session(token);
        let callback_role = session.role;
        let user = match self.session.adopt(session).await {
            Ok(user) => user,
            Err(err) => {
                warn!(error = %err, "session adoption failed");
                return self.fail(FAILURE_MESSAGE.to_string());
            }
        };

        let mut roles = vec![callback_role];
        if let Some(intent) = &intent {
            roles.push(intent.user_type);
        }
        let redirect = intent.as_ref().and_then(|i| i.redirect_target.as_deref());
        let destination = resolve_destination(redirect, &roles);

        info!(destination = %destination, role = %callback_role, "callback authenticated");
        self.status = CallbackStatus::Success {
            message: SUCCESS_MESSAGE.to_string(),
        };
        self.schedule(destination.clone(), self.timing.success_delay);
        self.finish(CallbackOutcome::Authenticated { destination, user })
    }

    fn fail(&mut self, message: String) -> CallbackOutcome {
        self.status = CallbackStatus::Error {
            message: message.clone(),
        };
        self.schedule(AUTH_ENTRY.to_string(), self.timing.error_delay);
        self.finish(CallbackOutcome::Failed { message })
    }

    fn schedule(&mut self, target: String, delay: Duration) {
        debug!(target = %target, "leaving callback after delay");
        self.pending = Some(ScheduledNavigation::schedule(
            Arc::clone(&self.navigator),
            target,
            delay,
        ));
    }

    fn finish(&mut self, outcome: CallbackOutcome) -> CallbackOutcome {
        self.outcome = Some(outcome.clone());
        outcome
    }
}
