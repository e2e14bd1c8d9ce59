//! Convenience re-exports for common use.

pub use crate::callback::{CallbackOutcome, IntentStash, RedirectCallbackResolver};
pub use crate::client::{DeviceVerificationClient, HttpClient, IdentityClient};
pub use crate::config::AuthConfig;
pub use crate::device::{DeviceAuthorizationVerifier, DeviceCredentialStore, VerificationState};
pub use crate::error::{AuthError, FailureKind, Result};
pub use crate::nav::{MemoryNavigator, Navigator};
pub use crate::session::{PersistentSessionStore, Role, SessionStore};
pub use crate::storage::{FileStore, KeyValueStore, MemoryStore};
pub use crate::wizard::{AuthMode, StepId, WizardController};
