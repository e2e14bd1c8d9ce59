//! Identity-provider redirect callback handling.

pub mod destination;
pub mod intent;
pub mod resolver;

pub use destination::{resolve_destination, DEFAULT_HOME, PROVIDER_HOME};
pub use intent::{IntentStash, PendingRedirectIntent, INTENT_KEY};
pub use resolver::{
    CallbackOutcome, CallbackParams, CallbackStatus, CallbackTiming, RedirectCallbackResolver,
    AUTH_ENTRY,
};
