//! Session state shared by the sign-in flows.

pub mod store;
pub mod types;

pub use store::{PersistentSessionStore, SessionStore, SESSION_KEY};
pub use types::{Role, SessionResult, StoredSession, UserProfile};
