//! Ryfty authentication flows.
//!
//! Headless orchestration of the sign-in wizard, the identity-provider
//! redirect callback and check-in device authorization. Host surfaces
//! (location bar, storage, backend) are traits, so the same flows run in a
//! browser host, in tests, or behind the bundled check-in CLI.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ryfty_auth::prelude::*;
//!
//! # async fn example() -> ryfty_auth::error::Result<()> {
//! let config = AuthConfig::from_env();
//! let session = Arc::new(PersistentSessionStore::new(Arc::new(config.durable_store())));
//! session.initialize().await?;
//!
//! let navigator = Arc::new(MemoryNavigator::new(
//!     "https://ryfty.test/auth/callback?token=jwt&role=provider",
//! )?);
//! let intents = IntentStash::new(Arc::new(MemoryStore::new()));
//! let mut resolver =
//!     RedirectCallbackResolver::new(session, navigator, intents, config.timing());
//! if let CallbackOutcome::Authenticated { destination, .. } = resolver.resolve().await {
//!     println!("signed in, heading to {destination}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod client;
pub mod config;
pub mod device;
pub mod error;
pub mod nav;
pub mod prelude;
pub mod session;
pub mod storage;
pub mod wizard;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{AuthError, Result};
