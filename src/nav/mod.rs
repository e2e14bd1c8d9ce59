//! Location, history and delayed navigation.

pub mod query;
pub mod schedule;

pub use query::{query_param, with_query_param};
pub use schedule::ScheduledNavigation;

use std::sync::{Mutex, MutexGuard};

use url::Url;

use crate::error::AuthError;

/// The host's location bar, history and window.
///
/// The URL is user-visible and externally mutable; components re-read it
/// rather than caching what they last wrote.
pub trait Navigator: Send + Sync {
    /// Current absolute location.
    fn location(&self) -> Url;

    /// Replace the current history entry without navigating.
    fn replace(&self, url: Url);

    /// Navigate to `target`, an absolute URL or a path relative to the current location.
    fn push(&self, target: &str);

    /// Whether the current page was opened by another window.
    fn opened_as_child(&self) -> bool {
        false
    }

    /// Close the current window.
    fn close(&self);
}

/// Navigator that records every transition in memory.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavState>,
    child: bool,
}

#[derive(Debug)]
struct NavState {
    location: Url,
    pushes: Vec<String>,
    replacements: usize,
    closed: bool,
}

impl MemoryNavigator {
    pub fn new(location: &str) -> Result<Self, AuthError> {
        Ok(Self::from_url(Url::parse(location)?))
    }

    pub fn from_url(location: Url) -> Self {
        Self {
            state: Mutex::new(NavState {
                location,
                pushes: Vec::new(),
                replacements: 0,
                closed: false,
            }),
            child: false,
        }
    }

    /// Mark this navigator as a window opened by another window.
    pub fn as_child(mut self) -> Self {
        self.child = true;
        self
    }

    /// Simulate the user editing the address bar or pressing back.
    pub fn set_location(&self, location: Url) {
        self.state().location = location;
    }

    /// Targets passed to [`Navigator::push`], oldest first.
    pub fn pushes(&self) -> Vec<String> {
        self.state().pushes.clone()
    }

    pub fn last_push(&self) -> Option<String> {
        self.state().pushes.last().cloned()
    }

    pub fn replacements(&self) -> usize {
        self.state().replacements
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    fn state(&self) -> MutexGuard<'_, NavState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for MemoryNavigator {
    fn location(&self) -> Url {
        self.state().location.clone()
    }

    fn replace(&self, url: Url) {
        let mut state = self.state();
        state.location = url;
        state.replacements += 1;
    }

    fn push(&self, target: &str) {
        let mut state = self.state();
        if let Ok(next) = state.location.join(target) {
            state.location = next;
        }
        state.pushes.push(target.to_string());
    }

    fn opened_as_child(&self) -> bool {
        self.child
    }

    fn close(&self) {
        self.state().closed = true;
    }
}
