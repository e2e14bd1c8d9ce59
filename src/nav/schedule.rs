//! Delayed navigation tied to its owner's lifetime.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::Navigator;

/// A navigation that fires after a visible-feedback delay.
///
/// Dropping the handle cancels the navigation, so a component that goes away
/// never navigates afterwards. Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct ScheduledNavigation {
    target: String,
    delay: Duration,
    cancel: CancellationToken,
    handle: Option<JoinHandle<bool>>,
}

impl ScheduledNavigation {
    pub fn schedule(navigator: Arc<dyn Navigator>, target: impl Into<String>, delay: Duration) -> Self {
        let target = target.into();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let destination = target.clone();
        debug!(target = %destination, delay_ms = delay.as_millis() as u64, "navigation scheduled");
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(target = %destination, "scheduled navigation cancelled");
                    false
                }
                _ = tokio::time::sleep(delay) => {
                    navigator.push(&destination);
                    true
                }
            }
        });
        Self {
            target,
            delay,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the navigation to fire or be cancelled.
    ///
    /// Returns `true` if the navigation happened.
    pub async fn wait(mut self) -> bool {
        match self.handle.take() {
            Some(handle) => handle.await.unwrap_or(false),
            None => false,
        }
    }
}

impl Drop for ScheduledNavigation {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
