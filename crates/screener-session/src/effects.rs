//! Side effects the session triggers in the surrounding UI.
//!
//! Login and logout end with a navigation, and a failed login shows a
//! notice. The session doesn't know what a screen is; it just calls
//! these hooks.

use std::sync::{Arc, Mutex, PoisonError};

/// UI hooks invoked by [`SessionContext`](crate::SessionContext).
pub trait SessionEffects: Send + Sync + 'static {
    /// Move the user to `path` (`"/"`, `"/login"`, ...).
    fn navigate(&self, path: &str);

    /// Show a user-visible notice.
    fn alert(&self, message: &str);
}

#[derive(Debug, Default)]
struct EffectLogInner {
    history: Vec<String>,
    alerts: Vec<String>,
}

/// Records navigations and notices so a front end can replay them.
///
/// Clones share the same log. The terminal client drains alerts after
/// every action; tests inspect the history directly.
#[derive(Debug, Clone, Default)]
pub struct EffectLog {
    inner: Arc<Mutex<EffectLogInner>>,
}

impl EffectLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last path navigated to, if any.
    pub fn current_path(&self) -> Option<String> {
        self.lock().history.last().cloned()
    }

    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.lock().alerts.clone()
    }

    /// Returns and forgets all pending alerts.
    pub fn take_alerts(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().alerts)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EffectLogInner> {
        // A panic while holding the lock can't leave the vectors in a
        // torn state, so keep using them.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionEffects for EffectLog {
    fn navigate(&self, path: &str) {
        tracing::debug!(path, "navigate");
        self.lock().history.push(path.to_string());
    }

    fn alert(&self, message: &str) {
        tracing::debug!(message, "alert");
        self.lock().alerts.push(message.to_string());
    }
}
