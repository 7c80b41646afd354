//! Error types for the routing layer.

use crate::{Route, SignupStep};

/// Errors that can occur while routing or filling in forms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// The path matches no known route.
    #[error("no route for path {0:?}")]
    UnknownRoute(String),

    /// The route exists but no view is registered for it.
    #[error("no view registered for {0}")]
    NoView(Route),

    /// Views don't render until the session has finished initializing.
    #[error("session is still loading")]
    SessionLoading,

    /// A signup step's constraint doesn't hold.
    #[error("{step}: {message}")]
    InvalidSignupField {
        step: SignupStep,
        message: &'static str,
    },
}
