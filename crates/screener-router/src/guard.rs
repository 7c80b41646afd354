//! Keeps anonymous users out of protected routes.

use screener_session::{Claims, SessionSnapshot};

use crate::Route;

/// What to show for a requested route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the requested route.
    Render(Route),
    /// Send the user somewhere else instead.
    Redirect(Route),
}

impl GuardDecision {
    /// The route that ends up on screen either way.
    pub fn route(&self) -> Route {
        match self {
            Self::Render(route) | Self::Redirect(route) => *route,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}

/// Decides whether a route may be rendered for the current user.
///
/// Pure: reads the derived identity, never mutates the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    /// Where anonymous users land when they hit a protected route.
    pub const FALLBACK: Route = Route::Landing;

    pub fn check(&self, user: Option<&Claims>, route: Route) -> GuardDecision {
        if route.is_protected() && user.is_none() {
            tracing::debug!(%route, "protected route without session, redirecting");
            GuardDecision::Redirect(Self::FALLBACK)
        } else {
            GuardDecision::Render(route)
        }
    }

    pub fn check_snapshot(&self, session: &SessionSnapshot, route: Route) -> GuardDecision {
        self.check(session.user.as_ref(), route)
    }
}
