//! Path → guard → view.

use std::collections::HashMap;

use screener_session::SessionSnapshot;

use crate::{
    ApplicationView, GuardDecision, LandingView, LoginView, Route, RouteGuard, RouterError, View,
    ViewContext,
};

/// Where a requested path ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub requested: Route,
    pub decision: GuardDecision,
}

impl Resolution {
    /// The route actually shown.
    pub fn route(&self) -> Route {
        self.decision.route()
    }

    pub fn redirected(&self) -> bool {
        self.decision.is_redirect()
    }
}

/// Resolves paths through the [`RouteGuard`] and renders the result.
pub struct Router {
    guard: RouteGuard,
    views: HashMap<Route, Box<dyn View>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// A router with the standard landing, login and application views.
    pub fn new() -> Self {
        Self::empty()
            .with_view(LandingView::default())
            .with_view(LoginView)
            .with_view(ApplicationView)
    }

    /// A router with no views registered.
    pub fn empty() -> Self {
        Self {
            guard: RouteGuard,
            views: HashMap::new(),
        }
    }

    /// Registers `view` for its route, replacing any previous one.
    pub fn with_view(mut self, view: impl View + 'static) -> Self {
        self.views.insert(view.route(), Box::new(view));
        self
    }

    /// Parses `path` and runs the guard against the session.
    pub fn resolve(
        &self,
        path: &str,
        session: &SessionSnapshot,
    ) -> Result<Resolution, RouterError> {
        let requested = Route::parse(path)?;
        let decision = self.guard.check_snapshot(session, requested);
        if let GuardDecision::Redirect(to) = decision {
            tracing::info!(from = %requested, %to, "redirected by route guard");
        }
        Ok(Resolution {
            requested,
            decision,
        })
    }

    /// Renders `route` without consulting the guard.
    ///
    /// # Errors
    /// [`RouterError::SessionLoading`] while the session is initializing,
    /// [`RouterError::NoView`] if nothing is registered for `route`.
    pub fn render(&self, route: Route, ctx: &ViewContext<'_>) -> Result<String, RouterError> {
        if ctx.session.is_loading() {
            return Err(RouterError::SessionLoading);
        }
        let view = self.views.get(&route).ok_or(RouterError::NoView(route))?;
        Ok(view.render(ctx))
    }

    /// [`resolve`](Self::resolve) then [`render`](Self::render) whatever
    /// the guard decided.
    pub fn open(
        &self,
        path: &str,
        ctx: &ViewContext<'_>,
    ) -> Result<(Resolution, String), RouterError> {
        let resolution = self.resolve(path, ctx.session)?;
        let text = self.render(resolution.route(), ctx)?;
        Ok((resolution, text))
    }
}
