//! The `View` trait and the context views render from.

use screener_protocol::MarketSnapshot;
use screener_session::{Claims, SessionSnapshot};

use crate::Route;

/// Everything a view may read, passed in explicitly.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    pub session: &'a SessionSnapshot,
    /// The last market snapshot fetched, if any.
    pub market: Option<&'a MarketSnapshot>,
}

impl<'a> ViewContext<'a> {
    pub fn new(session: &'a SessionSnapshot) -> Self {
        Self {
            session,
            market: None,
        }
    }

    pub fn with_market(mut self, market: Option<&'a MarketSnapshot>) -> Self {
        self.market = market;
        self
    }

    pub fn user(&self) -> Option<&'a Claims> {
        self.session.user.as_ref()
    }
}

/// Renders one route as plain text.
pub trait View: Send + Sync {
    /// The route this view is shown for.
    fn route(&self) -> Route;

    fn render(&self, ctx: &ViewContext<'_>) -> String;
}
