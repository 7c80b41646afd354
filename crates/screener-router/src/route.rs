//! The screens of the client and their paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RouterError;

/// A screen of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// `/`: public landing page.
    Landing,
    /// `/login`: public login page.
    Login,
    /// `/application`: the market dashboard. Requires a session.
    Application,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::Landing, Route::Login, Route::Application];

    /// Matches a path to a route.
    ///
    /// A trailing slash, query string, or fragment is ignored, so
    /// `/login/`, `/login?next=x` and `/login` are the same route.
    pub fn parse(path: &str) -> Result<Self, RouterError> {
        let bare = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let trimmed = bare.trim_end_matches('/');

        match trimmed {
            "" => Ok(Self::Landing),
            "/login" => Ok(Self::Login),
            "/application" => Ok(Self::Application),
            _ => Err(RouterError::UnknownRoute(path.to_string())),
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Login => "/login",
            Self::Application => "/application",
        }
    }

    /// Returns `true` if only a logged-in user may see this route.
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Application)
    }
}

impl FromStr for Route {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
