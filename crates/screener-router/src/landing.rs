//! The public landing page.

use std::fmt::Write;

use crate::{Route, View, ViewContext};

/// Hero text, a short "try the API" section, and a session hint.
#[derive(Debug, Clone)]
pub struct LandingView {
    pub title: String,
    pub tagline: String,
    pub repository_url: String,
}

impl Default for LandingView {
    fn default() -> Self {
        Self {
            title: "Portfolio Management".to_string(),
            tagline: "Screen the market for entries across strategies and track market breadth."
                .to_string(),
            repository_url: "https://github.com/rickturner2001/market_screener.git".to_string(),
        }
    }
}

impl View for LandingView {
    fn route(&self) -> Route {
        Route::Landing
    }

    fn render(&self, ctx: &ViewContext<'_>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}", "=".repeat(self.title.chars().count()));
        let _ = writeln!(out, "{}", self.tagline);
        let _ = writeln!(out);
        let _ = writeln!(out, "Try The API");
        let _ = writeln!(out, "  $ git clone {}", self.repository_url);
        let _ = writeln!(out, "  $ pip install -r requirements.txt");
        let _ = writeln!(out, "  $ uvicorn app:app --reload");
        let _ = writeln!(out);
        match ctx.user() {
            Some(user) => {
                let _ = writeln!(out, "Logged in as {}", user.display_name());
                let _ = write!(out, "Open {} to see today's entries.", Route::Application);
            }
            None => {
                let _ = write!(out, "Log in at {} to open the screener.", Route::Login);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use screener_protocol::TokenPair;
    use screener_session::{Claims, SessionSnapshot};

    use super::*;

    #[test]
    fn test_render_anonymous_points_to_login() {
        let session = SessionSnapshot::anonymous();
        let text = LandingView::default().render(&ViewContext::new(&session));

        assert!(text.starts_with("Portfolio Management\n"));
        assert!(text.contains("Log in at /login"));
        assert!(!text.contains("Logged in as"));
    }

    #[test]
    fn test_render_authenticated_greets_user() {
        let claims = Claims {
            username: Some("alice".into()),
            ..Claims::default()
        };
        let session = SessionSnapshot::authenticated(TokenPair::new("a.b.c", "r"), claims);

        let text = LandingView::default().render(&ViewContext::new(&session));

        assert!(text.contains("Logged in as alice"));
        assert!(text.contains("/application"));
    }
}
