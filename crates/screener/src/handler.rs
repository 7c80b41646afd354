//! One user action in, one screen of text out.
//!
//! Front ends translate input (command-line arguments, key presses)
//! into an [`Action`] and print whatever [`handle_action`] returns.
//! Notices raised along the way stay in the app's effect log; drain
//! them with [`ScreenerApp::take_alerts`].

use screener_session::{unix_now, Claims, Storage};
use screener_transport::HttpTransport;

use crate::{ScreenerApp, ScreenerError};

/// Something the user asked for.
#[derive(Clone, PartialEq, Eq)]
pub enum Action {
    Login { username: String, password: String },
    Logout,
    /// Go to a path (`/`, `/login`, `/application`).
    Open { path: String },
    /// Refresh the token pair now.
    Refresh,
    /// Describe the current user.
    Whoami,
    /// Re-render the current screen.
    Render,
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Logout => f.write_str("Logout"),
            Self::Open { path } => f.debug_struct("Open").field("path", path).finish(),
            Self::Refresh => f.write_str("Refresh"),
            Self::Whoami => f.write_str("Whoami"),
            Self::Render => f.write_str("Render"),
        }
    }
}

/// Applies `action` to `app` and returns the text to show.
pub async fn handle_action<S, T>(
    app: &mut ScreenerApp<S, T>,
    action: Action,
) -> Result<String, ScreenerError>
where
    S: Storage,
    T: HttpTransport + Clone,
{
    tracing::debug!(?action, "handling action");

    match action {
        Action::Login { username, password } => {
            app.login(&username, &password).await?;
            app.render().await
        }
        Action::Logout => {
            app.logout().await;
            app.render().await
        }
        Action::Open { path } => {
            let resolution = app.navigate(&path).await?;
            let screen = app.render().await?;
            if resolution.redirected() {
                Ok(format!(
                    "{} requires login, showing {} instead.\n\n{screen}",
                    resolution.requested,
                    resolution.route()
                ))
            } else {
                Ok(screen)
            }
        }
        Action::Refresh => {
            if !app.snapshot().await.is_authenticated() {
                return Ok("Not logged in.".to_string());
            }
            app.refresh_now().await?;
            Ok("Tokens refreshed.".to_string())
        }
        Action::Whoami => Ok(match app.snapshot().await.user {
            Some(user) => describe_user(&user, unix_now()),
            None => "Not logged in.".to_string(),
        }),
        Action::Render => app.render().await,
    }
}

fn describe_user(user: &Claims, now: u64) -> String {
    let mut lines = vec![format!("Logged in as {}", user.display_name())];
    if let Some(subject) = user.subject() {
        lines.push(format!("user id: {subject}"));
    }
    match (user.exp, user.expires_in(now)) {
        (Some(_), Some(left)) => lines.push(format!("access token expires in {}s", left.as_secs())),
        (Some(_), None) => lines.push("access token expired".to_string()),
        (None, _) => {}
    }
    lines.join("\n")
}
