//! The login page and its form state.

use std::fmt::Write;

use crate::{Route, View, ViewContext};

/// Username/password as typed so far.
///
/// The submit button is enabled only when both fields are filled; no
/// other client-side validation happens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    pub fn reset(&mut self) {
        self.username.clear();
        self.password.clear();
    }

    /// The form as text, password masked.
    pub fn render(&self) -> String {
        format!(
            "Username: {}\nPassword: {}\n[{}]",
            self.username,
            "*".repeat(self.password.chars().count()),
            if self.can_submit() { "Login" } else { "Login (fill in both fields)" },
        )
    }
}

/// The `/login` page.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginView;

impl View for LoginView {
    fn route(&self) -> Route {
        Route::Login
    }

    fn render(&self, ctx: &ViewContext<'_>) -> String {
        let mut out = String::from("Login\n=====\n");
        match ctx.user() {
            Some(user) => {
                let _ = write!(
                    out,
                    "Already logged in as {}. Log out to switch accounts.",
                    user.display_name()
                );
            }
            None => {
                let _ = writeln!(out, "Sign in with your screener account.");
                let _ = write!(out, "{}", LoginForm::default().render());
            }
        }
        out
    }
}
