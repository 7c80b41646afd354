//! The four-step signup wizard.
//!
//! Each step holds one field and one constraint. `next` only advances
//! when the current constraint holds; finishing the last step hands back
//! the collected details and resets the form. Nothing is sent anywhere:
//! account creation happens out of band.

use std::fmt;
use std::fmt::Write;

use crate::RouterError;

const MIN_USERNAME_CHARS: usize = 6;
const MIN_PASSWORD_CHARS: usize = 6;

/// A step of the wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignupStep {
    Username,
    Email,
    Password,
    ConfirmPassword,
}

impl SignupStep {
    pub const ALL: [SignupStep; 4] = [
        SignupStep::Username,
        SignupStep::Email,
        SignupStep::Password,
        SignupStep::ConfirmPassword,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Username => "Username",
            Self::Email => "Email",
            Self::Password => "Password",
            Self::ConfirmPassword => "Confirm Password",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Username => "randomuser001",
            Self::Email => "johndoe@gmail.com",
            Self::Password | Self::ConfirmPassword => "password123",
        }
    }

    /// Shown when the step's constraint doesn't hold.
    pub fn error_message(self) -> &'static str {
        match self {
            Self::Username => "username is too short (6 characters)",
            Self::Email => "Email is invalid",
            Self::Password => "Password is too short (6 characters)",
            Self::ConfirmPassword => "Passwords don't match",
        }
    }

    pub fn is_last(self) -> bool {
        self == Self::ConfirmPassword
    }

    fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    fn is_secret(self) -> bool {
        matches!(self, Self::Password | Self::ConfirmPassword)
    }
}

impl fmt::Display for SignupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the user signed up with.
#[derive(Clone, PartialEq, Eq)]
pub struct SignupDetails {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignupDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupDetails")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of a successful [`SignupForm::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupProgress {
    /// Moved on to this step.
    Advanced(SignupStep),
    /// The last step was confirmed. The form has been reset.
    Complete(SignupDetails),
}

/// Wizard state: current step, the four fields, and the error flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    step: SignupStep,
    username: String,
    email: String,
    password: String,
    confirm_password: String,
    show_error: bool,
}

impl Default for SignupForm {
    fn default() -> Self {
        Self {
            step: SignupStep::Username,
            username: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            show_error: false,
        }
    }
}

impl SignupForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> SignupStep {
        self.step
    }

    /// Sets the current step's field. Input is trimmed.
    pub fn set_value(&mut self, value: &str) {
        let value = value.trim().to_string();
        match self.step {
            SignupStep::Username => self.username = value,
            SignupStep::Email => self.email = value,
            SignupStep::Password => self.password = value,
            SignupStep::ConfirmPassword => self.confirm_password = value,
        }
        self.show_error = false;
    }

    pub fn value(&self, step: SignupStep) -> &str {
        match step {
            SignupStep::Username => &self.username,
            SignupStep::Email => &self.email,
            SignupStep::Password => &self.password,
            SignupStep::ConfirmPassword => &self.confirm_password,
        }
    }

    /// Whether the current step's constraint holds.
    pub fn is_step_valid(&self) -> bool {
        match self.step {
            SignupStep::Username => self.username.trim().chars().count() >= MIN_USERNAME_CHARS,
            SignupStep::Email => self.email.trim().contains('@'),
            SignupStep::Password => self.password.chars().count() >= MIN_PASSWORD_CHARS,
            SignupStep::ConfirmPassword => self.confirm_password == self.password,
        }
    }

    /// Advance past the current step.
    ///
    /// # Errors
    /// [`RouterError::InvalidSignupField`] if the current constraint
    /// fails; the step stays put and the error is shown on next render.
    pub fn next(&mut self) -> Result<SignupProgress, RouterError> {
        if !self.is_step_valid() {
            self.show_error = true;
            return Err(RouterError::InvalidSignupField {
                step: self.step,
                message: self.step.error_message(),
            });
        }

        self.show_error = false;
        match self.step.next() {
            Some(step) => {
                self.step = step;
                Ok(SignupProgress::Advanced(step))
            }
            None => {
                let details = SignupDetails {
                    username: std::mem::take(&mut self.username),
                    email: std::mem::take(&mut self.email),
                    password: std::mem::take(&mut self.password),
                };
                tracing::debug!(username = %details.username, "signup form completed");
                self.reset();
                Ok(SignupProgress::Complete(details))
            }
        }
    }

    /// Go back one step. No-op on the first step.
    pub fn back(&mut self) {
        if let Some(step) = self.step.previous() {
            self.step = step;
        }
        self.show_error = false;
    }

    /// The current step's error, if the last `next` failed.
    pub fn error_message(&self) -> Option<&'static str> {
        self.show_error.then(|| self.step.error_message())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Progress bar, the current field, and any error.
    pub fn render(&self) -> String {
        let mut out = String::from("Sign Up\n");
        let bar: Vec<String> = SignupStep::ALL
            .iter()
            .map(|step| {
                let mark = if step.index() <= self.step.index() { 'x' } else { ' ' };
                format!("[{mark}] {step}")
            })
            .collect();
        let _ = writeln!(out, "{}", bar.join("  "));

        let value = self.value(self.step);
        let shown = if self.step.is_secret() {
            "*".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let _ = write!(
            out,
            "{} ({}): {}\n[{}]",
            self.step.label(),
            self.step.placeholder(),
            shown,
            if self.step.is_last() { "Done" } else { "Next" },
        );
        if let Some(message) = self.error_message() {
            let _ = write!(out, "\nError! {message}");
        }
        out
    }
}
