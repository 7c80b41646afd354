//! The session context: single owner of the logged-in state.
//!
//! Every transition goes through here. Readers get a
//! [`SessionSnapshot`] or borrow through the accessors; nothing else
//! mutates tokens or identity.
//!
//! # Concurrency note
//!
//! `SessionContext` is not internally synchronized. The app owns it and
//! shares it with the refresh task behind an async mutex, so the
//! `&mut self` methods here are never interleaved.

use screener_protocol::{Credentials, TokenPair};

use crate::{
    derive_identity, unix_now, Claims, DecodeError, IssueOutcome, SessionConfig, SessionEffects,
    SessionError, SessionSnapshot, SessionState, Storage, TokenIssuer, TokenStore, HOME_PATH,
    LOGIN_FAILED_NOTICE, LOGIN_PATH,
};

/// Owns the token pair, the derived identity, and the loading flag.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ initialize() ──→ login_user() ⇄ logout_user()
///  [Initializing]   │              │
///                   ▼              ▼
///             [Anonymous]   [Authenticated] ──→ refresh_tokens()
/// ```
pub struct SessionContext<S, I, E> {
    store: TokenStore<S>,
    issuer: I,
    effects: E,
    config: SessionConfig,

    tokens: Option<TokenPair>,
    user: Option<Claims>,

    /// `true` until [`initialize`](Self::initialize) has run.
    loading: bool,
}

impl<S, I, E> SessionContext<S, I, E>
where
    S: Storage,
    I: TokenIssuer,
    E: SessionEffects,
{
    /// Creates a context in the `Initializing` state. Nothing is read
    /// from storage until [`initialize`](Self::initialize).
    pub fn new(storage: S, issuer: I, effects: E, config: SessionConfig) -> Self {
        let store = TokenStore::with_key(storage, config.storage_key.clone());
        Self {
            store,
            issuer,
            effects,
            config,
            tokens: None,
            user: None,
            loading: true,
        }
    }

    /// [`new`](Self::new) followed by [`initialize`](Self::initialize).
    pub fn start(storage: S, issuer: I, effects: E, config: SessionConfig) -> Self {
        let mut context = Self::new(storage, issuer, effects, config);
        context.initialize();
        context
    }

    /// Leaves `Initializing` by consulting the token store once.
    ///
    /// A stored pair whose access token yields an identity becomes the
    /// session. Anything else (nothing stored, malformed JSON, a token
    /// that doesn't decode) leaves the session anonymous. Calling this
    /// again is a no-op.
    pub fn initialize(&mut self) {
        if !self.loading {
            tracing::debug!("session already initialized");
            return;
        }

        if let Some(pair) = self.store.load() {
            match self.identify(&pair) {
                Ok(claims) => {
                    tracing::info!(user = %claims.display_name(), "session restored");
                    self.tokens = Some(pair);
                    self.user = Some(claims);
                }
                Err(e) => {
                    tracing::info!(error = %e, "stored session has no usable identity");
                }
            }
        }

        self.loading = false;
        tracing::debug!(state = %self.state(), "session initialized");
    }

    /// Exchanges credentials for a token pair and makes it the session.
    ///
    /// On success the pair is persisted and the UI navigates to `/`.
    /// On any failure the session is left exactly as it was and the
    /// generic login notice is raised; the error is also returned for
    /// callers that want the detail.
    ///
    /// Logging in while already authenticated replaces the session.
    pub async fn login_user(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        let credentials = Credentials::new(username, password);
        tracing::info!(username, "login requested");

        let outcome = match self.issuer.obtain_pair(&credentials).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.login_failed(e)),
        };

        let pair = match outcome {
            IssueOutcome::Issued(pair) => pair,
            IssueOutcome::Rejected { status } => {
                return Err(self.login_failed(SessionError::LoginRejected { status }));
            }
        };

        let claims = match self.identify(&pair) {
            Ok(claims) => claims,
            Err(e) => return Err(self.login_failed(e.into())),
        };

        self.persist(&pair);
        tracing::info!(user = %claims.display_name(), "logged in");
        self.tokens = Some(pair);
        self.user = Some(claims);
        self.effects.navigate(HOME_PATH);
        Ok(())
    }

    /// Ends the session from any state and navigates to `/login`.
    ///
    /// Always succeeds: a storage failure while clearing is logged only.
    pub fn logout_user(&mut self) {
        self.tokens = None;
        self.user = None;
        self.loading = false;

        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }

        tracing::info!("logged out");
        self.effects.navigate(LOGIN_PATH);
    }

    /// Trades the refresh token for a new access token.
    ///
    /// No-op while anonymous. On success the new pair replaces the old
    /// one (keeping the old refresh token if the server didn't rotate
    /// it) and is persisted. On any failure the session is logged out.
    pub async fn refresh_tokens(&mut self) -> Result<(), SessionError> {
        let Some(current) = self.tokens.clone() else {
            tracing::debug!("refresh skipped, no session");
            return Ok(());
        };

        let refreshed = match self.issuer.refresh_access(&current.refresh).await {
            Ok(IssueOutcome::Issued(refreshed)) => refreshed,
            Ok(IssueOutcome::Rejected { status }) => {
                return Err(self.refresh_failed(SessionError::RefreshRejected { status }));
            }
            Err(e) => return Err(self.refresh_failed(e)),
        };

        let pair = current.with_refreshed(refreshed);
        let claims = match self.identify(&pair) {
            Ok(claims) => claims,
            Err(e) => return Err(self.refresh_failed(e.into())),
        };

        self.persist(&pair);
        tracing::info!(user = %claims.display_name(), "tokens refreshed");
        self.tokens = Some(pair);
        self.user = Some(claims);
        Ok(())
    }

    // -- Accessors --

    pub fn state(&self) -> SessionState {
        if self.loading {
            SessionState::Initializing
        } else if self.user.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn user(&self) -> Option<&Claims> {
        self.user.as_ref()
    }

    pub fn tokens(&self) -> Option<&TokenPair> {
        self.tokens.as_ref()
    }

    /// The bearer token for API calls, if logged in.
    pub fn access_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|pair| pair.access.as_str())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state(),
            tokens: self.tokens.clone(),
            user: self.user.clone(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn effects(&self) -> &E {
        &self.effects
    }

    pub fn store(&self) -> &TokenStore<S> {
        &self.store
    }

    // -- Internal --

    fn identify(&self, pair: &TokenPair) -> Result<Claims, DecodeError> {
        let claims = derive_identity(pair)?;
        match claims.exp {
            Some(exp) if self.config.reject_expired_tokens && claims.is_expired_at(unix_now()) => {
                Err(DecodeError::Expired { exp })
            }
            _ => Ok(claims),
        }
    }

    /// The in-memory session stays authoritative when persisting fails;
    /// the next restart simply comes up anonymous.
    fn persist(&self, pair: &TokenPair) {
        if let Err(e) = self.store.save(pair) {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }

    fn login_failed(&self, error: SessionError) -> SessionError {
        tracing::warn!(error = %error, "login failed");
        self.effects.alert(LOGIN_FAILED_NOTICE);
        error
    }

    fn refresh_failed(&mut self, error: SessionError) -> SessionError {
        tracing::warn!(error = %error, "token refresh failed, ending session");
        self.logout_user();
        error
    }
}
