//! Session types: the read-side view of who is logged in.
//!
//! The mutable state itself lives inside
//! [`SessionContext`](crate::SessionContext). Everything here is either
//! configuration or an immutable copy handed to readers (router, views).

use std::fmt;

use screener_protocol::TokenPair;

use crate::{Claims, TOKEN_STORAGE_KEY};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Storage key holding the serialized token pair.
    ///
    /// Default: `"authTokens"`.
    pub storage_key: String,

    /// When `true`, an access token whose `exp` claim lies in the past is
    /// treated as carrying no identity (the session stays anonymous).
    ///
    /// Default: `false`. The API server is the authority on expiry and
    /// rejects stale bearers itself.
    pub reject_expired_tokens: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: TOKEN_STORAGE_KEY.to_string(),
            reject_expired_tokens: false,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
///
/// ```text
///   Initializing ──(initialize)──→ Anonymous ──(login_user)──→ Authenticated
///        │                            ↑                            │
///        └──────(stored pair)─────────┼────────────────────────────┘
///                                     └────────(logout_user)───────┘
/// ```
///
/// `Initializing` is left exactly once. Views never render while in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Persisted storage has not been consulted yet.
    Initializing,

    /// No token pair, no identity.
    Anonymous,

    /// A token pair is held and its access token decoded to an identity.
    Authenticated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => f.write_str("initializing"),
            Self::Anonymous => f.write_str("anonymous"),
            Self::Authenticated => f.write_str("authenticated"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// An immutable copy of the session, safe to hand to views.
///
/// `tokens` and `user` are either both present or both absent.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub tokens: Option<TokenPair>,
    pub user: Option<Claims>,
}

impl SessionSnapshot {
    /// A snapshot with nobody logged in.
    pub fn anonymous() -> Self {
        Self {
            state: SessionState::Anonymous,
            tokens: None,
            user: None,
        }
    }

    /// A logged-in snapshot.
    pub fn authenticated(tokens: TokenPair, user: Claims) -> Self {
        Self {
            state: SessionState::Authenticated,
            tokens: Some(tokens),
            user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Initializing
    }
}
