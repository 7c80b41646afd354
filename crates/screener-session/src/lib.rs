//! Client-side session management for the screener.
//!
//! This crate owns the lifecycle of a logged-in user:
//!
//! 1. **Persistence**: the token pair lives in key/value [`Storage`]
//!    behind a [`TokenStore`], so a session survives restarts
//! 2. **Identity**: the user is the decoded claims of the access token
//!    ([`derive_identity`]), recomputed whenever the pair changes
//! 3. **Transitions**: [`SessionContext`] is the only writer of session
//!    state (`Initializing → Anonymous ⇄ Authenticated`)
//!
//! # How it fits in the stack
//!
//! ```text
//! Router (above)   ← reads SessionSnapshot to gate protected views
//!     ↕
//! Session (this crate)  ← owns tokens + identity, talks to a TokenIssuer
//!     ↕
//! Protocol (below)  ← TokenPair, Credentials, codecs
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod claims;
mod context;
mod effects;
mod error;
mod session;
mod store;

pub use auth::{IssueOutcome, TokenIssuer};
pub use claims::{decode_claims, derive_identity, unix_now, Claims, DecodeError, Subject};
pub use context::SessionContext;
pub use effects::{EffectLog, SessionEffects};
pub use error::SessionError;
pub use session::{SessionConfig, SessionSnapshot, SessionState};
pub use store::{FileStorage, MemoryStorage, Storage, TokenStore};

/// Where a successful login lands.
pub const HOME_PATH: &str = "/";

/// Where logout lands.
pub const LOGIN_PATH: &str = "/login";

/// The generic notice shown when a login attempt fails for any reason.
pub const LOGIN_FAILED_NOTICE: &str = "Something Went Wrong";

/// Storage key holding the JSON-serialized token pair.
pub const TOKEN_STORAGE_KEY: &str = "authTokens";
