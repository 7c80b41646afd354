//! The token-issuing seam between the session and the API server.
//!
//! The session layer never speaks HTTP. It asks a [`TokenIssuer`] for a
//! pair and gets back either the pair or the status the server answered
//! with. The facade crate implements this over a real HTTP client; tests
//! implement it with canned answers.

use std::future::Future;

use screener_protocol::{Credentials, RefreshedTokens, TokenPair};

use crate::SessionError;

/// What the server answered to a token request.
///
/// A rejection is a normal answer (wrong password, stale refresh token),
/// so it is a variant here rather than an `Err`. `Err` is reserved for
/// not getting an answer at all.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueOutcome<T> {
    /// Status 200 with a decodable body.
    Issued(T),

    /// Any other status. The body is ignored.
    Rejected { status: u16 },
}

/// Obtains and refreshes token pairs.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` so the issuer can live inside a session that
/// is shared with a background refresh task.
///
/// # Example
///
/// ```rust
/// use screener_protocol::{Credentials, RefreshedTokens, TokenPair};
/// use screener_session::{IssueOutcome, SessionError, TokenIssuer};
///
/// /// Rejects everyone. Handy for exercising the failure path.
/// struct ClosedDoor;
///
/// impl TokenIssuer for ClosedDoor {
///     async fn obtain_pair(
///         &self,
///         _credentials: &Credentials,
///     ) -> Result<IssueOutcome<TokenPair>, SessionError> {
///         Ok(IssueOutcome::Rejected { status: 401 })
///     }
///
///     async fn refresh_access(
///         &self,
///         _refresh: &str,
///     ) -> Result<IssueOutcome<RefreshedTokens>, SessionError> {
///         Ok(IssueOutcome::Rejected { status: 401 })
///     }
/// }
/// ```
pub trait TokenIssuer: Send + Sync + 'static {
    /// Exchanges credentials for a fresh token pair.
    fn obtain_pair(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<IssueOutcome<TokenPair>, SessionError>> + Send;

    /// Exchanges a refresh token for a new access token (and possibly a
    /// rotated refresh token).
    fn refresh_access(
        &self,
        refresh: &str,
    ) -> impl Future<Output = Result<IssueOutcome<RefreshedTokens>, SessionError>> + Send;
}
