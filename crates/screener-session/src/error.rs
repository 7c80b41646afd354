//! Error types for the session layer.

use screener_protocol::ProtocolError;

use crate::DecodeError;

/// Errors that can occur during session management.
///
/// None of these is fatal to the client: every session state can be
/// rebuilt from storage or a fresh login.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading or writing persisted storage failed.
    #[error("storage failed: {0}")]
    Storage(String),

    /// A body could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The token issuer could not reach the API server.
    #[error("token endpoint unreachable: {0}")]
    Transport(String),

    /// The token endpoint answered, but not with `200`.
    /// Wrong credentials typically show up as `401`.
    #[error("login rejected with status {status}")]
    LoginRejected { status: u16 },

    /// The refresh endpoint answered, but not with `200`.
    #[error("token refresh rejected with status {status}")]
    RefreshRejected { status: u16 },

    /// An access token carried no usable identity.
    #[error("access token has no usable identity: {0}")]
    InvalidIdentity(#[from] DecodeError),
}
