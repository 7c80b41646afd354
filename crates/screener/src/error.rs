//! Unified error type for the screener client.

use screener_protocol::ProtocolError;
use screener_router::RouterError;
use screener_session::SessionError;
use screener_transport::TransportError;

/// Top-level error wrapping every crate-specific error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Router(#[from] RouterError),

    /// A configuration value couldn't be used.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The API answered with something other than `200`.
    #[error("{path} answered with status {status}")]
    UnexpectedStatus { path: String, status: u16 },
}
