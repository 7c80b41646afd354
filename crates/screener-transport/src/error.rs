/// Errors that can occur in the transport layer.
///
/// A non-200 status is NOT a transport error: the request reached the
/// server and came back, so callers get an [`HttpResponse`](crate::HttpResponse)
/// and decide for themselves.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The configured base URL can't be used to build request URLs.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("http client build failed: {0}")]
    ClientBuild(String),

    /// The request never produced a response (connection refused,
    /// DNS failure, timeout).
    #[error("request to {path} failed: {message}")]
    RequestFailed { path: String, message: String },

    /// The response arrived but its body could not be read.
    #[error("reading response body from {path} failed: {message}")]
    BodyFailed { path: String, message: String },
}
