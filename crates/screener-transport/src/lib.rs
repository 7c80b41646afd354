//! Transport abstraction layer for the screener client.
//!
//! Provides the [`HttpTransport`] trait the API client is written against,
//! so tests and alternative HTTP stacks can stand in for the real one.
//!
//! # Feature Flags
//!
//! - `reqwest` (default): HTTP transport via `reqwest` with rustls

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "reqwest")]
mod http;

pub use error::TransportError;
#[cfg(feature = "reqwest")]
pub use http::{ReqwestTransport, TransportConfig};

use std::fmt;
use std::future::Future;

/// Opaque identifier for one request, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Creates a new `RequestId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The API contract only treats `200` as success; `201`, `204` and
    /// friends are not expected from any endpoint the client calls.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Sends requests to the API server.
///
/// Paths are relative to a base URL the implementation owns
/// (e.g. `/api/token/`). `bearer` attaches `Authorization: Bearer <token>`.
pub trait HttpTransport: Send + Sync + 'static {
    /// `POST`s a JSON body.
    fn post_json(
        &self,
        path: &str,
        body: Vec<u8>,
        bearer: Option<&str>,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;

    /// Issues a `GET`.
    fn get(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}
