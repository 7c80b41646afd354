//! HTTP transport implementation using `reqwest`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::{HttpResponse, HttpTransport, RequestId, TransportError};

/// Counter for generating unique request IDs.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Timeouts applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// A `reqwest`-backed [`HttpTransport`] bound to one API base URL.
///
/// Cloning is cheap: `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Builds a transport for `base_url` (e.g. `http://127.0.0.1:8000`).
    ///
    /// The URL must parse with an `http` or `https` scheme and a host.
    /// A trailing slash is stripped so paths can always start with `/`.
    pub fn new(
        base_url: &str,
        config: TransportConfig,
    ) -> Result<Self, TransportError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|_| TransportError::InvalidBaseUrl(base_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
            return Err(TransportError::InvalidBaseUrl(base_url));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        tracing::debug!(%base_url, "HTTP transport ready");
        Ok(Self { client, base_url })
    }

    /// The base URL every path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn execute(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
        bearer: Option<&str>,
    ) -> Result<HttpResponse, TransportError> {
        let id = RequestId::new(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed));
        let request = match bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            tracing::debug!(%id, path, error = %e, "request failed");
            TransportError::RequestFailed {
                path: path.to_string(),
                message: e.to_string(),
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::BodyFailed {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(%id, path, status, bytes = body.len(), "response received");
        Ok(HttpResponse::new(status, body.to_vec()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        path: &str,
        body: Vec<u8>,
        bearer: Option<&str>,
    ) -> Result<HttpResponse, TransportError> {
        let request = self
            .client
            .post(self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body);
        self.execute(path, request, bearer).await
    }

    async fn get(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<HttpResponse, TransportError> {
        let request = self
            .client
            .get(self.url(path))
            .header(ACCEPT, "application/json");
        self.execute(path, request, bearer).await
    }
}
