//! Typed access to the screener REST API.
//!
//! [`ApiClient`] is the only place that knows endpoint paths and which
//! bodies go where. It implements [`TokenIssuer`] so the session can log
//! in and refresh through it, and fetches market data for the dashboard.

use screener_protocol::{
    Codec, Credentials, JsonCodec, MarketSnapshot, RefreshRequest, RefreshedTokens, TokenPair,
    MARKET_DATA_PATH, TOKEN_PATH, TOKEN_REFRESH_PATH,
};
use screener_session::{IssueOutcome, SessionError, TokenIssuer};
use screener_transport::{HttpResponse, HttpTransport, ReqwestTransport};

use crate::{ClientConfig, ScreenerError};

/// REST client over any [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct ApiClient<T = ReqwestTransport> {
    transport: T,
    codec: JsonCodec,
}

impl ApiClient<ReqwestTransport> {
    /// A client for `config.base_url` with the configured timeouts.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ScreenerError> {
        let transport = ReqwestTransport::new(&config.base_url, config.transport_config())?;
        Ok(Self::new(transport))
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            codec: JsonCodec,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `GET /api/market-data/general`, with the bearer attached if given.
    ///
    /// # Errors
    /// [`ScreenerError::UnexpectedStatus`] on any non-200 answer,
    /// otherwise transport or decode failures.
    pub async fn fetch_market_data(
        &self,
        bearer: Option<&str>,
    ) -> Result<MarketSnapshot, ScreenerError> {
        let response = self.transport.get(MARKET_DATA_PATH, bearer).await?;
        if !response.is_ok() {
            return Err(ScreenerError::UnexpectedStatus {
                path: MARKET_DATA_PATH.to_string(),
                status: response.status,
            });
        }
        let snapshot: MarketSnapshot = self.codec.decode(&response.body)?;
        tracing::debug!(tickers = snapshot.entries.len(), "market data fetched");
        Ok(snapshot)
    }

    async fn post_for<B, R>(&self, path: &str, body: &B) -> Result<IssueOutcome<R>, SessionError>
    where
        B: serde::Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let bytes = self.codec.encode(body)?;
        let response: HttpResponse = self
            .transport
            .post_json(path, bytes, None)
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        if !response.is_ok() {
            tracing::debug!(path, status = response.status, "token request rejected");
            return Ok(IssueOutcome::Rejected {
                status: response.status,
            });
        }
        Ok(IssueOutcome::Issued(self.codec.decode(&response.body)?))
    }
}

impl<T: HttpTransport> TokenIssuer for ApiClient<T> {
    async fn obtain_pair(
        &self,
        credentials: &Credentials,
    ) -> Result<IssueOutcome<TokenPair>, SessionError> {
        self.post_for(TOKEN_PATH, credentials).await
    }

    async fn refresh_access(
        &self,
        refresh: &str,
    ) -> Result<IssueOutcome<RefreshedTokens>, SessionError> {
        let body = RefreshRequest {
            refresh: refresh.to_string(),
        };
        self.post_for(TOKEN_REFRESH_PATH, &body).await
    }
}
