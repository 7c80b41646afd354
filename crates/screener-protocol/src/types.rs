//! Body types for the screener REST API.
//!
//! Every type here is something that gets serialized to JSON, sent over
//! HTTP, and deserialized on the other side.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Authentication bodies
// ---------------------------------------------------------------------------

/// The access + refresh credential issued by the API on a successful login.
///
/// Both tokens are opaque signed JWTs. The access token carries a claims
/// payload that the client decodes (see `screener-session`) but never
/// verifies; verification is the API server's job.
///
/// `Debug` is implemented by hand so that tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived token sent as `Authorization: Bearer <access>`.
    pub access: String,

    /// Long-lived token exchanged for a new access token.
    pub refresh: String,
}

impl TokenPair {
    /// Creates a pair from anything string-like.
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }

    /// Applies a refresh response.
    ///
    /// The API only rotates the refresh token when configured to, so a
    /// response without one keeps the current refresh token.
    pub fn with_refreshed(&self, refreshed: RefreshedTokens) -> Self {
        Self {
            access: refreshed.access,
            refresh: refreshed.refresh.unwrap_or_else(|| self.refresh.clone()),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &redact(&self.access))
            .field("refresh", &redact(&self.refresh))
            .finish()
    }
}

/// Login form contents, sent to the token issuance endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /api/token/refresh/`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

impl fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("refresh", &redact(&self.refresh))
            .finish()
    }
}

/// Response of `POST /api/token/refresh/`.
///
/// `refresh` is only present when the server rotates refresh tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshedTokens {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl fmt::Debug for RefreshedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshedTokens")
            .field("access", &redact(&self.access))
            .field("rotated", &self.refresh.is_some())
            .finish()
    }
}

/// Keeps enough of a token to tell two apart in a debug dump.
fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}…({} chars)", token.chars().count())
}

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

/// One strategy's verdict for one ticker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategySignal {
    /// `true` when the strategy signals an entry.
    pub status: bool,

    /// The indicator values the strategy looked at (`rsi`, `ma20`, ...).
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
}

/// A market-breadth indicator (SEFI or ADR) with its long/short signals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BreadthIndicator {
    pub value: f64,
    pub short: bool,
    pub long: bool,
}

/// Market-wide breadth summary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketBreadth {
    /// `true` when either breadth indicator signals a long entry.
    pub is_entry: bool,

    #[serde(rename = "SEFI")]
    pub sefi: BreadthIndicator,

    #[serde(rename = "ADR")]
    pub adr: BreadthIndicator,

    /// Market-level strategies, e.g. `good_SEFI_oversold`.
    #[serde(default)]
    pub strategies: BTreeMap<String, bool>,
}

/// Response of `GET /api/market-data/general`.
///
/// `entries` maps ticker → strategy name → signal. The server answers
/// `"entries": false` when no ticker matched any strategy; that decodes
/// as an empty map. Unknown top-level fields (e.g. plotting series) are
/// ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(deserialize_with = "entries_or_false")]
    pub entries: BTreeMap<String, BTreeMap<String, StrategySignal>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_breadth: Option<MarketBreadth>,
}

impl MarketSnapshot {
    /// Tickers with at least one strategy listed, in sorted order.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// How many strategies currently signal an entry for `ticker`.
    /// Unknown tickers count as zero.
    pub fn active_strategies(&self, ticker: &str) -> usize {
        self.entries
            .get(ticker)
            .map(|strategies| strategies.values().filter(|s| s.status).count())
            .unwrap_or(0)
    }

    /// `true` if no ticker is listed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entries_or_false<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, BTreeMap<String, StrategySignal>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Entries(BTreeMap<String, BTreeMap<String, StrategySignal>>),
        Flag(bool),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Entries(entries) => Ok(entries),
        Repr::Flag(_) => Ok(BTreeMap::new()),
    }
}

// =========================================================================
// Tests
// =========================================================================
