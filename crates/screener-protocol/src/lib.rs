//! Wire protocol for the screener API.
//!
//! This crate defines what the client and the API server exchange:
//!
//! - **Types** ([`TokenPair`], [`Credentials`], [`MarketSnapshot`], etc.):
//!   the JSON bodies sent to and received from the REST endpoints.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those bodies are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw HTTP bodies) and session
//! (user identity). It knows nothing about storage or views.
//!
//! ```text
//! Transport (bytes) → Protocol (TokenPair, MarketSnapshot) → Session
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    BreadthIndicator, Credentials, MarketBreadth, MarketSnapshot,
    RefreshRequest, RefreshedTokens, StrategySignal, TokenPair,
};

/// Token issuance endpoint (`POST`, body [`Credentials`]).
pub const TOKEN_PATH: &str = "/api/token/";

/// Token refresh endpoint (`POST`, body [`RefreshRequest`]).
pub const TOKEN_REFRESH_PATH: &str = "/api/token/refresh/";

/// Aggregated market signals (`GET`, response [`MarketSnapshot`]).
pub const MARKET_DATA_PATH: &str = "/api/market-data/general";
