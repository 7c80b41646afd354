//! Decoding the identity carried inside an access token.
//!
//! An access token is three base64url segments joined by dots:
//! `header.payload.signature`. The payload is a JSON object of claims.
//! The client only *reads* it; signature verification is the API
//! server's job, so nothing here touches the header or signature beyond
//! checking that they are there.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use screener_protocol::TokenPair;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Why a token could not be turned into an identity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// Not three dot-separated segments.
    #[error("token is not a three-segment JWT")]
    Malformed,

    #[error("payload is not base64url: {0}")]
    Base64(String),

    #[error("payload is not a claims object: {0}")]
    Claims(String),

    /// Only produced when expired tokens are configured to be rejected.
    #[error("token expired at {exp}")]
    Expired { exp: f64 },
}

/// A token subject: numeric database ids and string ids both occur.
/// Any other JSON value is carried as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    Id(i64),
    Name(String),
    Other(Value),
}

impl From<Value> for Subject {
    fn from(value: Value) -> Self {
        if let Some(id) = value.as_i64() {
            return Self::Id(id);
        }
        match value {
            Value::String(name) => Self::Name(name),
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

/// The decoded claims payload of an access token.
///
/// The well-known claims get typed fields when their JSON type fits.
/// Everything else the server put in the token, including a well-known
/// claim of an unexpected type, is kept in `extra`, so nothing is lost
/// and any JSON object decodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Subject>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<Subject>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Expiry, seconds since the Unix epoch. Fractional seconds allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<f64>,

    /// Issued-at, seconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl<'de> Deserialize<'de> for Claims {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let extra = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_object(extra))
    }
}

impl Claims {
    /// Sorts a claims object into typed fields and `extra`.
    pub fn from_object(mut extra: BTreeMap<String, Value>) -> Self {
        let user_id = take_claim(&mut extra, "user_id", |v| Some(Subject::from(v.clone())));
        let sub = take_claim(&mut extra, "sub", |v| Some(Subject::from(v.clone())));
        let username = take_claim(&mut extra, "username", string_claim);
        let token_type = take_claim(&mut extra, "token_type", string_claim);
        let exp = take_claim(&mut extra, "exp", numeric_date);
        let iat = take_claim(&mut extra, "iat", numeric_date);
        let jti = take_claim(&mut extra, "jti", string_claim);
        Self {
            user_id,
            sub,
            username,
            token_type,
            exp,
            iat,
            jti,
            extra,
        }
    }

    /// The subject, preferring `user_id` over `sub`.
    pub fn subject(&self) -> Option<&Subject> {
        self.user_id.as_ref().or(self.sub.as_ref())
    }

    /// A human-readable name: `username`, then subject, then `"unknown"`.
    pub fn display_name(&self) -> String {
        match (&self.username, self.subject()) {
            (Some(name), _) => name.clone(),
            (None, Some(subject)) => subject.to_string(),
            (None, None) => "unknown".to_string(),
        }
    }

    /// Returns `true` if `exp` is present and not after `now` (Unix secs).
    /// Tokens without `exp` never expire from the client's point of view.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.exp.is_some_and(|exp| exp <= now as f64)
    }

    /// Time left until `exp`, or `None` if there is no `exp` or it has
    /// already passed.
    pub fn expires_in(&self, now: u64) -> Option<Duration> {
        self.exp
            .map(|exp| exp - now as f64)
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// Moves `key` out of `extra` when `typed` accepts its value.
fn take_claim<T>(
    extra: &mut BTreeMap<String, Value>,
    key: &str,
    typed: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let value = typed(extra.get(key)?)?;
    extra.remove(key);
    Some(value)
}

fn string_claim(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

/// RFC 7519 NumericDate: any JSON number of seconds.
fn numeric_date(value: &Value) -> Option<f64> {
    value.as_f64().filter(|secs| secs.is_finite())
}

/// Decodes the claims payload of a JWT without verifying it.
///
/// Padded and standard-alphabet payloads are accepted as well as the
/// canonical unpadded base64url form.
pub fn decode_claims(token: &str) -> Result<Claims, DecodeError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(DecodeError::Malformed);
    };
    if header.is_empty() || payload.is_empty() {
        return Err(DecodeError::Malformed);
    }

    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| DecodeError::Base64(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| DecodeError::Claims(e.to_string()))
}

/// The identity of whoever holds `pair`: the claims of its access token.
///
/// Called at startup, after login, and after refresh. Nowhere else.
pub fn derive_identity(pair: &TokenPair) -> Result<Claims, DecodeError> {
    decode_claims(&pair.access)
}

/// Seconds since the Unix epoch, the unit of `exp` and `iat`.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
