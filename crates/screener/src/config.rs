//! Client configuration: defaults, overridable from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use screener_refresh::RefreshConfig;
use screener_transport::TransportConfig;

use crate::ScreenerError;

pub const ENV_BASE_URL: &str = "SCREENER_BASE_URL";
pub const ENV_STORAGE_PATH: &str = "SCREENER_STORAGE_PATH";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "SCREENER_REQUEST_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "SCREENER_CONNECT_TIMEOUT_SECS";
pub const ENV_REFRESH_INTERVAL_SECS: &str = "SCREENER_REFRESH_INTERVAL_SECS";

/// Everything needed to build a [`ScreenerApp`](crate::ScreenerApp).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API server root, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,

    /// File holding the persisted session.
    pub storage_path: PathBuf,

    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,

    /// Periodic token refresh. Disabled by default.
    pub refresh: RefreshConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            storage_path: PathBuf::from("screener-session.json"),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            refresh: RefreshConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `SCREENER_*` environment variables.
    pub fn from_env() -> Result<Self, ScreenerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `SCREENER_*` key. Empty values count as unset.
    ///
    /// # Errors
    /// [`ScreenerError::Config`] if a numeric variable doesn't parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ScreenerError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_BASE_URL) {
            config.base_url = url.trim().to_string();
        }
        if let Some(path) = get(ENV_STORAGE_PATH) {
            config.storage_path = PathBuf::from(path);
        }
        if let Some(raw) = get(ENV_REQUEST_TIMEOUT_SECS) {
            config.request_timeout_secs = parse_number(ENV_REQUEST_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = get(ENV_CONNECT_TIMEOUT_SECS) {
            config.connect_timeout_secs = parse_number(ENV_CONNECT_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = get(ENV_REFRESH_INTERVAL_SECS) {
            config.refresh.interval_secs = parse_number(ENV_REFRESH_INTERVAL_SECS, &raw)?;
        }

        Ok(config)
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
        }
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, ScreenerError> {
    raw.trim()
        .parse()
        .map_err(|_| ScreenerError::Config(format!("{key} must be a number, got {raw:?}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_points_at_local_api() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
        assert!(!config.refresh.is_enabled());
    }

    #[test]
    fn test_from_lookup_nothing_set_is_default() {
        assert_eq!(ClientConfig::from_lookup(lookup(&[])).unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides_each_field() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://screener.example.com"),
            (ENV_STORAGE_PATH, "/tmp/s.json"),
            (ENV_REQUEST_TIMEOUT_SECS, "5"),
            (ENV_CONNECT_TIMEOUT_SECS, " 2 "),
            (ENV_REFRESH_INTERVAL_SECS, "240"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://screener.example.com");
        assert_eq!(config.storage_path, PathBuf::from("/tmp/s.json"));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.connect_timeout_secs, 2);
        assert_eq!(config.refresh.interval_secs, 240);
    }

    #[test]
    fn test_from_lookup_empty_value_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[(ENV_BASE_URL, "  ")])).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn test_from_lookup_bad_number_is_config_error() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_REQUEST_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, ScreenerError::Config(_)));
        assert!(err.to_string().contains(ENV_REQUEST_TIMEOUT_SECS));
    }

    #[test]
    fn test_transport_config_zero_timeout_floored() {
        let config = ClientConfig {
            request_timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.transport_config().request_timeout, Duration::from_secs(1));
    }
}
