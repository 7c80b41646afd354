//! # Screener
//!
//! Client for the market screener API: keeps a JWT session on disk,
//! gates the dashboard behind it, and renders each screen as text.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use screener::prelude::*;
//!
//! # async fn run() -> Result<(), ScreenerError> {
//! let mut app = ScreenerApp::builder()
//!     .config(ClientConfig::from_env()?)
//!     .build()?;
//!
//! app.login("alice", "s3cret").await?;
//! app.navigate("/application").await?;
//! println!("{}", app.render().await?);
//! # Ok(())
//! # }
//! ```

mod api;
mod app;
mod config;
mod error;
mod handler;
mod refresher;

pub use api::ApiClient;
pub use app::{AppSession, ScreenerApp, ScreenerAppBuilder};
pub use config::{
    ClientConfig, ENV_BASE_URL, ENV_CONNECT_TIMEOUT_SECS, ENV_REFRESH_INTERVAL_SECS,
    ENV_REQUEST_TIMEOUT_SECS, ENV_STORAGE_PATH,
};
pub use error::ScreenerError;
pub use handler::{handle_action, Action};
pub use refresher::RefreshTask;

pub use screener_protocol as protocol;
pub use screener_refresh as refresh;
pub use screener_router as router;
pub use screener_session as session;
pub use screener_transport as transport;

use tracing_subscriber::EnvFilter;

pub mod prelude {
    pub use crate::{
        handle_action, Action, ApiClient, ClientConfig, RefreshTask, ScreenerApp,
        ScreenerAppBuilder, ScreenerError,
    };
    pub use screener_protocol::{MarketSnapshot, TokenPair};
    pub use screener_refresh::RefreshConfig;
    pub use screener_router::{MarketStats, Route, SignupForm, SignupProgress};
    pub use screener_session::{Claims, SessionConfig, SessionSnapshot, SessionState};
}

/// Installs a stderr `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (e.g. `"warn"`)
/// applies. Calling this twice is harmless.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
