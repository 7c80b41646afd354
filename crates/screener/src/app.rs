//! `ScreenerApp` builder and the app itself.
//!
//! Ties the layers together: transport → API client → session → router.
//! The app owns the session behind an async mutex so an optional
//! background refresh task can share it.

use std::sync::Arc;

use screener_protocol::MarketSnapshot;
use screener_refresh::{RefreshConfig, RefreshScheduler};
use screener_router::{Resolution, Route, Router, ViewContext};
use screener_session::{
    EffectLog, FileStorage, SessionConfig, SessionContext, SessionEffects, SessionSnapshot,
    Storage,
};
use screener_transport::{HttpTransport, ReqwestTransport};
use tokio::sync::{oneshot, Mutex, Notify};

use crate::refresher::{run_refresh_loop, RefreshTask};
use crate::{ApiClient, ClientConfig, ScreenerError};

/// The session type the app drives.
pub type AppSession<S, T> = SessionContext<S, ApiClient<T>, EffectLog>;

/// Builder for a [`ScreenerApp`].
///
/// # Example
///
/// ```rust,no_run
/// use screener::prelude::*;
///
/// # fn main() -> Result<(), ScreenerError> {
/// let app = ScreenerApp::builder()
///     .config(ClientConfig::from_env()?)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScreenerAppBuilder {
    config: ClientConfig,
    session_config: SessionConfig,
}

impl ScreenerAppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Builds the app over `reqwest` and a session file at
    /// `config.storage_path`. Reads the persisted session once.
    pub fn build(self) -> Result<ScreenerApp<FileStorage, ReqwestTransport>, ScreenerError> {
        let api = ApiClient::from_config(&self.config)?;
        let storage = FileStorage::new(&self.config.storage_path);
        Ok(self.build_with(storage, api))
    }

    /// Builds the app over any storage and transport.
    pub fn build_with<S, T>(self, storage: S, api: ApiClient<T>) -> ScreenerApp<S, T>
    where
        S: Storage,
        T: HttpTransport + Clone,
    {
        let effects = EffectLog::new();
        let session =
            SessionContext::start(storage, api.clone(), effects.clone(), self.session_config);

        tracing::info!(state = %session.state(), "screener client ready");

        ScreenerApp {
            session: Arc::new(Mutex::new(session)),
            api,
            effects,
            router: Router::new(),
            market: None,
            refresh: self.config.refresh,
            session_changed: Arc::new(Notify::new()),
        }
    }
}

/// A running screener client.
///
/// Defaults to the on-disk, `reqwest`-backed client that
/// [`ScreenerAppBuilder::build`] produces.
pub struct ScreenerApp<S = FileStorage, T = ReqwestTransport> {
    session: Arc<Mutex<AppSession<S, T>>>,
    api: ApiClient<T>,
    effects: EffectLog,
    router: Router,
    /// Last market snapshot successfully fetched.
    market: Option<MarketSnapshot>,
    refresh: RefreshConfig,
    /// Wakes a running refresh task after a login.
    session_changed: Arc<Notify>,
}

impl ScreenerApp {
    pub fn builder() -> ScreenerAppBuilder {
        ScreenerAppBuilder::new()
    }
}

impl<S, T> ScreenerApp<S, T>
where
    S: Storage,
    T: HttpTransport + Clone,
{
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    /// The route last navigated to, `/` before any navigation.
    pub fn current_route(&self) -> Route {
        self.effects
            .current_path()
            .and_then(|path| Route::parse(&path).ok())
            .unwrap_or(Route::Landing)
    }

    pub fn market(&self) -> Option<&MarketSnapshot> {
        self.market.as_ref()
    }

    pub fn effects(&self) -> &EffectLog {
        &self.effects
    }

    /// Returns and forgets the notices raised since the last call.
    pub fn take_alerts(&self) -> Vec<String> {
        self.effects.take_alerts()
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ScreenerError> {
        self.session
            .lock()
            .await
            .login_user(username, password)
            .await?;
        self.session_changed.notify_one();
        Ok(())
    }

    /// Logs out and forgets any fetched market data.
    pub async fn logout(&mut self) {
        self.session.lock().await.logout_user();
        self.market = None;
    }

    /// Goes to `path`, through the route guard.
    ///
    /// Landing on the dashboard fetches fresh market data; a failed
    /// fetch keeps whatever was shown before.
    pub async fn navigate(&mut self, path: &str) -> Result<Resolution, ScreenerError> {
        let snapshot = self.snapshot().await;
        let resolution = self.router.resolve(path, &snapshot)?;
        let route = resolution.route();

        self.effects.navigate(route.path());
        tracing::info!(%route, "navigated");

        if route == Route::Application {
            self.load_market_data().await;
        }
        Ok(resolution)
    }

    /// Fetches market data with the current bearer.
    ///
    /// Returns `true` if new data was applied. Failures are logged at
    /// warn and leave the previous data in place.
    pub async fn load_market_data(&mut self) -> bool {
        let bearer = self.session.lock().await.access_token().map(str::to_owned);
        match self.api.fetch_market_data(bearer.as_deref()).await {
            Ok(snapshot) => {
                self.market = Some(snapshot);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "market data not applied");
                false
            }
        }
    }

    /// Renders the current route. The guard runs again first, so a
    /// session that ended in the background never shows protected data.
    pub async fn render(&self) -> Result<String, ScreenerError> {
        let snapshot = self.snapshot().await;
        let resolution = self.router.resolve(self.current_route().path(), &snapshot)?;
        let ctx = ViewContext::new(&snapshot).with_market(self.market.as_ref());
        Ok(self.router.render(resolution.route(), &ctx)?)
    }

    /// Refreshes tokens now. A failure ends the session.
    pub async fn refresh_now(&self) -> Result<(), ScreenerError> {
        self.session.lock().await.refresh_tokens().await?;
        Ok(())
    }

    /// Starts the periodic refresh task, or returns `None` when refresh
    /// is disabled. Must be called inside a tokio runtime.
    pub fn spawn_refresh_task(&self) -> Option<RefreshTask> {
        if !self.refresh.is_enabled() {
            tracing::debug!("token refresh disabled");
            return None;
        }
        let scheduler = RefreshScheduler::new(self.refresh.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_refresh_loop(
            Arc::clone(&self.session),
            scheduler,
            Arc::clone(&self.session_changed),
            shutdown_rx,
        ));
        Some(RefreshTask::new(shutdown_tx, handle))
    }
}
