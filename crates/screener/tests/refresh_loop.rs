//! The background refresh loop, driven tick by tick.
//!
//! Timer tests run with `start_paused = true`, so tokio auto-advances
//! virtual time whenever every task is idle. The API is a scripted
//! in-memory transport: a real socket would stall the virtual clock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use screener::prelude::*;
use screener::protocol::{TOKEN_PATH, TOKEN_REFRESH_PATH};
use screener::session::{unix_now, MemoryStorage, TokenStore};
use screener::transport::{HttpResponse, HttpTransport, TransportError};

// =========================================================================
// Helpers
// =========================================================================

#[derive(Default)]
struct Script {
    answers: VecDeque<HttpResponse>,
    requests: Vec<String>,
}

/// Answers requests in order; 500 once the script runs out.
#[derive(Clone, Default)]
struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    fn answer(self, status: u16, body: String) -> Self {
        self.script
            .lock()
            .unwrap()
            .answers
            .push_back(HttpResponse::new(status, body));
        self
    }

    fn requests(&self) -> Vec<String> {
        self.script.lock().unwrap().requests.clone()
    }

    fn next(&self, path: &str) -> HttpResponse {
        let mut script = self.script.lock().unwrap();
        script.requests.push(path.to_string());
        script
            .answers
            .pop_front()
            .unwrap_or_else(|| HttpResponse::new(500, Vec::new()))
    }
}

impl HttpTransport for ScriptedTransport {
    async fn post_json(
        &self,
        path: &str,
        _body: Vec<u8>,
        _bearer: Option<&str>,
    ) -> Result<HttpResponse, TransportError> {
        Ok(self.next(path))
    }

    async fn get(&self, path: &str, _bearer: Option<&str>) -> Result<HttpResponse, TransportError> {
        Ok(self.next(path))
    }
}

fn jwt(payload: &str) -> String {
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#),
        URL_SAFE_NO_PAD.encode(payload.as_bytes())
    )
}

fn access_expiring_in(secs: u64) -> String {
    jwt(&format!(
        r#"{{"user_id":1,"username":"alice","exp":{}}}"#,
        unix_now() + secs
    ))
}

fn pair_body(access: &str) -> String {
    serde_json::json!({ "access": access, "refresh": "r1" }).to_string()
}

fn refreshed_body(access: &str) -> String {
    serde_json::json!({ "access": access }).to_string()
}

fn app_with(
    transport: ScriptedTransport,
    storage: MemoryStorage,
    interval_secs: u64,
) -> ScreenerApp<MemoryStorage, ScriptedTransport> {
    let config = ClientConfig {
        refresh: RefreshConfig {
            interval_secs,
            initial_jitter_ms: 0,
        },
        ..ClientConfig::default()
    };
    ScreenerApp::builder()
        .config(config)
        .build_with(storage, ApiClient::new(transport))
}

// =========================================================================
// Outcomes per tick
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_refresh_loop_anonymous_ticks_are_skipped() {
    let transport = ScriptedTransport::default();
    let app = app_with(transport.clone(), MemoryStorage::new(), 60);

    let task = app.spawn_refresh_task().unwrap();
    tokio::time::sleep(Duration::from_secs(125)).await;
    let metrics = task.stop().await;

    assert_eq!(metrics.total_attempts, 2);
    assert_eq!(metrics.total_skipped, 2);
    assert!(transport.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_loop_success_replaces_access_token() {
    let new_access = jwt(r#"{"user_id":1,"username":"alice","jti":"two"}"#);
    let transport = ScriptedTransport::default()
        .answer(200, pair_body(&jwt(r#"{"user_id":1,"username":"alice"}"#)))
        .answer(200, refreshed_body(&new_access));
    let storage = MemoryStorage::new();
    let mut app = app_with(transport.clone(), storage.clone(), 60);
    app.login("alice", "s3cret").await.unwrap();

    let task = app.spawn_refresh_task().unwrap();
    tokio::time::sleep(Duration::from_secs(61)).await;
    let metrics = task.stop().await;

    assert_eq!(metrics.total_refreshed, 1);
    assert_eq!(metrics.consecutive_failures, 0);
    let expected = TokenPair::new(new_access, "r1");
    assert_eq!(app.snapshot().await.tokens, Some(expected.clone()));
    assert_eq!(TokenStore::new(storage).load(), Some(expected));
    assert_eq!(transport.requests(), vec![TOKEN_PATH, TOKEN_REFRESH_PATH]);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_loop_failure_logs_out() {
    let transport = ScriptedTransport::default()
        .answer(200, pair_body(&jwt(r#"{"user_id":1}"#)))
        .answer(401, r#"{"detail":"Token is blacklisted"}"#.to_string());
    let storage = MemoryStorage::new();
    let mut app = app_with(transport, storage.clone(), 60);
    app.login("alice", "s3cret").await.unwrap();

    let task = app.spawn_refresh_task().unwrap();
    tokio::time::sleep(Duration::from_secs(61)).await;
    let metrics = task.stop().await;

    assert_eq!(metrics.total_failed, 1);
    assert_eq!(metrics.consecutive_failures, 1);
    assert_eq!(app.snapshot().await.state, SessionState::Anonymous);
    assert!(storage.is_empty());
    assert_eq!(app.current_route(), Route::Login);
}

// =========================================================================
// Expiry-driven scheduling
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_refresh_loop_restored_session_refreshes_before_expiry() {
    let storage = MemoryStorage::new();
    TokenStore::new(storage.clone())
        .save(&TokenPair::new(access_expiring_in(120), "r1"))
        .unwrap();
    let transport = ScriptedTransport::default().answer(200, refreshed_body(&jwt(r#"{"user_id":1}"#)));
    let app = app_with(transport.clone(), storage, 600);

    let task = app.spawn_refresh_task().unwrap();
    tokio::time::sleep(Duration::from_secs(95)).await;
    let metrics = task.stop().await;

    assert_eq!(metrics.total_refreshed, 1);
    assert_eq!(transport.requests(), vec![TOKEN_REFRESH_PATH]);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_loop_login_after_start_refreshes_before_expiry() {
    let transport = ScriptedTransport::default()
        .answer(200, pair_body(&access_expiring_in(120)))
        .answer(200, refreshed_body(&jwt(r#"{"user_id":1}"#)));
    let mut app = app_with(transport.clone(), MemoryStorage::new(), 600);

    let task = app.spawn_refresh_task().unwrap();
    app.login("alice", "s3cret").await.unwrap();
    tokio::time::sleep(Duration::from_secs(95)).await;
    let metrics = task.stop().await;

    assert_eq!(metrics.total_refreshed, 1);
    assert_eq!(metrics.total_skipped, 0);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_loop_nearly_expired_token_refreshes_soon() {
    let storage = MemoryStorage::new();
    TokenStore::new(storage.clone())
        .save(&TokenPair::new(access_expiring_in(10), "r1"))
        .unwrap();
    let transport = ScriptedTransport::default().answer(200, refreshed_body(&jwt(r#"{"user_id":1}"#)));
    let app = app_with(transport.clone(), storage, 600);

    let task = app.spawn_refresh_task().unwrap();
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(transport.requests().is_empty());
    tokio::time::sleep(Duration::from_secs(2)).await;
    let metrics = task.stop().await;

    assert_eq!(metrics.total_refreshed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_loop_without_exp_waits_full_interval() {
    let storage = MemoryStorage::new();
    TokenStore::new(storage.clone())
        .save(&TokenPair::new(jwt(r#"{"user_id":1}"#), "r1"))
        .unwrap();
    let transport = ScriptedTransport::default();
    let app = app_with(transport.clone(), storage, 600);

    let task = app.spawn_refresh_task().unwrap();
    tokio::time::sleep(Duration::from_secs(599)).await;
    let metrics = task.stop().await;

    assert_eq!(metrics.total_attempts, 0);
    assert!(transport.requests().is_empty());
}
